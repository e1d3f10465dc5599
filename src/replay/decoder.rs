//! Replay decoder
//!
//! Drives a single cursor over the whole buffer:
//! - `u32` version
//! - roster and game options (only in the full schema)
//! - `u32` packet count followed by the packets

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::cursor::ByteCursor;
use super::error::{DecodeError, DecodeResult};
use super::packet::{decode_packet, DecodeMode, Packet, RootPacketDecoder, MIN_PACKET_SIZE};
use super::records::{decode_game_option, decode_player, GameOption, GameOptionDecoder, Player};
use crate::hazel::{HazelOptionDecoder, HazelRootDecoder};

/// Which sections precede the packet stream
///
/// The layout cannot be detected from the bytes, so the caller picks it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Schema {
    /// Version and packets only
    #[default]
    Bare,
    /// Version, player roster, game options, packets
    Full,
}

impl Schema {
    pub fn has_roster(self) -> bool {
        self == Schema::Full
    }

    pub fn has_game_options(self) -> bool {
        self == Schema::Full
    }

    pub fn name(self) -> &'static str {
        match self {
            Schema::Bare => "bare",
            Schema::Full => "full",
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Schema {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bare" => Ok(Schema::Bare),
            "full" => Ok(Schema::Full),
            _ => Err(DecodeError::UnknownSchema(s.to_string())),
        }
    }
}

impl TryFrom<String> for Schema {
    type Error = DecodeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Schema> for String {
    fn from(schema: Schema) -> Self {
        schema.name().to_string()
    }
}

/// Options for a single decode call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub mode: DecodeMode,
    pub schema: Schema,
}

impl DecodeOptions {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            ..Default::default()
        }
    }

    pub fn decoded(mut self) -> Self {
        self.mode = DecodeMode::Decoded;
        self
    }
}

/// A fully decoded replay
#[derive(Debug, Clone)]
pub struct Replay {
    pub version: u32,
    /// Roster, present only in the full schema
    pub players: Option<Vec<Player>>,
    /// Lobby settings, present only in the full schema
    pub game_options: Option<Vec<GameOption>>,
    pub packets: Vec<Packet>,
    /// Bytes left unread after the last packet
    pub trailing_bytes: usize,
}

/// Replay decoder with pluggable packet and game option collaborators
///
/// Holds no per-replay state, so one decoder can serve many buffers
/// from many threads.
#[derive(Clone)]
pub struct ReplayDecoder {
    options: DecodeOptions,
    root_decoder: Arc<dyn RootPacketDecoder>,
    option_decoder: Arc<dyn GameOptionDecoder>,
}

impl ReplayDecoder {
    /// Create a decoder using the Hazel collaborators
    pub fn new(options: DecodeOptions) -> Self {
        Self {
            options,
            root_decoder: Arc::new(HazelRootDecoder),
            option_decoder: Arc::new(HazelOptionDecoder),
        }
    }

    pub fn with_root_decoder(mut self, decoder: Arc<dyn RootPacketDecoder>) -> Self {
        self.root_decoder = decoder;
        self
    }

    pub fn with_option_decoder(mut self, decoder: Arc<dyn GameOptionDecoder>) -> Self {
        self.option_decoder = decoder;
        self
    }

    pub fn options(&self) -> DecodeOptions {
        self.options
    }

    /// Decode a complete replay buffer
    pub fn decode(&self, buffer: impl Into<Bytes>) -> DecodeResult<Replay> {
        let mut cursor = ByteCursor::new(buffer);
        let schema = self.options.schema;

        let version = cursor.read_u32()?;

        let players = if schema.has_roster() {
            let count = cursor.read_u8()?;
            let mut players = Vec::with_capacity(count as usize);
            for _ in 0..count {
                players.push(decode_player(&mut cursor)?);
            }
            Some(players)
        } else {
            None
        };

        let game_options = if schema.has_game_options() {
            let count = cursor.read_u8()?;
            let mut options = Vec::with_capacity(count as usize);
            for index in 0..count as usize {
                let decoder = self.option_decoder.as_ref();
                options.push(decode_game_option(&mut cursor, index, decoder)?);
            }
            Some(options)
        } else {
            None
        };

        let count = cursor.read_u32()? as usize;
        // A corrupt count must not turn into a huge allocation
        let mut packets = Vec::with_capacity(count.min(cursor.remaining() / MIN_PACKET_SIZE));
        for index in 0..count {
            packets.push(decode_packet(
                &mut cursor,
                index,
                self.options.mode,
                self.root_decoder.as_ref(),
            )?);
        }

        Ok(Replay {
            version,
            players,
            game_options,
            packets,
            trailing_bytes: cursor.remaining(),
        })
    }
}

impl fmt::Debug for ReplayDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplayDecoder")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Decode a replay buffer with the Hazel collaborators
pub fn decode_replay(buffer: impl Into<Bytes>, options: &DecodeOptions) -> DecodeResult<Replay> {
    ReplayDecoder::new(*options).decode(buffer)
}
