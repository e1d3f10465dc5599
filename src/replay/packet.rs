//! Directional packets
//!
//! Each packet is a direction flag followed by a `u32`-prefixed frame. The
//! frame is either kept raw or handed to a [`RootPacketDecoder`].

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::cursor::ByteCursor;
use super::error::{DecodeError, DecodeResult};
use super::frame::{LengthPrefix, RawFrame};

/// Length prefix of a packet frame
pub const PACKET_PREFIX: LengthPrefix = LengthPrefix::U32;

/// Smallest possible packet: direction flag plus an empty frame
pub const MIN_PACKET_SIZE: usize = 1 + 4;

/// Which way a packet travelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    ToServer,
    ToClient,
}

impl Direction {
    pub fn from_flag(to_client: bool) -> Self {
        if to_client {
            Direction::ToClient
        } else {
            Direction::ToServer
        }
    }

    pub fn is_client_bound(self) -> bool {
        self == Direction::ToClient
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ToServer => write!(f, "to server"),
            Direction::ToClient => write!(f, "to client"),
        }
    }
}

/// Whether packet payloads are decoded or left as raw frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodeMode {
    #[default]
    Raw,
    Decoded,
}

/// A decoded root packet produced by a [`RootPacketDecoder`]
pub trait RootPacket: fmt::Debug + Send + Sync {
    /// Type tags of the messages this packet carries, in order
    fn message_tags(&self) -> Vec<u8>;
}

/// Decodes root packets for one protocol catalogue
///
/// The cursor is bounded to the packet frame; implementations must consume
/// all of it. The direction is passed for catalogues that give client-bound
/// and server-bound packets separate ID spaces. A catalogue whose tags mean
/// the same thing both ways may ignore it.
pub trait RootPacketDecoder: Send + Sync {
    fn decode(
        &self,
        frame: &mut ByteCursor,
        direction: Direction,
    ) -> DecodeResult<Arc<dyn RootPacket>>;
}

/// Packet payload
#[derive(Debug, Clone)]
pub enum PacketContents {
    Raw(RawFrame),
    Decoded(Arc<dyn RootPacket>),
}

impl PacketContents {
    pub fn as_raw(&self) -> Option<&RawFrame> {
        match self {
            PacketContents::Raw(frame) => Some(frame),
            PacketContents::Decoded(_) => None,
        }
    }

    pub fn as_decoded(&self) -> Option<&dyn RootPacket> {
        match self {
            PacketContents::Raw(_) => None,
            PacketContents::Decoded(packet) => Some(packet.as_ref()),
        }
    }
}

/// A single recorded packet
#[derive(Debug, Clone)]
pub struct Packet {
    pub direction: Direction,
    pub contents: PacketContents,
}

/// Decode the packet at the cursor
///
/// `index` is the packet's position in the replay and is only used to
/// annotate errors. In [`DecodeMode::Raw`] `decoder` is never called.
pub fn decode_packet(
    cursor: &mut ByteCursor,
    index: usize,
    mode: DecodeMode,
    decoder: &dyn RootPacketDecoder,
) -> DecodeResult<Packet> {
    let direction = Direction::from_flag(cursor.read_bool()?);
    let frame = cursor.read_frame(PACKET_PREFIX)?;

    let contents = match mode {
        DecodeMode::Raw => PacketContents::Raw(frame),
        DecodeMode::Decoded => {
            let packet = frame.decode_with_context(
                |inner| decoder.decode(inner, direction),
                |source| DecodeError::PacketContents {
                    index,
                    direction,
                    source: Box::new(source),
                },
            )?;
            PacketContents::Decoded(packet)
        }
    };

    Ok(Packet {
        direction,
        contents,
    })
}
