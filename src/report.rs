//! Replay reports
//!
//! Summaries printed by the command-line tool, as text or JSON.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::hazel::root_tags;
use crate::replay::{Direction, GameOption, Packet, PacketContents, Player, Replay};

/// Overview of one decoded replay
#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    /// Where the replay was loaded from, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players: Option<Vec<Player>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_options: Option<Vec<GameOption>>,
    pub packets: usize,
    pub to_server: usize,
    pub to_client: usize,
    /// Total bytes of raw packet payloads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_bytes: Option<usize>,
    /// Number of decoded root messages per message name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub messages: BTreeMap<String, usize>,
    pub trailing_bytes: usize,
}

impl ReplaySummary {
    pub fn new(replay: &Replay) -> Self {
        let to_client = replay
            .packets
            .iter()
            .filter(|p| p.direction.is_client_bound())
            .count();

        let mut payload_bytes = None;
        let mut messages = BTreeMap::new();
        for packet in &replay.packets {
            match &packet.contents {
                PacketContents::Raw(frame) => {
                    *payload_bytes.get_or_insert(0) += frame.len();
                }
                PacketContents::Decoded(root) => {
                    for tag in root.message_tags() {
                        *messages.entry(root_tags::name(tag).to_string()).or_insert(0) += 1;
                    }
                }
            }
        }

        Self {
            source: None,
            version: replay.version,
            players: replay.players.clone(),
            game_options: replay.game_options.clone(),
            packets: replay.packets.len(),
            to_server: replay.packets.len() - to_client,
            to_client,
            payload_bytes,
            messages,
            trailing_bytes: replay.trailing_bytes,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            writeln!(f, "{}", source)?;
        }
        writeln!(f, "  Version: {}", self.version)?;

        if let Some(players) = &self.players {
            writeln!(f, "  Players: {}", players.len())?;
            for player in players {
                writeln!(
                    f,
                    "    [{}] {} ({} cosmetics)",
                    player.id,
                    player.name,
                    player.cosmetics.len()
                )?;
            }
        }
        if let Some(options) = &self.game_options {
            writeln!(f, "  Game options: {}", options.len())?;
            for option in options {
                writeln!(f, "    {} = {:?}", option.key, option.value)?;
            }
        }

        writeln!(
            f,
            "  Packets: {} ({} to server, {} to client)",
            self.packets, self.to_server, self.to_client
        )?;
        if let Some(bytes) = self.payload_bytes {
            writeln!(f, "  Payload bytes: {}", bytes)?;
        }
        for (name, count) in &self.messages {
            writeln!(f, "    {}: {}", name, count)?;
        }
        if self.trailing_bytes > 0 {
            writeln!(f, "  Trailing bytes: {}", self.trailing_bytes)?;
        }
        Ok(())
    }
}

/// One row of a packet listing
#[derive(Debug, Clone, Serialize)]
pub struct PacketLine {
    pub index: usize,
    pub direction: Direction,
    /// Frame offset and length, for raw packets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    /// Root message names, for decoded packets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<&'static str>>,
}

impl PacketLine {
    pub fn new(index: usize, packet: &Packet) -> Self {
        let (offset, length, messages) = match &packet.contents {
            PacketContents::Raw(frame) => (Some(frame.offset), Some(frame.len()), None),
            PacketContents::Decoded(root) => (
                None,
                None,
                Some(root.message_tags().into_iter().map(root_tags::name).collect()),
            ),
        };

        Self {
            index,
            direction: packet.direction,
            offset,
            length,
            messages,
        }
    }
}

impl fmt::Display for PacketLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:<6} {:<9}", self.index, self.direction.to_string())?;
        if let (Some(offset), Some(length)) = (self.offset, self.length) {
            write!(f, " @{:#010x} {} bytes", offset, length)?;
        }
        if let Some(messages) = &self.messages {
            write!(f, " [{}]", messages.join(", "))?;
        }
        Ok(())
    }
}
