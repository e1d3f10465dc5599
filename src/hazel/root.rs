//! Root packet decoding
//!
//! A Hazel packet frame is a run of child messages, each laid out as:
//! - 2 bytes body length (little-endian, excludes the tag)
//! - 1 byte message tag
//! - body

use std::sync::Arc;

use serde::Serialize;

use crate::replay::{ByteCursor, DecodeResult, Direction, RawFrame, RootPacket, RootPacketDecoder};

/// Well-known root message tags
pub mod root_tags {
    pub const HOST_GAME: u8 = 0x00;
    pub const JOIN_GAME: u8 = 0x01;
    pub const START_GAME: u8 = 0x02;
    pub const REMOVE_GAME: u8 = 0x03;
    pub const REMOVE_PLAYER: u8 = 0x04;
    pub const GAME_DATA: u8 = 0x05;
    pub const GAME_DATA_TO: u8 = 0x06;
    pub const JOINED_GAME: u8 = 0x07;
    pub const END_GAME: u8 = 0x08;
    pub const ALTER_GAME: u8 = 0x0A;
    pub const KICK_PLAYER: u8 = 0x0B;
    pub const WAIT_FOR_HOST: u8 = 0x0C;
    pub const REDIRECT: u8 = 0x0D;
    pub const REPORT_PLAYER: u8 = 0x11;

    /// Human-readable name of a root tag
    pub fn name(tag: u8) -> &'static str {
        match tag {
            HOST_GAME => "HostGame",
            JOIN_GAME => "JoinGame",
            START_GAME => "StartGame",
            REMOVE_GAME => "RemoveGame",
            REMOVE_PLAYER => "RemovePlayer",
            GAME_DATA => "GameData",
            GAME_DATA_TO => "GameDataTo",
            JOINED_GAME => "JoinedGame",
            END_GAME => "EndGame",
            ALTER_GAME => "AlterGame",
            KICK_PLAYER => "KickPlayer",
            WAIT_FOR_HOST => "WaitForHost",
            REDIRECT => "Redirect",
            REPORT_PLAYER => "ReportPlayer",
            _ => "Unknown",
        }
    }
}

/// One tagged child message of a root packet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildMessage {
    pub tag: u8,
    /// Undecoded message body
    pub body: RawFrame,
}

impl ChildMessage {
    pub fn name(&self) -> &'static str {
        root_tags::name(self.tag)
    }
}

/// A root packet split into its child messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootMessages {
    pub direction: Direction,
    pub messages: Vec<ChildMessage>,
}

impl RootPacket for RootMessages {
    fn message_tags(&self) -> Vec<u8> {
        self.messages.iter().map(|m| m.tag).collect()
    }
}

/// Splits packet frames into Hazel child messages
///
/// The tag catalogue is the same in both directions, so the direction is
/// only recorded on the result and never changes how bytes are read.
#[derive(Debug, Clone, Copy, Default)]
pub struct HazelRootDecoder;

impl HazelRootDecoder {
    fn read_message(frame: &mut ByteCursor) -> DecodeResult<ChildMessage> {
        let len = frame.read_u16()? as usize;
        let tag = frame.read_u8()?;
        let offset = frame.offset();
        let bytes = frame.read_bytes(len)?;
        Ok(ChildMessage {
            tag,
            body: RawFrame { offset, bytes },
        })
    }
}

impl RootPacketDecoder for HazelRootDecoder {
    fn decode(
        &self,
        frame: &mut ByteCursor,
        direction: Direction,
    ) -> DecodeResult<Arc<dyn RootPacket>> {
        let mut messages = Vec::new();
        while !frame.is_empty() {
            messages.push(Self::read_message(frame)?);
        }
        Ok(Arc::new(RootMessages {
            direction,
            messages,
        }))
    }
}
