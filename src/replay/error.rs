//! Decode errors
//!
//! Every error is fatal to the decode call that produced it. Offsets are
//! absolute positions in the original replay buffer.

use thiserror::Error;

use super::Direction;

/// Boxed error returned by third-party collaborators
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced while decoding a replay
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Unexpected end of data at offset {offset}: needed {requested}, had {remaining}")]
    UnexpectedEndOfData {
        offset: usize,
        requested: usize,
        remaining: usize,
    },

    #[error("Frame at offset {offset} declared {declared} bytes but {consumed} were read")]
    FrameLengthMismatch {
        offset: usize,
        declared: usize,
        consumed: usize,
    },

    #[error("Unknown cosmetic type: {0}")]
    UnknownCosmeticType(u8),

    #[error("Unknown game option type: {0}")]
    UnknownGameOptionType(u8),

    #[error("Failed to decode contents of packet {index} ({direction}): {source}")]
    PacketContents {
        index: usize,
        direction: Direction,
        #[source]
        source: Box<DecodeError>,
    },

    #[error("Failed to decode game option {index}: {source}")]
    GameOptionContents {
        index: usize,
        #[source]
        source: Box<DecodeError>,
    },

    #[error("Unknown replay schema: {0}")]
    UnknownSchema(String),

    #[error("Invalid UTF-8 string at offset {offset}")]
    InvalidString { offset: usize },

    #[error("Malformed packed integer at offset {offset}")]
    MalformedVarint { offset: usize },

    #[error("{0}")]
    Collaborator(#[from] BoxError),
}

pub type DecodeResult<T> = Result<T, DecodeError>;

impl DecodeError {
    /// Byte offset the error refers to, if it carries one
    pub fn offset(&self) -> Option<usize> {
        match self {
            DecodeError::UnexpectedEndOfData { offset, .. }
            | DecodeError::FrameLengthMismatch { offset, .. }
            | DecodeError::InvalidString { offset }
            | DecodeError::MalformedVarint { offset } => Some(*offset),
            DecodeError::PacketContents { source, .. }
            | DecodeError::GameOptionContents { source, .. } => source.offset(),
            _ => None,
        }
    }

    /// Index of the packet that failed, for packet contents errors
    pub fn packet_index(&self) -> Option<usize> {
        match self {
            DecodeError::PacketContents { index, .. } => Some(*index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_is_forwarded_through_wrappers() {
        let inner = DecodeError::InvalidString { offset: 17 };
        let err = DecodeError::PacketContents {
            index: 3,
            direction: Direction::ToClient,
            source: Box::new(inner),
        };
        assert_eq!(err.offset(), Some(17));
        assert_eq!(err.packet_index(), Some(3));
    }

    #[test]
    fn test_display_mentions_packet_and_direction() {
        let err = DecodeError::PacketContents {
            index: 1204,
            direction: Direction::ToServer,
            source: Box::new(DecodeError::UnknownCosmeticType(9)),
        };
        let text = err.to_string();
        assert!(text.contains("1204"));
        assert!(text.contains("to server"));
    }

    #[test]
    fn test_collaborator_errors_convert() {
        let boxed: BoxError = "bad catalogue entry".into();
        let err = DecodeError::from(boxed);
        assert_eq!(err.to_string(), "bad catalogue entry");
        assert!(err.offset().is_none());
    }
}
