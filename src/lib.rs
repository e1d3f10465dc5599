//! netreplay - Recorded game session decoding
//!
//! Decodes replay buffers made of a version header, an optional player
//! roster and game options, and a stream of directional packets. Packet
//! payloads are either kept as raw frames or decoded into root messages.
//!
//! ```
//! use netreplay::replay::{decode_replay, DecodeOptions};
//!
//! let bytes = vec![0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
//! let replay = decode_replay(bytes, &DecodeOptions::default()).unwrap();
//! assert_eq!(replay.version, 2);
//! assert!(replay.packets.is_empty());
//! ```

pub mod config;
pub mod hazel;
pub mod replay;
pub mod report;

pub use replay::{
    decode_replay, DecodeError, DecodeMode, DecodeOptions, Replay, ReplayDecoder, Schema,
};
