//! Replay module - Decodes recorded game sessions
//!
//! A replay is a single little-endian buffer:
//! - 4 bytes format version
//! - player roster and game options (full schema only)
//! - 4 bytes packet count
//! - packets: 1 byte direction flag, 4 bytes length, payload
//!
//! Decoding never performs I/O; callers load the buffer themselves.

mod cursor;
mod decoder;
mod error;
mod frame;
mod packet;
mod records;

#[cfg(test)]
pub(crate) mod testing;

pub use cursor::*;
pub use decoder::*;
pub use error::*;
pub use frame::*;
pub use packet::*;
pub use records::*;
