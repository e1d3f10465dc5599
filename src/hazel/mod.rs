//! Hazel module - Default collaborators for Hazel-framed sessions
//!
//! Provides:
//! - Root packet decoding into tagged child messages
//! - Game option decoding for number, boolean and enum settings

mod options;
mod root;

pub use options::*;
pub use root::*;
