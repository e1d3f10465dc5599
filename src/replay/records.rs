//! Game-state records carried before the packet stream
//!
//! Players and their cosmetics have a fixed schema and are decoded here.
//! Game options are framed here but interpreted by a [`GameOptionDecoder`].

use serde::Serialize;

use super::cursor::ByteCursor;
use super::error::{DecodeError, DecodeResult};
use super::frame::LengthPrefix;

/// Length prefix of a single game option frame
pub const GAME_OPTION_PREFIX: LengthPrefix = LengthPrefix::U16;

/// Cosmetic type tags
pub mod cosmetic_types {
    pub const PLAYER_COLOR: u8 = 0x00;
}

/// A piece of player appearance data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Cosmetic {
    PlayerColor { r: u8, g: u8, b: u8, a: u8 },
}

impl Cosmetic {
    /// Get the cosmetic type tag
    pub fn type_id(&self) -> u8 {
        match self {
            Cosmetic::PlayerColor { .. } => cosmetic_types::PLAYER_COLOR,
        }
    }
}

/// A player listed in the replay roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    pub id: u8,
    pub name: String,
    /// Cosmetics in recorded order
    pub cosmetics: Vec<Cosmetic>,
}

/// A lobby setting recorded with the replay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameOption {
    pub key: String,
    pub value: GameOptionValue,
}

/// Game option kinds
pub mod game_option_types {
    pub const NUMBER: u8 = 0x00;
    pub const BOOLEAN: u8 = 0x01;
    pub const ENUM: u8 = 0x02;
}

/// Value of a game option
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameOptionValue {
    Number {
        value: f32,
        lower: f32,
        upper: f32,
        increment: f32,
        /// Whether a value of zero is displayed as unlimited
        zero_is_infinity: bool,
        suffix: String,
    },
    Boolean {
        value: bool,
    },
    Enum {
        /// Index of the selected entry in `values`
        index: u8,
        values: Vec<String>,
    },
}

impl GameOptionValue {
    /// Get the game option type tag
    pub fn type_id(&self) -> u8 {
        match self {
            GameOptionValue::Number { .. } => game_option_types::NUMBER,
            GameOptionValue::Boolean { .. } => game_option_types::BOOLEAN,
            GameOptionValue::Enum { .. } => game_option_types::ENUM,
        }
    }
}

/// Interprets the payload of one game option frame
///
/// The cursor is bounded to the frame; implementations must consume all of it.
pub trait GameOptionDecoder: Send + Sync {
    fn decode(&self, frame: &mut ByteCursor) -> DecodeResult<GameOption>;
}

/// Decode a single cosmetic
pub fn decode_cosmetic(cursor: &mut ByteCursor) -> DecodeResult<Cosmetic> {
    match cursor.read_u8()? {
        cosmetic_types::PLAYER_COLOR => {
            let rgba = cursor.read_bytes(4)?;
            Ok(Cosmetic::PlayerColor {
                r: rgba[0],
                g: rgba[1],
                b: rgba[2],
                a: rgba[3],
            })
        }
        tag => Err(DecodeError::UnknownCosmeticType(tag)),
    }
}

/// Decode a player and its cosmetics
pub fn decode_player(cursor: &mut ByteCursor) -> DecodeResult<Player> {
    let id = cursor.read_u8()?;
    let name = cursor.read_string()?;
    let count = cursor.read_u8()?;

    let mut cosmetics = Vec::with_capacity(count as usize);
    for _ in 0..count {
        cosmetics.push(decode_cosmetic(cursor)?);
    }

    Ok(Player {
        id,
        name,
        cosmetics,
    })
}

/// Frame one game option and hand it to `decoder`
///
/// `index` is the option's position in the options section and is only
/// used to annotate errors raised by the decoder.
pub fn decode_game_option(
    cursor: &mut ByteCursor,
    index: usize,
    decoder: &dyn GameOptionDecoder,
) -> DecodeResult<GameOption> {
    cursor.read_frame(GAME_OPTION_PREFIX)?.decode_with_context(
        |frame| decoder.decode(frame),
        |source| DecodeError::GameOptionContents {
            index,
            source: Box::new(source),
        },
    )
}
