//! Game option decoding
//!
//! Every option frame starts with a kind byte and the option key, followed
//! by a kind-specific body.

use crate::replay::{
    game_option_types, ByteCursor, DecodeError, DecodeResult, GameOption, GameOptionDecoder,
    GameOptionValue,
};

/// Decodes number, boolean and enum options
#[derive(Debug, Clone, Copy, Default)]
pub struct HazelOptionDecoder;

impl GameOptionDecoder for HazelOptionDecoder {
    fn decode(&self, frame: &mut ByteCursor) -> DecodeResult<GameOption> {
        let kind = frame.read_u8()?;
        let key = frame.read_string()?;

        let value = match kind {
            game_option_types::NUMBER => GameOptionValue::Number {
                value: frame.read_f32()?,
                lower: frame.read_f32()?,
                upper: frame.read_f32()?,
                increment: frame.read_f32()?,
                zero_is_infinity: frame.read_bool()?,
                suffix: frame.read_string()?,
            },
            game_option_types::BOOLEAN => GameOptionValue::Boolean {
                value: frame.read_bool()?,
            },
            game_option_types::ENUM => {
                let index = frame.read_u8()?;
                let count = frame.read_u8()?;
                let mut values = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    values.push(frame.read_string()?);
                }
                GameOptionValue::Enum { index, values }
            }
            other => return Err(DecodeError::UnknownGameOptionType(other)),
        };

        Ok(GameOption { key, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::decode_game_option;
    use crate::replay::testing::ReplayBuilder;

    #[test]
    fn test_number_option() {
        let bytes = ReplayBuilder::new()
            .u8(game_option_types::NUMBER)
            .string("kill_cooldown")
            .f32(22.5)
            .f32(10.0)
            .f32(60.0)
            .f32(2.5)
            .bool(false)
            .string("s")
            .build();
        let option = HazelOptionDecoder.decode(&mut ByteCursor::new(bytes)).unwrap();

        assert_eq!(option.key, "kill_cooldown");
        assert_eq!(
            option.value,
            GameOptionValue::Number {
                value: 22.5,
                lower: 10.0,
                upper: 60.0,
                increment: 2.5,
                zero_is_infinity: false,
                suffix: "s".to_string(),
            }
        );
        assert_eq!(option.value.type_id(), game_option_types::NUMBER);
    }

    #[test]
    fn test_enum_option() {
        let bytes = ReplayBuilder::new()
            .u8(game_option_types::ENUM)
            .string("map")
            .u8(1)
            .u8(3)
            .string("Skeld")
            .string("Mira")
            .string("Polus")
            .build();
        let option = HazelOptionDecoder.decode(&mut ByteCursor::new(bytes)).unwrap();

        match option.value {
            GameOptionValue::Enum { index, values } => {
                assert_eq!(index, 1);
                assert_eq!(values, vec!["Skeld", "Mira", "Polus"]);
            }
            other => panic!("unexpected value: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kind_is_annotated_through_framing() {
        let bytes = ReplayBuilder::new()
            .frame_u16(|b| b.u8(0x09).string("mystery"))
            .build();
        let mut cursor = ByteCursor::new(bytes);
        let err = decode_game_option(&mut cursor, 3, &HazelOptionDecoder).unwrap_err();

        match err {
            DecodeError::GameOptionContents { index, source } => {
                assert_eq!(index, 3);
                assert!(matches!(*source, DecodeError::UnknownGameOptionType(0x09)));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
