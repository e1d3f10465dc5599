//! Length-prefixed frames
//!
//! A frame is a length prefix followed by exactly that many bytes. Frames
//! are either handed back unread as a [`RawFrame`] or decoded through a
//! sub-cursor that cannot see past the frame end.

use bytes::Bytes;
use serde::Serialize;

use super::cursor::ByteCursor;
use super::error::{DecodeError, DecodeResult};

/// Width of a frame's length prefix, fixed per call site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthPrefix {
    U8,
    U16,
    U32,
}

impl LengthPrefix {
    /// Number of bytes the prefix itself occupies
    pub fn width(self) -> usize {
        match self {
            LengthPrefix::U8 => 1,
            LengthPrefix::U16 => 2,
            LengthPrefix::U32 => 4,
        }
    }
}

/// Undecoded frame contents, borrowed from the replay buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawFrame {
    /// Absolute offset of the first payload byte
    pub offset: usize,
    /// Payload bytes (a view into the original buffer), serialized as their length
    #[serde(rename = "length", serialize_with = "serialize_len")]
    pub bytes: Bytes,
}

fn serialize_len<S: serde::Serializer>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(bytes.len() as u64)
}

impl RawFrame {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Absolute offset one past the last payload byte
    pub fn end(&self) -> usize {
        self.offset + self.bytes.len()
    }

    /// A fresh cursor bounded to this frame's payload
    pub fn cursor(&self) -> ByteCursor {
        ByteCursor::with_offset(self.bytes.clone(), self.offset)
    }

    /// Run `decode` over the payload, requiring it to consume every byte
    ///
    /// Reads past the frame end through the bounded cursor and leftover
    /// bytes are both reported as [`DecodeError::FrameLengthMismatch`].
    pub fn decode_with<T, F>(&self, decode: F) -> DecodeResult<T>
    where
        F: FnOnce(&mut ByteCursor) -> DecodeResult<T>,
    {
        self.decode_with_context(decode, |e| e)
    }

    /// Like [`RawFrame::decode_with`], passing every error that `decode`
    /// raised itself through `annotate`
    ///
    /// Only the mismatch this frame detects is returned as is, so callers
    /// can attach their own context to everything else.
    pub fn decode_with_context<T, F, A>(&self, decode: F, annotate: A) -> DecodeResult<T>
    where
        F: FnOnce(&mut ByteCursor) -> DecodeResult<T>,
        A: FnOnce(DecodeError) -> DecodeError,
    {
        let mut inner = self.cursor();
        let mismatch = |consumed: usize| DecodeError::FrameLengthMismatch {
            offset: self.offset,
            declared: self.len(),
            consumed,
        };

        match decode(&mut inner) {
            Ok(value) if inner.is_empty() => Ok(value),
            Ok(_) => Err(mismatch(inner.position())),
            Err(e) => match e {
                DecodeError::UnexpectedEndOfData {
                    offset,
                    requested,
                    remaining,
                } if self.overran(&inner, offset, remaining) => {
                    Err(mismatch(offset + requested - self.offset))
                }
                e => Err(annotate(e)),
            },
        }
    }

    /// Whether a short read came from `inner` hitting this frame's end
    ///
    /// Cursors carved out of the payload (child bodies and the like) end
    /// earlier or sit behind `inner`, so their short reads do not match.
    fn overran(&self, inner: &ByteCursor, offset: usize, remaining: usize) -> bool {
        offset >= inner.offset() && offset + remaining == self.end()
    }
}

impl ByteCursor {
    /// Read a length prefix of the given width
    pub fn read_length(&mut self, prefix: LengthPrefix) -> DecodeResult<usize> {
        Ok(match prefix {
            LengthPrefix::U8 => self.read_u8()? as usize,
            LengthPrefix::U16 => self.read_u16()? as usize,
            LengthPrefix::U32 => self.read_u32()? as usize,
        })
    }

    /// Read a frame without interpreting its payload
    ///
    /// The whole frame must be present; the cursor is not moved otherwise.
    pub fn read_frame(&mut self, prefix: LengthPrefix) -> DecodeResult<RawFrame> {
        let before = self.clone();
        let len = self.read_length(prefix)?;
        let offset = self.offset();
        match self.read_bytes(len) {
            Ok(bytes) => Ok(RawFrame { offset, bytes }),
            Err(e) => {
                *self = before;
                Err(e)
            }
        }
    }

    /// Read a frame and decode its payload through a bounded sub-cursor
    ///
    /// This cursor ends at the frame boundary whether or not `decode`
    /// succeeds, so a malformed frame cannot desynchronize the stream.
    pub fn decode_frame<T, F>(&mut self, prefix: LengthPrefix, decode: F) -> DecodeResult<T>
    where
        F: FnOnce(&mut ByteCursor) -> DecodeResult<T>,
    {
        self.read_frame(prefix)?.decode_with(decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_raw_frame() {
        let mut cursor = ByteCursor::new(vec![0x09, 0x04, 0x00, 0xAA, 0xBB, 0xCC, 0xDD, 0x01]);
        cursor.read_u8().unwrap();

        let frame = cursor.read_frame(LengthPrefix::U16).unwrap();
        assert_eq!(frame.offset, 3);
        assert_eq!(&frame.bytes[..], &[0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(frame.end(), 7);
        assert_eq!(cursor.offset(), 7);
        assert_eq!(cursor.remaining(), 1);
    }

    #[test]
    fn test_frame_longer_than_buffer() {
        let mut cursor = ByteCursor::new(vec![0x05, 0x01, 0x02]);
        assert!(matches!(
            cursor.read_frame(LengthPrefix::U8),
            Err(DecodeError::UnexpectedEndOfData { offset: 1, requested: 5, remaining: 2 })
        ));
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn test_sub_cursor_is_bounded() {
        let mut cursor = ByteCursor::new(vec![0x02, 0x10, 0x20, 0x30]);
        let sum = cursor
            .decode_frame(LengthPrefix::U8, |frame| {
                assert_eq!(frame.remaining(), 2);
                assert_eq!(frame.offset(), 1);
                Ok(frame.read_u8()? as u32 + frame.read_u8()? as u32)
            })
            .unwrap();
        assert_eq!(sum, 0x30);
        assert_eq!(cursor.read_u8().unwrap(), 0x30);
    }

    #[test]
    fn test_under_consumed_frame_is_mismatch_and_realigns() {
        let mut cursor = ByteCursor::new(vec![0x03, 0x01, 0x02, 0x03, 0xEE]);
        let result = cursor.decode_frame(LengthPrefix::U8, |frame| frame.read_u8());

        match result {
            Err(DecodeError::FrameLengthMismatch {
                offset,
                declared,
                consumed,
            }) => {
                assert_eq!(offset, 1);
                assert_eq!(declared, 3);
                assert_eq!(consumed, 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(cursor.offset(), 4);
        assert_eq!(cursor.read_u8().unwrap(), 0xEE);
    }

    #[test]
    fn test_over_consumed_frame_is_mismatch() {
        let mut cursor = ByteCursor::new(vec![0x02, 0x01, 0x02, 0x03, 0x04, 0x05]);
        let result = cursor.decode_frame(LengthPrefix::U8, |frame| frame.read_u32());

        assert!(matches!(
            result,
            Err(DecodeError::FrameLengthMismatch { offset: 1, declared: 2, consumed: 4 })
        ));
        assert_eq!(cursor.offset(), 3);
    }

    #[test]
    fn test_nested_frames() {
        // outer(5) = [inner(2) = [7, 8], 9, 0]
        let mut cursor = ByteCursor::new(vec![0x05, 0x02, 0x07, 0x08, 0x09, 0x00]);
        let (inner, tail) = cursor
            .decode_frame(LengthPrefix::U8, |outer| {
                let inner = outer.decode_frame(LengthPrefix::U8, |inner| {
                    Ok((inner.read_u8()?, inner.read_u8()?))
                })?;
                Ok((inner, outer.read_u16()?))
            })
            .unwrap();
        assert_eq!(inner, (7, 8));
        assert_eq!(tail, 9);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_inner_frame_overrunning_outer_frame() {
        // outer declares 3 bytes but its nested frame declares 4
        let mut cursor = ByteCursor::new(vec![0x03, 0x04, 0x01, 0x02, 0x03, 0x04]);
        let result = cursor.decode_frame(LengthPrefix::U8, |outer| {
            outer.read_frame(LengthPrefix::U8).map(|_| ())
        });
        assert!(matches!(
            result,
            Err(DecodeError::FrameLengthMismatch { offset: 1, declared: 3, .. })
        ));
        assert_eq!(cursor.offset(), 4);
    }

    #[test]
    fn test_record_errors_pass_through() {
        let mut cursor = ByteCursor::new(vec![0x01, 0xFF]);
        let result: DecodeResult<()> = cursor.decode_frame(LengthPrefix::U8, |frame| {
            Err(DecodeError::UnknownCosmeticType(frame.read_u8()?))
        });
        assert!(matches!(result, Err(DecodeError::UnknownCosmeticType(0xFF))));
    }

    #[test]
    fn test_short_read_on_carved_body_is_not_a_mismatch() {
        // frame(3) = [tag 0xCD, len 1, 0xAB]; the body is the last byte of the frame
        let mut cursor = ByteCursor::new(vec![0x03, 0xCD, 0x01, 0xAB]);
        let frame = cursor.read_frame(LengthPrefix::U8).unwrap();

        let result: DecodeResult<()> = frame.decode_with_context(
            |inner| {
                inner.read_u8()?;
                let body = inner.read_frame(LengthPrefix::U8)?;
                body.cursor().read_u32().map(|_| ())
            },
            |e| DecodeError::GameOptionContents {
                index: 7,
                source: Box::new(e),
            },
        );

        match result {
            Err(DecodeError::GameOptionContents { index, source }) => {
                assert_eq!(index, 7);
                assert!(matches!(
                    *source,
                    DecodeError::UnexpectedEndOfData { offset: 3, requested: 4, remaining: 1 }
                ));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_overrun_is_not_annotated() {
        let frame = ByteCursor::new(vec![0x01, 0x05])
            .read_frame(LengthPrefix::U8)
            .unwrap();
        let result = frame.decode_with_context(
            |inner| inner.read_u16(),
            |_| panic!("a mismatch must not reach the annotation"),
        );
        assert!(matches!(
            result,
            Err(DecodeError::FrameLengthMismatch { offset: 1, declared: 1, consumed: 2 })
        ));
    }

    #[test]
    fn test_overrun_after_restored_string_read() {
        // a string length reaching past the frame leaves the cursor where it was
        let mut cursor = ByteCursor::new(vec![0x02, 0x05, 0x61, 0x00]);
        let result = cursor.decode_frame(LengthPrefix::U8, |inner| inner.read_string());
        assert!(matches!(
            result,
            Err(DecodeError::FrameLengthMismatch { offset: 1, declared: 2, consumed: 6 })
        ));
        assert_eq!(cursor.offset(), 3);
    }

    #[test]
    fn test_raw_frame_json_reports_length() {
        let frame = ByteCursor::new(vec![0x02, 0x10, 0x20])
            .read_frame(LengthPrefix::U8)
            .unwrap();
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["offset"], 1);
        assert_eq!(json["length"], 2);
        assert!(json.get("bytes").is_none());
    }
}
