//! Test fixture builder for replay buffers

use bytes::{BufMut, Bytes, BytesMut};

/// Builds replay bytes field by field
#[derive(Default)]
pub struct ReplayBuilder {
    buf: BytesMut,
}

impl ReplayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.buf.put_u8(v);
        self
    }

    pub fn u16(mut self, v: u16) -> Self {
        self.buf.put_u16_le(v);
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.buf.put_u32_le(v);
        self
    }

    pub fn f32(mut self, v: f32) -> Self {
        self.buf.put_f32_le(v);
        self
    }

    pub fn bool(self, v: bool) -> Self {
        self.u8(v as u8)
    }

    pub fn bytes(mut self, v: &[u8]) -> Self {
        self.buf.put_slice(v);
        self
    }

    pub fn packed(mut self, mut v: u32) -> Self {
        while v >= 0x80 {
            self.buf.put_u8((v as u8 & 0x7F) | 0x80);
            v >>= 7;
        }
        self.buf.put_u8(v as u8);
        self
    }

    pub fn string(self, s: &str) -> Self {
        self.packed(s.len() as u32).bytes(s.as_bytes())
    }

    pub fn player(self, id: u8, name: &str, colors: &[[u8; 4]]) -> Self {
        let mut b = self.u8(id).string(name).u8(colors.len() as u8);
        for color in colors {
            b = b.u8(0x00).bytes(color);
        }
        b
    }

    pub fn frame_u16(self, body: impl FnOnce(ReplayBuilder) -> ReplayBuilder) -> Self {
        let payload = body(ReplayBuilder::new()).build();
        self.u16(payload.len() as u16).bytes(&payload)
    }

    pub fn frame_u32(self, body: impl FnOnce(ReplayBuilder) -> ReplayBuilder) -> Self {
        let payload = body(ReplayBuilder::new()).build();
        self.u32(payload.len() as u32).bytes(&payload)
    }

    /// A packet whose frame holds `payload` verbatim
    pub fn packet(self, to_client: bool, payload: &[u8]) -> Self {
        self.bool(to_client).frame_u32(|b| b.bytes(payload))
    }

    /// A Hazel child message inside a packet frame
    pub fn message(self, tag: u8, body: &[u8]) -> Self {
        self.u16(body.len() as u16).u8(tag).bytes(body)
    }

    pub fn build(self) -> Bytes {
        self.buf.freeze()
    }
}
