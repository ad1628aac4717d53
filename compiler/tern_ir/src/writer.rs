//! Primitive bytecode writer; the inverse of [`ByteReader`](crate::ByteReader).

use crate::{BinaryOp, Opcode, Tag, UnaryOp};

/// Growable bytecode buffer.
#[derive(Clone, Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Offset the next byte will be written at.
    #[inline]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_ne_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_ne_bytes());
    }

    pub fn write_i8(&mut self, v: i8) {
        self.buf.extend_from_slice(&v.to_ne_bytes());
    }

    pub fn write_i16(&mut self, v: i16) {
        self.buf.extend_from_slice(&v.to_ne_bytes());
    }

    pub fn write_f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_ne_bytes());
    }

    pub fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_ne_bytes());
    }

    pub fn write_char(&mut self, c: char) {
        self.write_u32(u32::from(c));
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    pub fn write_tag(&mut self, tag: Tag) {
        self.write_u8(tag.as_u8());
    }

    pub fn write_opcode(&mut self, op: Opcode) {
        self.write_u8(op.as_u8());
    }

    pub fn write_binary_op(&mut self, op: BinaryOp) {
        self.write_u8(op.as_u8());
    }

    pub fn write_unary_op(&mut self, op: UnaryOp) {
        self.write_u8(op.as_u8());
    }

    /// Write `n` as the narrowest integer literal that holds its magnitude.
    pub fn write_encoded_int(&mut self, n: i64) {
        let bits = u64::BITS - n.unsigned_abs().leading_zeros();
        if bits <= 7 {
            self.write_tag(Tag::Int8);
            #[expect(clippy::cast_possible_truncation, reason = "magnitude fits in 7 bits")]
            let narrow = n as i8;
            self.write_i8(narrow);
        } else if bits <= 15 {
            self.write_tag(Tag::Int16);
            #[expect(clippy::cast_possible_truncation, reason = "magnitude fits in 15 bits")]
            let narrow = n as i16;
            self.write_i16(narrow);
        } else {
            self.write_tag(Tag::IntBig);
            let bytes = n.to_le_bytes();
            let count = minimal_twos_complement_len(&bytes);
            self.write_encoded_len(count);
            self.write_bytes(&bytes[..count]);
        }
    }

    pub fn write_encoded_len(&mut self, len: usize) {
        self.write_encoded_int(i64::try_from(len).unwrap_or(i64::MAX));
    }

    pub fn write_str(&mut self, s: &str) {
        self.write_encoded_len(s.len());
        self.write_bytes(s.as_bytes());
    }

    /// Overwrite two bytes at `at` (block length back-patching).
    pub fn patch_u16(&mut self, at: usize, v: u16) {
        self.buf[at..at + 2].copy_from_slice(&v.to_ne_bytes());
    }

    /// Overwrite four bytes at `at` (forward jump back-patching).
    pub fn patch_u32(&mut self, at: usize, v: u32) {
        self.buf[at..at + 4].copy_from_slice(&v.to_ne_bytes());
    }
}

/// Shortest little-endian prefix of `bytes` that sign-extends back to the
/// full value.
fn minimal_twos_complement_len(bytes: &[u8; 8]) -> usize {
    let mut len = bytes.len();
    while len > 1 {
        let top = bytes[len - 1];
        let next_sign = bytes[len - 2] & 0x80;
        let redundant = (top == 0x00 && next_sign == 0) || (top == 0xFF && next_sign != 0);
        if !redundant {
            break;
        }
        len -= 1;
    }
    len
}
