//! Primitive bytecode reader.
//!
//! Decodes the fixed-width, native-endian scalars, tags, operator codes,
//! encoded lengths and names. Composite decoding (types, values, operands)
//! is layered on top by the crates that own those models.

use crate::{BinaryOp, DecodeError, Name, Opcode, StringInterner, Tag, UnaryOp};

/// Cursor over a bytecode buffer.
#[derive(Clone, Debug)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Reader positioned at `pos`.
    pub fn at(bytes: &'a [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.pos.checked_add(n).filter(|end| *end <= self.bytes.len());
        let Some(end) = end else {
            return Err(DecodeError::UnexpectedEnd {
                offset: self.pos,
                wanted: n - self.bytes.len().saturating_sub(self.pos),
            });
        };
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let slice = self.read_exact(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_exact(1)?[0])
    }

    pub fn peek_u8(&self) -> Result<u8, DecodeError> {
        self.bytes
            .get(self.pos)
            .copied()
            .ok_or(DecodeError::UnexpectedEnd {
                offset: self.pos,
                wanted: 1,
            })
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_ne_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_ne_bytes(self.read_array()?))
    }

    pub fn read_i8(&mut self) -> Result<i8, DecodeError> {
        Ok(i8::from_ne_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16, DecodeError> {
        Ok(i16::from_ne_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_ne_bytes(self.read_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, DecodeError> {
        Ok(f64::from_ne_bytes(self.read_array()?))
    }

    pub fn read_char(&mut self) -> Result<char, DecodeError> {
        let offset = self.pos;
        let code = u32::from_ne_bytes(self.read_array()?);
        char::from_u32(code).ok_or(DecodeError::InvalidChar { code, offset })
    }

    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_tag(&mut self) -> Result<Tag, DecodeError> {
        let offset = self.pos;
        let byte = self.read_u8()?;
        Tag::from_u8(byte).ok_or(DecodeError::UnknownTag { byte, offset })
    }

    pub fn peek_tag(&self) -> Result<Tag, DecodeError> {
        let byte = self.peek_u8()?;
        Tag::from_u8(byte).ok_or(DecodeError::UnknownTag {
            byte,
            offset: self.pos,
        })
    }

    pub fn read_opcode(&mut self) -> Result<Opcode, DecodeError> {
        let offset = self.pos;
        let byte = self.read_u8()?;
        Opcode::from_u8(byte).ok_or(DecodeError::UnknownOpcode { byte, offset })
    }

    pub fn read_binary_op(&mut self) -> Result<BinaryOp, DecodeError> {
        let offset = self.pos;
        let byte = self.read_u8()?;
        BinaryOp::from_u8(byte).ok_or(DecodeError::UnknownOperator { byte, offset })
    }

    pub fn read_unary_op(&mut self) -> Result<UnaryOp, DecodeError> {
        let offset = self.pos;
        let byte = self.read_u8()?;
        UnaryOp::from_u8(byte).ok_or(DecodeError::UnknownOperator { byte, offset })
    }

    /// Read an encoded integer (an `Int8`/`Int16`/`IntBig` literal) that
    /// fits in an `i64`.
    pub fn read_encoded_int(&mut self) -> Result<i64, DecodeError> {
        let offset = self.pos;
        match self.read_tag()? {
            Tag::Int8 => Ok(i64::from(self.read_i8()?)),
            Tag::Int16 => Ok(i64::from(self.read_i16()?)),
            Tag::IntBig => {
                let count = self.read_encoded_len()?;
                if count == 0 || count > 8 {
                    return Err(DecodeError::LengthOutOfRange { offset });
                }
                let bytes = self.read_exact(count)?;
                // Sign-extend little-endian two's complement into 8 bytes.
                let fill = if bytes[count - 1] & 0x80 == 0 { 0 } else { 0xFF };
                let mut wide = [fill; 8];
                wide[..count].copy_from_slice(bytes);
                Ok(i64::from_le_bytes(wide))
            }
            tag => Err(DecodeError::UnexpectedTag {
                tag,
                offset,
                expected: "an encoded integer",
            }),
        }
    }

    /// Read a non-negative encoded integer used as a length prefix.
    pub fn read_encoded_len(&mut self) -> Result<usize, DecodeError> {
        let offset = self.pos;
        let n = self.read_encoded_int()?;
        usize::try_from(n).map_err(|_| DecodeError::LengthOutOfRange { offset })
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_str(&mut self) -> Result<&'a str, DecodeError> {
        let len = self.read_encoded_len()?;
        let offset = self.pos;
        let bytes = self.read_exact(len)?;
        std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { offset })
    }

    /// Read a length-prefixed name and intern it.
    pub fn read_name(&mut self, interner: &StringInterner) -> Result<Name, DecodeError> {
        Ok(interner.intern(self.read_str()?))
    }
}
