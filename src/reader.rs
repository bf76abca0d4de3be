//! Low-level CBOR reader.
//!
//! A cursor over the input that enforces the canonical subset CCF is built
//! on: definite lengths only, minimum-width headers, and no reserved
//! additional-info values. Resource limits are enforced before any
//! length-prefixed allocation.

use crate::error::{CcfError, ErrorCode};
use crate::limits::DecodeLimits;

/// Validate a text payload at `off`.
///
/// Every string, character, field name, and cadence type id in the format
/// funnels through here, so this is the single point where `Utf8Invalid`
/// originates. The `simdutf8` feature swaps in SIMD validation for large
/// text payloads.
fn text_from_utf8(bytes: &[u8], off: usize) -> Result<&str, CcfError> {
    #[cfg(feature = "simdutf8")]
    let parsed = simdutf8::basic::from_utf8(bytes);
    #[cfg(not(feature = "simdutf8"))]
    let parsed = core::str::from_utf8(bytes);
    parsed.map_err(|_| CcfError::new(ErrorCode::Utf8Invalid, off))
}

pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    limits: DecodeLimits,
    items_seen: usize,
}

impl<'a> Reader<'a> {
    pub(crate) const fn new(data: &'a [u8], limits: DecodeLimits) -> Self {
        Self {
            data,
            pos: 0,
            limits,
            items_seen: 0,
        }
    }

    #[inline]
    pub(crate) const fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn set_pos(&mut self, pos: usize) {
        debug_assert!(pos <= self.data.len());
        self.pos = pos;
    }

    #[inline]
    pub(crate) const fn eof(&self) -> bool {
        self.pos == self.data.len()
    }

    /// The raw input slice between two positions, used for encoded-key
    /// order checks.
    #[inline]
    pub(crate) fn span(&self, start: usize, end: usize) -> &'a [u8] {
        &self.data[start..end]
    }

    fn err(&self, code: ErrorCode, off: usize) -> CcfError {
        CcfError::new(code, off)
    }

    fn read_u8(&mut self, err_off: usize) -> Result<u8, CcfError> {
        let b = *self
            .data
            .get(self.pos)
            .ok_or_else(|| self.err(ErrorCode::UnexpectedEof, err_off))?;
        self.pos += 1;
        Ok(b)
    }

    pub(crate) fn read_exact(&mut self, n: usize, err_off: usize) -> Result<&'a [u8], CcfError> {
        let end = self
            .pos
            .checked_add(n)
            .ok_or_else(|| self.err(ErrorCode::LengthOverflow, err_off))?;
        if end > self.data.len() {
            return Err(self.err(ErrorCode::UnexpectedEof, err_off));
        }
        let s = &self.data[self.pos..end];
        self.pos = end;
        Ok(s)
    }

    fn read_be_u16(&mut self, err_off: usize) -> Result<u16, CcfError> {
        let s = self.read_exact(2, err_off)?;
        Ok(u16::from_be_bytes([s[0], s[1]]))
    }

    fn read_be_u32(&mut self, err_off: usize) -> Result<u32, CcfError> {
        let s = self.read_exact(4, err_off)?;
        Ok(u32::from_be_bytes([s[0], s[1], s[2], s[3]]))
    }

    fn read_be_u64(&mut self, err_off: usize) -> Result<u64, CcfError> {
        let s = self.read_exact(8, err_off)?;
        Ok(u64::from_be_bytes([
            s[0], s[1], s[2], s[3], s[4], s[5], s[6], s[7],
        ]))
    }

    /// Read the argument of a header, rejecting non-minimal encodings.
    fn read_uint(&mut self, ai: u8, off: usize) -> Result<u64, CcfError> {
        match ai {
            0..=23 => Ok(u64::from(ai)),
            24 => {
                let v = self.read_u8(off)?;
                if v < 24 {
                    return Err(self.err(ErrorCode::NonMinimalEncoding, off));
                }
                Ok(u64::from(v))
            }
            25 => {
                let v = u64::from(self.read_be_u16(off)?);
                if u8::try_from(v).is_ok() {
                    return Err(self.err(ErrorCode::NonMinimalEncoding, off));
                }
                Ok(v)
            }
            26 => {
                let v = u64::from(self.read_be_u32(off)?);
                if u16::try_from(v).is_ok() {
                    return Err(self.err(ErrorCode::NonMinimalEncoding, off));
                }
                Ok(v)
            }
            27 => {
                let v = self.read_be_u64(off)?;
                if u32::try_from(v).is_ok() {
                    return Err(self.err(ErrorCode::NonMinimalEncoding, off));
                }
                Ok(v)
            }
            31 => Err(self.err(ErrorCode::IndefiniteLengthForbidden, off)),
            _ => Err(self.err(ErrorCode::ReservedAdditionalInfo, off)),
        }
    }

    /// Read the next header byte, returning `(major, additional-info,
    /// offset)`.
    fn read_head(&mut self) -> Result<(u8, u8, usize), CcfError> {
        let off = self.pos;
        let ib = self.read_u8(off)?;
        Ok((ib >> 5, ib & 0x1f, off))
    }

    /// Peek at the next initial byte without consuming it.
    pub(crate) fn peek_u8(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Snapshot of the total-items counter, so a re-parse over an already
    /// scanned region does not double-count.
    pub(crate) const fn items_checkpoint(&self) -> usize {
        self.items_seen
    }

    pub(crate) fn restore_items(&mut self, checkpoint: usize) {
        self.items_seen = checkpoint;
    }

    fn read_len(
        &mut self,
        ai: u8,
        off: usize,
        max_len: usize,
        limit_code: ErrorCode,
    ) -> Result<usize, CcfError> {
        let len_u64 = self.read_uint(ai, off)?;
        let len = usize::try_from(len_u64)
            .map_err(|_| self.err(ErrorCode::LengthOverflow, off))?;
        if len > max_len {
            return Err(self.err(limit_code, off));
        }
        Ok(len)
    }

    fn bump_items(&mut self, add: usize, off: usize) -> Result<(), CcfError> {
        self.items_seen = self
            .items_seen
            .checked_add(add)
            .ok_or_else(|| self.err(ErrorCode::LengthOverflow, off))?;
        if self.items_seen > self.limits.max_total_items {
            return Err(self.err(ErrorCode::TotalItemsLimitExceeded, off));
        }
        Ok(())
    }

    pub(crate) fn ensure_depth(&self, depth: usize, off: usize) -> Result<(), CcfError> {
        if depth > self.limits.max_depth {
            return Err(self.err(ErrorCode::DepthLimitExceeded, off));
        }
        Ok(())
    }

    /// Read a tag header (major type 6) and return the tag number.
    pub(crate) fn read_tag(&mut self) -> Result<(u64, usize), CcfError> {
        let (major, ai, off) = self.read_head()?;
        if major != 6 {
            return Err(self.err(ErrorCode::UnexpectedItem, off));
        }
        let tag = self.read_uint(ai, off)?;
        Ok((tag, off))
    }

    /// Read an array header and return its length.
    pub(crate) fn read_array(&mut self) -> Result<(usize, usize), CcfError> {
        let (major, ai, off) = self.read_head()?;
        if major != 4 {
            return Err(self.err(ErrorCode::UnexpectedItem, off));
        }
        let len = self.read_len(ai, off, self.limits.max_array_len, ErrorCode::ArrayLenLimitExceeded)?;
        self.bump_items(len, off)?;
        Ok((len, off))
    }

    /// Read an array header that must have exactly `expected` elements.
    pub(crate) fn read_array_exact(&mut self, expected: usize) -> Result<usize, CcfError> {
        let (len, off) = self.read_array()?;
        if len != expected {
            return Err(self.err(ErrorCode::UnexpectedItem, off));
        }
        Ok(off)
    }

    /// Read a byte string.
    pub(crate) fn read_bytes(&mut self) -> Result<(&'a [u8], usize), CcfError> {
        let (major, ai, off) = self.read_head()?;
        if major != 2 {
            return Err(self.err(ErrorCode::UnexpectedItem, off));
        }
        let len = self.read_len(ai, off, self.limits.max_bytes_len, ErrorCode::BytesLenLimitExceeded)?;
        let bytes = self.read_exact(len, off)?;
        Ok((bytes, off))
    }

    /// Read a text string, validating UTF-8.
    pub(crate) fn read_text(&mut self) -> Result<(&'a str, usize), CcfError> {
        let (major, ai, off) = self.read_head()?;
        if major != 3 {
            return Err(self.err(ErrorCode::UnexpectedItem, off));
        }
        let len = self.read_len(ai, off, self.limits.max_text_len, ErrorCode::TextLenLimitExceeded)?;
        let bytes = self.read_exact(len, off)?;
        let s = text_from_utf8(bytes, off)?;
        Ok((s, off))
    }

    /// Read an unsigned integer (major type 0 only).
    pub(crate) fn read_u64(&mut self) -> Result<(u64, usize), CcfError> {
        let (major, ai, off) = self.read_head()?;
        if major != 0 {
            if major == 1 {
                return Err(self.err(ErrorCode::NegativeUnsigned, off));
            }
            return Err(self.err(ErrorCode::UnexpectedItem, off));
        }
        let v = self.read_uint(ai, off)?;
        Ok((v, off))
    }

    /// Read a signed integer (major type 0 or 1).
    pub(crate) fn read_i64(&mut self) -> Result<(i64, usize), CcfError> {
        let (major, ai, off) = self.read_head()?;
        match major {
            0 => {
                let v = self.read_uint(ai, off)?;
                let v =
                    i64::try_from(v).map_err(|_| self.err(ErrorCode::IntegerOutOfRange, off))?;
                Ok((v, off))
            }
            1 => {
                let n = self.read_uint(ai, off)?;
                if n > i64::MAX as u64 {
                    return Err(self.err(ErrorCode::IntegerOutOfRange, off));
                }
                #[allow(clippy::cast_possible_wrap)]
                let v = -1 - (n as i64);
                Ok((v, off))
            }
            _ => Err(self.err(ErrorCode::UnexpectedItem, off)),
        }
    }

    /// Read a boolean.
    pub(crate) fn read_bool(&mut self) -> Result<(bool, usize), CcfError> {
        let off = self.pos;
        match self.read_u8(off)? {
            0xf4 => Ok((false, off)),
            0xf5 => Ok((true, off)),
            _ => Err(self.err(ErrorCode::UnexpectedItem, off)),
        }
    }

    /// Read a null.
    pub(crate) fn read_null(&mut self) -> Result<usize, CcfError> {
        let off = self.pos;
        if self.read_u8(off)? != 0xf6 {
            return Err(self.err(ErrorCode::UnexpectedItem, off));
        }
        Ok(off)
    }

    /// Consume a null if one is next. Used for optional values and nullable
    /// positions.
    pub(crate) fn take_null(&mut self) -> bool {
        if self.peek_u8() == Some(0xf6) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Read a bignum: tag 2 or 3 over a byte string. Returns the sign and
    /// the tagged magnitude, which must be minimal (no leading zero; empty
    /// means zero).
    pub(crate) fn read_bignum(&mut self) -> Result<(bool, &'a [u8], usize), CcfError> {
        let (tag, off) = self.read_tag()?;
        let negative = match tag {
            2 => false,
            3 => true,
            _ => return Err(self.err(ErrorCode::UnexpectedItem, off)),
        };
        let (magnitude, m_off) = self.read_bytes()?;
        if magnitude.first() == Some(&0) {
            return Err(self.err(ErrorCode::BignumLeadingZero, m_off));
        }
        Ok((negative, magnitude, off))
    }

    /// Skip exactly one data item. Used by the two-pass type-definition
    /// parse. Floats and simple values outside bool/null never appear in
    /// CCF and are rejected.
    pub(crate) fn skip_value(&mut self, depth: usize) -> Result<(), CcfError> {
        let (major, ai, off) = self.read_head()?;
        match major {
            0 | 1 => {
                self.read_uint(ai, off)?;
                Ok(())
            }
            2 => {
                let len = self.read_len(
                    ai,
                    off,
                    self.limits.max_bytes_len,
                    ErrorCode::BytesLenLimitExceeded,
                )?;
                self.read_exact(len, off)?;
                Ok(())
            }
            3 => {
                let len = self.read_len(
                    ai,
                    off,
                    self.limits.max_text_len,
                    ErrorCode::TextLenLimitExceeded,
                )?;
                let bytes = self.read_exact(len, off)?;
                text_from_utf8(bytes, off)?;
                Ok(())
            }
            4 => {
                let len = self.read_len(
                    ai,
                    off,
                    self.limits.max_array_len,
                    ErrorCode::ArrayLenLimitExceeded,
                )?;
                self.bump_items(len, off)?;
                self.ensure_depth(depth + 1, off)?;
                for _ in 0..len {
                    self.skip_value(depth + 1)?;
                }
                Ok(())
            }
            6 => {
                self.read_uint(ai, off)?;
                self.ensure_depth(depth + 1, off)?;
                self.skip_value(depth + 1)
            }
            7 => match ai {
                20..=22 => Ok(()),
                _ => Err(self.err(ErrorCode::UnexpectedItem, off)),
            },
            _ => Err(self.err(ErrorCode::UnexpectedItem, off)),
        }
    }
}
