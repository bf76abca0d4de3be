//! Low-level CBOR writer.
//!
//! Emits definite-length items with the minimum-width header encoding CBOR
//! canonical form requires. All multi-byte quantities are big-endian.

use alloc::vec::Vec;

use crate::error::{CcfError, ErrorCode};

pub(crate) struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub(crate) const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub(crate) fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    #[inline]
    pub(crate) fn push_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    #[inline]
    fn write_u8(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Write a major type header with the minimum-width argument encoding.
    pub(crate) fn major_uint(&mut self, major: u8, value: u64) {
        debug_assert!(major <= 7);
        if value < 24 {
            #[allow(clippy::cast_possible_truncation)]
            self.write_u8((major << 5) | value as u8);
        } else if value <= 0xff {
            self.write_u8((major << 5) | 24);
            #[allow(clippy::cast_possible_truncation)]
            self.write_u8(value as u8);
        } else if value <= 0xffff {
            self.write_u8((major << 5) | 25);
            #[allow(clippy::cast_possible_truncation)]
            self.push_raw(&(value as u16).to_be_bytes());
        } else if value <= 0xffff_ffff {
            self.write_u8((major << 5) | 26);
            #[allow(clippy::cast_possible_truncation)]
            self.push_raw(&(value as u32).to_be_bytes());
        } else {
            self.write_u8((major << 5) | 27);
            self.push_raw(&value.to_be_bytes());
        }
    }

    fn major_len(&mut self, major: u8, len: usize) -> Result<(), CcfError> {
        let len = u64::try_from(len)
            .map_err(|_| CcfError::new(ErrorCode::LengthOverflow, self.position()))?;
        self.major_uint(major, len);
        Ok(())
    }

    /// Write an unsigned integer (major type 0).
    pub(crate) fn uint(&mut self, v: u64) {
        self.major_uint(0, v);
    }

    /// Write a signed integer using CBOR's `-1 - n` convention for
    /// negatives.
    pub(crate) fn int(&mut self, v: i64) {
        if v >= 0 {
            #[allow(clippy::cast_sign_loss)]
            self.major_uint(0, v as u64);
        } else {
            #[allow(clippy::cast_sign_loss)]
            let n = !(v as u64);
            self.major_uint(1, n);
        }
    }

    /// Write a byte string (major type 2).
    pub(crate) fn bytes(&mut self, bytes: &[u8]) -> Result<(), CcfError> {
        self.major_len(2, bytes.len())?;
        self.push_raw(bytes);
        Ok(())
    }

    /// Write a text string (major type 3). `str` guarantees valid UTF-8.
    pub(crate) fn text(&mut self, s: &str) -> Result<(), CcfError> {
        let b = s.as_bytes();
        self.major_len(3, b.len())?;
        self.push_raw(b);
        Ok(())
    }

    /// Write a definite-length array header.
    pub(crate) fn array(&mut self, len: usize) -> Result<(), CcfError> {
        self.major_len(4, len)
    }

    /// Write a tag header (major type 6).
    pub(crate) fn tag(&mut self, tag: u64) {
        self.major_uint(6, tag);
    }

    /// Write a boolean.
    pub(crate) fn bool(&mut self, v: bool) {
        self.write_u8(if v { 0xf5 } else { 0xf4 });
    }

    /// Write null.
    pub(crate) fn null(&mut self) {
        self.write_u8(0xf6);
    }

    /// Write a bignum: tag 2 (positive) or 3 (negative) over the minimal
    /// big-endian magnitude. Zero is the empty byte string under tag 2.
    pub(crate) fn bignum(&mut self, negative: bool, magnitude: &[u8]) -> Result<(), CcfError> {
        debug_assert!(magnitude.first() != Some(&0));
        self.tag(if negative { 3 } else { 2 });
        self.bytes(magnitude)
    }
}
