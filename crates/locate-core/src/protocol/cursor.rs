//! Bounds-checked byte cursor (panic-free).
//!
//! Rules:
//! - Fixed-width reads check `remaining()` first and fail with `Truncated`
//!   without moving the position.
//! - Variable-length reads are permissive: they return what is left.
//! - Writes append to the owned buffer and never fail.
//!
//! All integers are big-endian.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{LocateError, Result};

/// Read/write cursor over an owned buffer. `0 <= pos <= len` always holds.
#[derive(Debug, Clone, Default)]
pub struct ByteCursor {
    buf: BytesMut,
    pos: usize,
}

impl ByteCursor {
    /// Cursor over a received buffer, positioned at its start.
    pub fn new(data: impl AsRef<[u8]>) -> Self {
        Self {
            buf: BytesMut::from(data.as_ref()),
            pos: 0,
        }
    }

    /// Empty growable cursor for encoding.
    pub fn writer() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(cap),
            pos: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the read position; positions past the end clamp to `len()`.
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.buf.len());
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Advance past up to `n` bytes; returns how many were skipped.
    pub fn skip(&mut self, n: usize) -> usize {
        let n = n.min(self.remaining());
        self.pos += n;
        n
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        let remaining = self.remaining();
        if remaining < needed {
            return Err(LocateError::Truncated { needed, remaining });
        }
        Ok(())
    }

    fn unread(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let v = self.unread().get_u8();
        self.pos += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        let v = self.unread().get_u16();
        self.pos += 2;
        Ok(v)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        let v = self.unread().get_u32();
        self.pos += 4;
        Ok(v)
    }

    /// Copy of the next `n` bytes, or of everything left if fewer remain.
    pub fn read_bytes(&mut self, n: usize) -> Bytes {
        let n = n.min(self.remaining());
        let out = Bytes::copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        out
    }

    /// Exactly `N` bytes, or `Truncated`.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    /// One length byte followed by that many raw bytes (not validated as UTF-8).
    pub fn read_length_prefixed_string(&mut self) -> Result<Bytes> {
        let len = self.read_u8()?;
        Ok(self.read_bytes(usize::from(len)))
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.put_u16(v);
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.put_u32(v);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Inverse of `read_length_prefixed_string`; input past 255 bytes is cut.
    pub fn write_length_prefixed_string(&mut self, s: &[u8]) {
        let s = &s[..s.len().min(usize::from(u8::MAX))];
        self.write_u8(s.len() as u8);
        self.write_bytes(s);
    }

    /// Whole buffer, independent of the read position.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}
