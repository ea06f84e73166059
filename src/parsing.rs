//! Bounded reading of big-endian values from a byte slice.

use bytes::Buf;

use crate::errors::{Error, Result};

/// A read position over a borrowed byte slice.
///
/// Every read checks the remaining length first and reports a
/// [`Error::ShortRead`] with the caller supplied context on failure.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    len: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            buf: data,
            len: data.len(),
        }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.len - self.buf.remaining()
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn has_remaining(&self) -> bool {
        self.buf.has_remaining()
    }

    fn ensure_remaining(&self, needed: usize, context: &'static str) -> Result<()> {
        let remaining = self.buf.remaining();
        if remaining < needed {
            return Err(Error::ShortRead {
                context,
                offset: self.position(),
                needed,
                remaining,
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self, context: &'static str) -> Result<u8> {
        self.ensure_remaining(1, context)?;
        Ok(self.buf.get_u8())
    }

    /// Reads an unsigned big-endian integer of `n` bytes, `n <= 8`.
    pub fn read_be_uint(&mut self, n: usize, context: &'static str) -> Result<u64> {
        if n > 8 {
            return Err(Error::InvalidInput {
                context: format!("{context}: cannot read a {n} byte integer"),
            });
        }
        if n == 0 {
            return Ok(0);
        }
        self.ensure_remaining(n, context)?;
        Ok(self.buf.get_uint(n))
    }

    pub fn read_be_u16(&mut self, context: &'static str) -> Result<u16> {
        self.ensure_remaining(2, context)?;
        Ok(self.buf.get_u16())
    }

    pub fn read_be_u32(&mut self, context: &'static str) -> Result<u32> {
        self.ensure_remaining(4, context)?;
        Ok(self.buf.get_u32())
    }

    pub fn read_array<const N: usize>(&mut self, context: &'static str) -> Result<[u8; N]> {
        self.ensure_remaining(N, context)?;
        let mut arr = [0u8; N];
        self.buf.copy_to_slice(&mut arr);
        Ok(arr)
    }

    pub fn read_take(&mut self, n: usize, context: &'static str) -> Result<&'a [u8]> {
        self.ensure_remaining(n, context)?;
        let data: &'a [u8] = self.buf;
        self.buf.advance(n);
        Ok(&data[..n])
    }

    /// Consumes everything that is left.
    pub fn rest(&mut self) -> &'a [u8] {
        let data: &'a [u8] = self.buf;
        self.buf.advance(data.len());
        data
    }
}
