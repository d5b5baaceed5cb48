use crate::error::{NcmError, Result};

/// Bounds-checked sequential cursor over the loaded input bytes.
///
/// Every read past the end fails with `NcmError::Truncated`; there are no
/// silent partial reads. The cursor only moves forward.
pub struct ByteReader {
    buf: Vec<u8>,
    pos: usize,
}

impl ByteReader {
    pub fn new(buf: Vec<u8>) -> Self {
        Self { buf, pos: 0 }
    }

    fn check(&self, needed: usize) -> Result<()> {
        let available = self.buf.len() - self.pos;
        if needed > available {
            return Err(NcmError::Truncated { needed, available });
        }
        Ok(())
    }

    /// Read exactly `n` bytes, advancing the cursor.
    pub fn read_exact(&mut self, n: usize) -> Result<&[u8]> {
        self.check(n)?;
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        let bytes = self.read_exact(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.check(n)?;
        self.pos += n;
        Ok(())
    }

    /// Bytes left after the cursor, without consuming them.
    pub fn remaining(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    pub fn remaining_len(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Consume the reader, returning everything after the cursor.
    pub fn into_remaining(mut self) -> Vec<u8> {
        self.buf.split_off(self.pos)
    }
}
