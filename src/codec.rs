//! Byte-level reader for the ledger's wire records.
//!
//! Records are byte-aligned: operation tags are 32-bit big-endian
//! integers, flag fields are single bytes, addresses are fixed 32-byte
//! values. Encoding is done inline at the call sites with
//! `extend_from_slice`; this module only provides the decoding cursor.

use crate::types::Address;

/// Wire decoding errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Record ended before the requested field
    #[error("truncated record: needed {needed} more bytes, {remaining} left")]
    Truncated {
        /// Bytes the field required
        needed: usize,
        /// Bytes left in the record
        remaining: usize,
    },
    /// Bytes left over after the full record was read
    #[error("trailing bytes after record: {0}")]
    TrailingBytes(usize),
}

/// Cursor over an encoded record
#[derive(Debug)]
pub struct RecordReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> RecordReader<'a> {
    /// Start reading at the beginning of `buf`
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::Truncated {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a single flag byte
    pub fn u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    /// Read a 32-bit big-endian integer (operation tags)
    pub fn u32_be(&mut self) -> Result<u32, CodecError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a fixed 32-byte address
    pub fn address(&mut self) -> Result<Address, CodecError> {
        let bytes = self.take(32)?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        Ok(Address::from_bytes(arr))
    }

    /// Assert the record was fully consumed
    pub fn finish(self) -> Result<(), CodecError> {
        if self.remaining() != 0 {
            return Err(CodecError::TrailingBytes(self.remaining()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u32_be() {
        let mut r = RecordReader::new(&[0x6f, 0x07, 0x48, 0x17]);
        assert_eq!(r.u32_be().unwrap(), 0x6f07_4817);
        r.finish().unwrap();
    }

    #[test]
    fn test_truncated() {
        let mut r = RecordReader::new(&[0x01, 0x02]);
        assert_eq!(
            r.u32_be(),
            Err(CodecError::Truncated {
                needed: 4,
                remaining: 2
            })
        );
    }

    #[test]
    fn test_trailing() {
        let mut r = RecordReader::new(&[0x00, 0xff]);
        r.u8().unwrap();
        assert_eq!(r.finish(), Err(CodecError::TrailingBytes(1)));
    }

    #[test]
    fn test_address_field() {
        let addr = Address::from_state_init(b"acct");
        let mut buf = vec![0x01];
        buf.extend_from_slice(addr.as_bytes());

        let mut r = RecordReader::new(&buf);
        assert_eq!(r.u8().unwrap(), 0x01);
        assert_eq!(r.address().unwrap(), addr);
        r.finish().unwrap();
    }
}
