//! Read context for deserializing data

use crate::error::{FlatcableError, Result};
use std::io::Read;

/// Upper bound on the buffer reserved before a payload read
pub(crate) const READ_CHUNK: usize = 8 * 1024;

/// Context for reading data during deserialization
///
/// Every read is exact: a short stream surfaces as [`FlatcableError::OutOfData`].
pub struct ReadContext<R: Read> {
    reader: R,
    consumed: u64,
}

impl<R: Read> ReadContext<R> {
    /// Create a new read context from a reader
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            consumed: 0,
        }
    }

    /// Read a fixed number of bytes into an array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    /// Read a single byte
    pub fn read_byte(&mut self) -> Result<u8> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte)
    }

    /// Read a specific number of bytes
    ///
    /// The buffer grows with the data actually received, so a length taken
    /// from a corrupt prefix costs at most [`READ_CHUNK`] bytes up front.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(len.min(READ_CHUNK));
        (&mut self.reader)
            .take(len as u64)
            .read_to_end(&mut buf)?;
        self.consumed += buf.len() as u64;
        if buf.len() < len {
            return Err(FlatcableError::OutOfData);
        }
        Ok(buf)
    }

    /// Total bytes consumed so far
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        self.reader.read_exact(buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                FlatcableError::OutOfData
            } else {
                FlatcableError::Io(e)
            }
        })?;
        self.consumed += buf.len() as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_and_counts() {
        let data = [1u8, 2, 3, 4, 5];
        let mut ctx = ReadContext::new(&data[..]);
        assert_eq!(ctx.read_byte().unwrap(), 1);
        assert_eq!(ctx.read_array::<2>().unwrap(), [2, 3]);
        assert_eq!(ctx.read_bytes(2).unwrap(), vec![4, 5]);
        assert_eq!(ctx.consumed(), 5);
    }

    #[test]
    fn test_short_read_is_out_of_data() {
        let data = [1u8];
        let mut ctx = ReadContext::new(&data[..]);
        assert!(matches!(ctx.read_bytes(2), Err(FlatcableError::OutOfData)));
    }

    #[test]
    fn test_huge_length_on_short_stream() {
        let data = [9u8; 3];
        let mut ctx = ReadContext::new(&data[..]);
        assert!(matches!(
            ctx.read_bytes(1 << 30),
            Err(FlatcableError::OutOfData)
        ));
        assert_eq!(ctx.consumed(), 3);
    }

    #[test]
    fn test_payload_larger_than_chunk() {
        let data: Vec<u8> = (0..3 * READ_CHUNK + 7).map(|n| n as u8).collect();
        let mut ctx = ReadContext::new(&data[..]);
        assert_eq!(ctx.read_bytes(data.len()).unwrap(), data);
        assert_eq!(ctx.consumed(), data.len() as u64);
    }
}
