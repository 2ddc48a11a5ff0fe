//! Blocking, typed reads over the TDS byte stream.
//!
//! The transport collaborator hands over anything implementing
//! [`std::io::Read`] that blocks until bytes are available or the connection
//! fails. Every helper reads exactly the bytes of its type or returns the
//! transport's error unchanged; a short stream surfaces as
//! [`IoErrorKind::UnexpectedEof`].
//!
//! [`IoErrorKind::UnexpectedEof`]: crate::error::IoErrorKind::UnexpectedEof

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Read;

/// Little-endian primitive reads used by the metadata and payload readers.
pub trait SqlReadBytes: Read {
    /// Read one byte.
    fn read_u8(&mut self) -> crate::Result<u8> {
        Ok(ReadBytesExt::read_u8(self)?)
    }

    /// Read a little-endian `u16`.
    fn read_u16_le(&mut self) -> crate::Result<u16> {
        Ok(ReadBytesExt::read_u16::<LittleEndian>(self)?)
    }

    /// Read a little-endian `i16`.
    fn read_i16_le(&mut self) -> crate::Result<i16> {
        Ok(ReadBytesExt::read_i16::<LittleEndian>(self)?)
    }

    /// Read a little-endian `u32`.
    fn read_u32_le(&mut self) -> crate::Result<u32> {
        Ok(ReadBytesExt::read_u32::<LittleEndian>(self)?)
    }

    /// Read a little-endian `i32`.
    fn read_i32_le(&mut self) -> crate::Result<i32> {
        Ok(ReadBytesExt::read_i32::<LittleEndian>(self)?)
    }

    /// Fill `buf` completely.
    fn read_bytes(&mut self, buf: &mut [u8]) -> crate::Result<()> {
        self.read_exact(buf)?;
        Ok(())
    }

    /// Consume and drop `n` bytes.
    fn skip_bytes(&mut self, n: usize) -> crate::Result<()> {
        let mut chunk = [0u8; 64];
        let mut left = n;

        while left > 0 {
            let take = left.min(chunk.len());
            self.read_exact(&mut chunk[..take])?;
            left -= take;
        }

        Ok(())
    }
}

impl<R: Read + ?Sized> SqlReadBytes for R {}

#[cfg(test)]
mod tests {
    use super::SqlReadBytes;
    use std::io::Cursor;

    #[test]
    fn reads_little_endian() {
        let mut src = Cursor::new(vec![0x01, 0x02, 0x03, 0x04, 0xff, 0xff, 0xff, 0xff]);

        assert_eq!(0x0201, src.read_u16_le().unwrap());
        assert_eq!(0x0403, src.read_u16_le().unwrap());
        assert_eq!(-1, src.read_i32_le().unwrap());
        assert_eq!(8, src.position());
    }

    #[test]
    fn short_read_is_truncation() {
        let mut src = Cursor::new(vec![0x01]);
        let err = src.read_u32_le().unwrap_err();

        assert!(err.is_truncated());
    }

    #[test]
    fn skip_consumes_exactly() {
        let mut src = Cursor::new(vec![0u8; 200]);
        src.skip_bytes(130).unwrap();

        assert_eq!(130, src.position());
        assert!(src.skip_bytes(71).unwrap_err().is_truncated());
    }
}
