//! The `ByteSource` capability the decoder is built against, plus the two
//! concrete implementations shipped so the decoder is runnable on its own:
//! a borrowed-slice reader and, behind the `mmap` feature, a memory-mapped
//! file reader.

use std::io::{Cursor, Read};
#[cfg(feature = "mmap")]
use std::{fs::File, path::Path};

/// Positional, big-endian byte access over an opaque source.
///
/// This is the only interface the decoder needs from its input; it does not
/// know or care whether the bytes come from memory, a file, or a network
/// stream. Reads past the end of the source fail with `UnexpectedEof`.
pub trait ByteSource {
    /// Whether at least one more byte is available without advancing.
    fn has_data_left(&mut self) -> std::io::Result<bool>;

    /// Current read position, for diagnostics only.
    fn pos(&self) -> u64;

    /// Look at the next byte without consuming it.
    fn peek(&mut self) -> std::io::Result<u8>;

    /// Advance past `n` bytes without returning them.
    fn skip(&mut self, n: u64) -> std::io::Result<()>;

    /// Read exactly `n` bytes.
    fn read(&mut self, n: usize) -> std::io::Result<Vec<u8>>;

    fn read_bool(&mut self) -> std::io::Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    fn read_i8(&mut self) -> std::io::Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    fn read_u8(&mut self) -> std::io::Result<u8> {
        let mut byte = [0u8; 1];
        self.read_exact_into(&mut byte)?;
        Ok(byte[0])
    }

    fn read_i16_be(&mut self) -> std::io::Result<i16> {
        Ok(i16::from_be_bytes(self.read_array::<2>()?))
    }

    fn read_u16_be(&mut self) -> std::io::Result<u16> {
        Ok(u16::from_be_bytes(self.read_array::<2>()?))
    }

    fn read_i32_be(&mut self) -> std::io::Result<i32> {
        Ok(i32::from_be_bytes(self.read_array::<4>()?))
    }

    fn read_i64_be(&mut self) -> std::io::Result<i64> {
        Ok(i64::from_be_bytes(self.read_array::<8>()?))
    }

    fn read_f32_be(&mut self) -> std::io::Result<f32> {
        Ok(f32::from_be_bytes(self.read_array::<4>()?))
    }

    fn read_f64_be(&mut self) -> std::io::Result<f64> {
        Ok(f64::from_be_bytes(self.read_array::<8>()?))
    }

    /// Read exactly `N` bytes into a fixed-size array. Provided so the
    /// `*_be` helpers above share one code path.
    fn read_array<const N: usize>(&mut self) -> std::io::Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact_into(&mut buf)?;
        Ok(buf)
    }

    /// Read exactly `buf.len()` bytes into `buf`.
    fn read_exact_into(&mut self, buf: &mut [u8]) -> std::io::Result<()>;
}

/// An in-memory, cursor-based `ByteSource` over a borrowed or owned buffer.
#[derive(Debug, Clone)]
pub struct SliceSource<B: AsRef<[u8]>> {
    cursor: Cursor<B>,
}

impl<B: AsRef<[u8]>> SliceSource<B> {
    pub fn new(data: B) -> Self {
        Self { cursor: Cursor::new(data) }
    }

    pub fn into_inner(self) -> B {
        self.cursor.into_inner()
    }
}

impl<B: AsRef<[u8]>> ByteSource for SliceSource<B> {
    fn has_data_left(&mut self) -> std::io::Result<bool> {
        let len = self.cursor.get_ref().as_ref().len() as u64;
        Ok(self.cursor.position() < len)
    }

    fn pos(&self) -> u64 {
        self.cursor.position()
    }

    fn peek(&mut self) -> std::io::Result<u8> {
        let pos = self.cursor.position() as usize;
        let data = self.cursor.get_ref().as_ref();
        match data.get(pos) {
            Some(byte) => Ok(*byte),
            None => Err(std::io::ErrorKind::UnexpectedEof.into()),
        }
    }

    fn skip(&mut self, n: u64) -> std::io::Result<()> {
        let new_pos = self.cursor.position() + n;
        let len = self.cursor.get_ref().as_ref().len() as u64;
        if new_pos > len {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        self.cursor.set_position(new_pos);
        Ok(())
    }

    fn read(&mut self, n: usize) -> std::io::Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.read_exact_into(&mut buf)?;
        Ok(buf)
    }

    fn read_exact_into(&mut self, buf: &mut [u8]) -> std::io::Result<()> {
        self.cursor.read_exact(buf).map_err(|_| std::io::ErrorKind::UnexpectedEof.into())
    }
}

/// A read-only memory-mapped-file `ByteSource`, for decoding streams
/// embedded inside large capture files without reading the whole file into
/// memory up front.
#[cfg(feature = "mmap")]
pub struct MmapSource {
    inner: SliceSource<memmap2::Mmap>,
}

#[cfg(feature = "mmap")]
impl MmapSource {
    /// # Safety
    /// The caller must ensure the file is not concurrently truncated or
    /// modified for the lifetime of the mapping, per `memmap2::Mmap::map`.
    pub unsafe fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let mmap = memmap2::Mmap::map(&file)?;
        Ok(Self { inner: SliceSource::new(mmap) })
    }
}

#[cfg(feature = "mmap")]
impl ByteSource for MmapSource {
    fn has_data_left(&mut self) -> std::io::Result<bool> {
        self.inner.has_data_left()
    }

    fn pos(&self) -> u64 {
        self.inner.pos()
    }

    fn peek(&mut self) -> std::io::Result<u8> {
        self.inner.peek()
    }

    fn skip(&mut self, n: u64) -> std::io::Result<()> {
        self.inner.skip(n)
    }

    fn read(&mut self, n: usize) -> std::io::Result<Vec<u8>> {
        self.inner.read(n)
    }

    fn read_exact_into(&mut self, buf: &mut [u8]) -> std::io::Result<()> {
        self.inner.read_exact_into(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_does_not_advance() {
        let mut src = SliceSource::new([1u8, 2, 3]);
        assert_eq!(src.peek().unwrap(), 1);
        assert_eq!(src.peek().unwrap(), 1);
        assert_eq!(src.read_u8().unwrap(), 1);
        assert_eq!(src.peek().unwrap(), 2);
    }

    #[test]
    fn read_past_end_is_unexpected_eof() {
        let mut src = SliceSource::new([0u8; 1]);
        src.read_u8().unwrap();
        assert_eq!(src.peek().unwrap_err().kind(), std::io::ErrorKind::UnexpectedEof);
        assert_eq!(src.read_u8().unwrap_err().kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn big_endian_primitives() {
        let mut src = SliceSource::new([0x00, 0x01, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(src.read_u16_be().unwrap(), 1);
        assert_eq!(src.read_i32_be().unwrap(), -1);
    }
}
