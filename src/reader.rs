use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::Result;

/// A seekable big-endian reader over one playlist file.
///
/// MPLS records store their own length as their first field, so decoding is
/// a mix of sequential reads and absolute seeks computed from previously
/// read lengths. The reader is generic over the byte source: production code
/// hands it a [`File`], tests hand it an in-memory [`Cursor`].
///
/// Every operation is fallible and nothing is clamped or wrapped; a short
/// read here means the rest of the file cannot be trusted, so the error is
/// always propagated.
///
/// [`File`]: std::fs::File
/// [`Cursor`]: std::io::Cursor
pub struct BdavReader<R> {
    inner: R,
}

impl<R: Read + Seek> BdavReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.inner.read_u8()?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(self.inner.read_u16::<BigEndian>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.inner.read_u32::<BigEndian>()?)
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        Ok(self.inner.read_exact(buf)?)
    }

    /// Advances the position by `n` bytes without reading them.
    pub fn skip(&mut self, n: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Current(n as i64))?;
        Ok(())
    }

    /// Repositions to an absolute offset from the start of the file.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    /// The current absolute offset, used to resynchronize on record lengths.
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }
}
