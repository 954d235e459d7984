//! Endian-aware primitive reading and writing.
//!
//! Every FDGH file picks its byte order at runtime, so these types carry an [`Endian`] instead
//! of being generic over a [`byteorder::ByteOrder`].

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use fdgh_xbin::Endian;

use crate::error::{Error, Result};

macro_rules! read_int {
    ($name:ident, $ty:ty, $size:expr, $method:ident) => {
        #[doc = concat!("Read a `", stringify!($ty), "` in the reader's byte order")]
        pub fn $name(&mut self) -> Result<$ty> {
            let bytes = self.read_bytes($size)?;
            Ok(match self.endian {
                Endian::Big => BigEndian::$method(bytes),
                Endian::Little => LittleEndian::$method(bytes),
            })
        }
    };
}

macro_rules! write_int {
    ($name:ident, $ty:ty, $method:ident) => {
        #[doc = concat!("Write a `", stringify!($ty), "` in the writer's byte order")]
        pub fn $name(&mut self, value: $ty) -> Result<()> {
            match self.endian {
                Endian::Big => self.buf.$method::<BigEndian>(value)?,
                Endian::Little => self.buf.$method::<LittleEndian>(value)?,
            }
            Ok(())
        }
    };
}

/// Cursor over a borrowed buffer
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8], endian: Endian) -> Self {
        Self {
            data,
            pos: 0,
            endian,
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Move the cursor to an absolute position. Seeking to the very end is allowed.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(self.out_of_bounds(pos, 0));
        }
        self.pos = pos;
        Ok(())
    }

    /// Fail unless `wanted` more bytes are available at the cursor.
    pub fn ensure(&self, wanted: usize) -> Result<()> {
        match self.pos.checked_add(wanted) {
            Some(end) if end <= self.data.len() => Ok(()),
            _ => Err(self.out_of_bounds(self.pos, wanted)),
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len)?;
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    read_int!(read_u16, u16, 2, read_u16);
    read_int!(read_u32, u32, 4, read_u32);
    read_int!(read_u64, u64, 8, read_u64);
    read_int!(read_i16, i16, 2, read_i16);
    read_int!(read_i32, i32, 4, read_i32);
    read_int!(read_i64, i64, 8, read_i64);

    /// Read a `u32` length followed by that many bytes.
    pub fn read_len_prefixed(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32()? as usize;
        self.read_bytes(len)
    }

    /// Read bytes up to the first run of `terminators` consecutive zero bytes.
    ///
    /// The returned slice excludes the terminators; the cursor is left after all of them.
    pub fn read_terminated(&mut self, terminators: usize) -> Result<&'a [u8]> {
        let start = self.pos;
        let mut run = 0;
        let mut cursor = start;
        while run < terminators {
            let Some(&byte) = self.data.get(cursor) else {
                return Err(self.out_of_bounds(start, cursor + 1 - start));
            };
            run = if byte == 0 { run + 1 } else { 0 };
            cursor += 1;
        }

        self.pos = cursor;
        Ok(&self.data[start..cursor - terminators])
    }

    /// Skip zero bytes up to the next multiple of `align`.
    pub fn skip_padding(&mut self, align: usize) -> Result<()> {
        let padding = (align - self.pos % align) % align;
        let at = self.pos;
        if self.read_bytes(padding)?.iter().any(|&b| b != 0) {
            return Err(Error::malformed(at, "non-zero padding"));
        }
        Ok(())
    }

    fn out_of_bounds(&self, offset: usize, wanted: usize) -> Error {
        Error::OutOfBounds {
            offset,
            wanted,
            size: self.data.len(),
        }
    }
}

/// Growable output buffer
#[derive(Debug, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
    endian: Endian,
}

impl ByteWriter {
    pub fn new(endian: Endian) -> Self {
        Self {
            buf: Vec::new(),
            endian,
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.buf.push(value as u8);
    }

    write_int!(write_u16, u16, write_u16);
    write_int!(write_u32, u32, write_u32);
    write_int!(write_u64, u64, write_u64);
    write_int!(write_i16, i16, write_i16);
    write_int!(write_i32, i32, write_i32);
    write_int!(write_i64, i64, write_i64);

    /// Write `bytes` followed by `terminators` zero bytes.
    pub fn write_terminated(&mut self, bytes: &[u8], terminators: usize) {
        self.buf.extend_from_slice(bytes);
        self.buf.resize(self.buf.len() + terminators, 0);
    }

    /// Write a `u32` length, the bytes, `terminators` zero bytes, then pad to 4 bytes.
    pub fn write_len_prefixed(&mut self, bytes: &[u8], terminators: usize) -> Result<()> {
        let len = u32::try_from(bytes.len())
            .map_err(|_| Error::invalid("", format!("string of {} bytes", bytes.len())))?;
        self.write_u32(len)?;
        self.write_terminated(bytes, terminators);
        self.align(4);
        Ok(())
    }

    /// Pad with zero bytes up to the next multiple of `align`.
    pub fn align(&mut self, align: usize) {
        let padding = (align - self.buf.len() % align) % align;
        self.buf.resize(self.buf.len() + padding, 0);
    }

    /// Write a zero `u32` to be filled in later with [`ByteWriter::patch_u32`].
    pub fn reserve_u32(&mut self) -> usize {
        let at = self.buf.len();
        self.buf.extend_from_slice(&[0; 4]);
        at
    }

    /// Overwrite a previously written `u32`.
    pub fn patch_u32(&mut self, at: usize, value: u32) {
        let slot = &mut self.buf[at..at + 4];
        match self.endian {
            Endian::Big => BigEndian::write_u32(slot, value),
            Endian::Little => LittleEndian::write_u32(slot, value),
        }
    }
}
