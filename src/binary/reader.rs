//! Bounds-checked sequential reader over a byte range.

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};

use crate::config::ByteOrder;
use crate::util::{BoundsError, Error, Result, Vec3};

/// Sequential reader over `data`, which starts at absolute file offset `base`.
///
/// Every read advances the cursor by exactly the bytes consumed. Reading past
/// the end of the range is a [`BoundsError::ReadPastEnd`], never a wrap.
#[derive(Clone)]
pub struct BitCursorReader<'a> {
    data: &'a [u8],
    base: u64,
    pos: usize,
    order: ByteOrder,
}

macro_rules! read_number {
    ($name:ident, $array:ident, $ty:ty, $size:expr, $big:expr, $little:expr) => {
        #[doc = concat!("Read one `", stringify!($ty), "`.")]
        #[inline]
        pub fn $name(&mut self) -> Result<$ty> {
            let bytes = self.take($size)?;
            Ok(match self.order {
                ByteOrder::Big => $big(bytes),
                ByteOrder::Little => $little(bytes),
            })
        }

        #[doc = concat!("Read `count` consecutive `", stringify!($ty), "` values.")]
        pub fn $array(&mut self, count: usize) -> Result<Vec<$ty>> {
            let len = count.checked_mul($size).unwrap_or(usize::MAX);
            let bytes = self.take(len)?;
            Ok(bytes
                .chunks_exact($size)
                .map(|chunk| match self.order {
                    ByteOrder::Big => $big(chunk),
                    ByteOrder::Little => $little(chunk),
                })
                .collect())
        }
    };
}

impl<'a> BitCursorReader<'a> {
    /// Reader over a whole buffer starting at file offset 0.
    pub fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self { data, base: 0, pos: 0, order }
    }

    /// Reader over `data`, reporting offsets relative to `base`.
    pub fn with_base(data: &'a [u8], base: u64, order: ByteOrder) -> Self {
        Self { data, base, pos: 0, order }
    }

    /// Absolute file offset of the cursor.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.base + self.pos as u64
    }

    /// Cursor position relative to the start of the range.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.data.len()
    }

    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if len > available {
            return Err(Error::bounds(
                self.offset(),
                BoundsError::ReadPastEnd { requested: len, available },
            ));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Split off a reader over the next `len` bytes, advancing past them.
    pub fn sub_reader(&mut self, len: usize) -> Result<BitCursorReader<'a>> {
        let base = self.offset();
        let data = self.take(len)?;
        Ok(BitCursorReader::with_base(data, base, self.order))
    }

    /// Skip `len` bytes.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read `count` raw bytes.
    #[inline]
    pub fn read_u8_array(&mut self, count: usize) -> Result<&'a [u8]> {
        self.take(count)
    }

    read_number!(read_u16, read_u16_array, u16, 2, BigEndian::read_u16, LittleEndian::read_u16);
    read_number!(read_u32, read_u32_array, u32, 4, BigEndian::read_u32, LittleEndian::read_u32);
    read_number!(read_f32, read_f32_array, f32, 4, BigEndian::read_f32, LittleEndian::read_f32);

    /// Read a 64-bit unsigned integer as one 8-byte word in the reader's byte order.
    #[inline]
    pub fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.take(8)?;
        Ok(match self.order {
            ByteOrder::Big => BigEndian::read_u64(bytes),
            ByteOrder::Little => LittleEndian::read_u64(bytes),
        })
    }

    /// Read three consecutive `f32` values as a vector.
    pub fn read_vec3(&mut self) -> Result<Vec3> {
        let x = self.read_f32()?;
        let y = self.read_f32()?;
        let z = self.read_f32()?;
        Ok(Vec3::new(x, y, z))
    }
}
