//! Bounds-checked big-endian reads over a font blob

use ttrast_core::{Result, Tag, TtError};

/// Random-access reader over a byte slice
///
/// Every read names its absolute offset. Reads that would extend past the
/// end of the slice, including ones whose offset arithmetic would overflow,
/// fail with [`TtError::OutOfBounds`].
#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `len` bytes starting at `offset`
    pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| TtError::out_of_bounds(offset, len, self.data.len()))
    }

    fn array<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let bytes = self.slice(offset, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        Ok(self.array::<1>(offset)?[0])
    }

    pub fn read_i8(&self, offset: usize) -> Result<i8> {
        Ok(self.read_u8(offset)? as i8)
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16> {
        Ok(u16::from_be_bytes(self.array(offset)?))
    }

    pub fn read_i16(&self, offset: usize) -> Result<i16> {
        Ok(i16::from_be_bytes(self.array(offset)?))
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        Ok(u32::from_be_bytes(self.array(offset)?))
    }

    pub fn read_i32(&self, offset: usize) -> Result<i32> {
        Ok(i32::from_be_bytes(self.array(offset)?))
    }

    pub fn read_tag(&self, offset: usize) -> Result<Tag> {
        Ok(Tag::new(&self.array(offset)?))
    }

    /// Signed 2.14 fixed-point number
    pub fn read_f2dot14(&self, offset: usize) -> Result<f32> {
        Ok(self.read_i16(offset)? as f32 / 16384.0)
    }

    /// Sub-reader over `len` bytes at `offset`; its offsets start at zero
    pub fn sub(&self, offset: usize, len: usize) -> Result<Reader<'a>> {
        Ok(Reader::new(self.slice(offset, len)?))
    }

    /// Sub-reader from `offset` to the end of the data
    pub fn tail(&self, offset: usize) -> Result<Reader<'a>> {
        let len = self
            .data
            .len()
            .checked_sub(offset)
            .ok_or_else(|| TtError::out_of_bounds(offset, 0, self.data.len()))?;
        self.sub(offset, len)
    }

    pub fn cursor(&self, offset: usize) -> Cursor<'a> {
        Cursor {
            reader: *self,
            pos: offset,
        }
    }
}

/// Sequential reader that advances past every value it returns
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    reader: Reader<'a>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Reader::new(data).cursor(0)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn advance(&mut self, n: usize) -> Result<usize> {
        let start = self.pos;
        self.pos = start
            .checked_add(n)
            .ok_or_else(|| TtError::out_of_bounds(start, n, self.reader.len()))?;
        Ok(start)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        let start = self.pos;
        // Validate the skipped range so a later read reports the right offset
        self.reader.slice(start, n)?;
        self.advance(n).map(|_| ())
    }

    pub fn u8(&mut self) -> Result<u8> {
        let v = self.reader.read_u8(self.pos)?;
        self.advance(1)?;
        Ok(v)
    }

    pub fn i8(&mut self) -> Result<i8> {
        Ok(self.u8()? as i8)
    }

    pub fn u16(&mut self) -> Result<u16> {
        let v = self.reader.read_u16(self.pos)?;
        self.advance(2)?;
        Ok(v)
    }

    pub fn i16(&mut self) -> Result<i16> {
        let v = self.reader.read_i16(self.pos)?;
        self.advance(2)?;
        Ok(v)
    }

    pub fn u32(&mut self) -> Result<u32> {
        let v = self.reader.read_u32(self.pos)?;
        self.advance(4)?;
        Ok(v)
    }

    pub fn i32(&mut self) -> Result<i32> {
        let v = self.reader.read_i32(self.pos)?;
        self.advance(4)?;
        Ok(v)
    }

    pub fn tag(&mut self) -> Result<Tag> {
        let v = self.reader.read_tag(self.pos)?;
        self.advance(4)?;
        Ok(v)
    }

    pub fn f2dot14(&mut self) -> Result<f32> {
        Ok(self.i16()? as f32 / 16384.0)
    }

    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let v = self.reader.slice(self.pos, n)?;
        self.advance(n)?;
        Ok(v)
    }
}
