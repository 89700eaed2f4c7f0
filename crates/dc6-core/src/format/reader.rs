use super::error::CursorError;

/// Forward-only reader over an immutable byte buffer.
///
/// Every read is bounds-checked and advances the offset only on success, so
/// a failed read leaves the cursor where it was.
///
/// # Examples
/// ```
/// use dc6_core::ByteCursor;
///
/// let data = [6, 0, 0, 0, 0xAA];
/// let mut cursor = ByteCursor::new(&data);
/// assert_eq!(cursor.read_u32_le().unwrap(), 6);
/// assert_eq!(cursor.offset(), 4);
/// assert!(cursor.read(2).is_err());
/// assert_eq!(cursor.read(1).unwrap(), &[0xAA]);
/// ```
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    pub fn require(&self, needed: usize) -> Result<(), CursorError> {
        if self.remaining() < needed {
            return Err(CursorError {
                offset: self.offset,
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    /// Return the next `n` bytes and advance past them.
    pub fn read(&mut self, n: usize) -> Result<&'a [u8], CursorError> {
        self.require(n)?;
        let start = self.offset;
        self.offset += n;
        Ok(&self.data[start..self.offset])
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CursorError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, CursorError> {
        let [value] = self.read_array::<1>()?;
        Ok(value)
    }

    pub fn read_u32_le(&mut self) -> Result<u32, CursorError> {
        self.read_array::<4>().map(u32::from_le_bytes)
    }

    pub fn read_i32_le(&mut self) -> Result<i32, CursorError> {
        self.read_array::<4>().map(i32::from_le_bytes)
    }
}
