//! Growable little-endian binary writer.

use crate::BufferError;

/// An append-only byte buffer that can also patch bytes it already wrote.
///
/// Container encoders reserve a header, write the payload, then come back and
/// rewrite the header once the payload length is known; [`Writer::resize_region`]
/// grows or shrinks the reserved header in place.
///
/// # Example
///
/// ```
/// use docjson_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8(0xAA);
/// writer.u8(0x00);
/// writer.utf8("hi");
/// writer.resize_region(1, 1, 2).unwrap();
/// writer.patch_u16(1, 2).unwrap();
/// assert_eq!(writer.flush(), vec![0xAA, 0x02, 0x00, b'h', b'i']);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Writer {
    /// Bytes written so far.
    pub uint8: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            uint8: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written.
    pub fn len(&self) -> usize {
        self.uint8.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uint8.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.uint8
    }

    /// Clears the buffer, keeping its allocation.
    pub fn reset(&mut self) {
        self.uint8.clear();
    }

    /// Takes the written bytes, leaving the writer empty.
    pub fn flush(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.uint8)
    }

    /// Drops everything after `len`.
    pub fn truncate(&mut self, len: usize) {
        self.uint8.truncate(len);
    }

    #[inline]
    pub fn u8(&mut self, value: u8) {
        self.uint8.push(value);
    }

    #[inline]
    pub fn i8(&mut self, value: i8) {
        self.uint8.push(value as u8);
    }

    #[inline]
    pub fn u16(&mut self, value: u16) {
        self.uint8.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn i16(&mut self, value: i16) {
        self.uint8.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes the low 24 bits of `value`.
    #[inline]
    pub fn u24(&mut self, value: u32) {
        self.uint8.extend_from_slice(&value.to_le_bytes()[..3]);
    }

    #[inline]
    pub fn u32(&mut self, value: u32) {
        self.uint8.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn i32(&mut self, value: i32) {
        self.uint8.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn u64(&mut self, value: u64) {
        self.uint8.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn i64(&mut self, value: i64) {
        self.uint8.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn f32(&mut self, value: f32) {
        self.uint8.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn f64(&mut self, value: f64) {
        self.uint8.extend_from_slice(&value.to_le_bytes());
    }

    pub fn buf(&mut self, bytes: &[u8]) {
        self.uint8.extend_from_slice(bytes);
    }

    pub fn utf8(&mut self, value: &str) {
        self.uint8.extend_from_slice(value.as_bytes());
    }

    /// Overwrites already-written bytes starting at `at`.
    pub fn patch(&mut self, at: usize, bytes: &[u8]) -> Result<(), BufferError> {
        let end = at + bytes.len();
        if end > self.uint8.len() {
            return Err(BufferError::Overflow);
        }
        self.uint8[at..end].copy_from_slice(bytes);
        Ok(())
    }

    pub fn patch_u8(&mut self, at: usize, value: u8) -> Result<(), BufferError> {
        self.patch(at, &[value])
    }

    pub fn patch_u16(&mut self, at: usize, value: u16) -> Result<(), BufferError> {
        self.patch(at, &value.to_le_bytes())
    }

    pub fn patch_u24(&mut self, at: usize, value: u32) -> Result<(), BufferError> {
        self.patch(at, &value.to_le_bytes()[..3])
    }

    pub fn patch_u32(&mut self, at: usize, value: u32) -> Result<(), BufferError> {
        self.patch(at, &value.to_le_bytes())
    }

    /// Replaces the `old_len` bytes at `at` with `new_len` zero bytes, shifting
    /// everything after the region.
    pub fn resize_region(
        &mut self,
        at: usize,
        old_len: usize,
        new_len: usize,
    ) -> Result<(), BufferError> {
        if at + old_len > self.uint8.len() {
            return Err(BufferError::Overflow);
        }
        if old_len == new_len {
            return Ok(());
        }
        self.uint8
            .splice(at..at + old_len, std::iter::repeat(0u8).take(new_len));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_writes() {
        let mut writer = Writer::new();
        writer.u16(0x0201);
        writer.u24(0x050403);
        writer.u32(0x09080706);
        assert_eq!(writer.as_slice(), &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_patch() {
        let mut writer = Writer::new();
        writer.u32(0);
        writer.patch_u24(1, 0x030201).unwrap();
        assert_eq!(writer.as_slice(), &[0, 1, 2, 3]);
        assert_eq!(writer.patch_u16(3, 1), Err(BufferError::Overflow));
    }

    #[test]
    fn test_resize_region_grow_and_shrink() {
        let mut writer = Writer::new();
        writer.buf(&[0xE2, 0x00, 1, 2, 3]);
        writer.resize_region(1, 1, 3).unwrap();
        assert_eq!(writer.as_slice(), &[0xE2, 0, 0, 0, 1, 2, 3]);
        writer.resize_region(0, 4, 1).unwrap();
        assert_eq!(writer.as_slice(), &[0, 1, 2, 3]);
        assert!(writer.resize_region(3, 2, 0).is_err());
    }

    #[test]
    fn test_flush_resets() {
        let mut writer = Writer::new();
        writer.utf8("abc");
        assert_eq!(writer.flush(), b"abc".to_vec());
        assert!(writer.is_empty());
    }
}
