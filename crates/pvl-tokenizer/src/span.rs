//! Byte ranges into label text.

/// The bytes a token was read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// Offset of the first byte
    pub start: u32,
    /// Offset one past the last byte
    pub end: u32,
}

impl Span {
    #[inline]
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// The spanned bytes, clamped to `source`.
    pub fn slice<'a>(&self, source: &'a [u8]) -> &'a [u8] {
        let end = (self.end as usize).min(source.len());
        let start = (self.start as usize).min(end);
        &source[start..end]
    }

    /// One-based line number of the start of this span.
    pub fn line(&self, source: &[u8]) -> usize {
        let start = (self.start as usize).min(source.len());
        source[..start].iter().filter(|&&b| b == b'\n').count() + 1
    }
}
