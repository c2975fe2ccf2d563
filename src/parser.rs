//! Binary parsing primitives.

use core::convert::TryInto;

/// A trait for parsing raw big-endian binary data.
///
/// This is a low-level, internal trait that should not be used directly.
pub trait FromData: Sized {
    /// Object size in raw data.
    const SIZE: usize;

    /// Parses an object from raw data.
    ///
    /// Returns `None` when `data` is shorter than `SIZE`.
    fn parse(data: &[u8]) -> Option<Self>;
}

impl FromData for u8 {
    const SIZE: usize = 1;

    #[inline]
    fn parse(data: &[u8]) -> Option<Self> {
        data.first().copied()
    }
}

impl FromData for i8 {
    const SIZE: usize = 1;

    #[inline]
    fn parse(data: &[u8]) -> Option<Self> {
        data.first().map(|b| *b as i8)
    }
}

impl FromData for u16 {
    const SIZE: usize = 2;

    #[inline]
    fn parse(data: &[u8]) -> Option<Self> {
        data.get(0..2)?.try_into().ok().map(u16::from_be_bytes)
    }
}

impl FromData for i16 {
    const SIZE: usize = 2;

    #[inline]
    fn parse(data: &[u8]) -> Option<Self> {
        data.get(0..2)?.try_into().ok().map(i16::from_be_bytes)
    }
}

impl FromData for u32 {
    const SIZE: usize = 4;

    #[inline]
    fn parse(data: &[u8]) -> Option<Self> {
        data.get(0..4)?.try_into().ok().map(u32::from_be_bytes)
    }
}

impl FromData for i32 {
    const SIZE: usize = 4;

    #[inline]
    fn parse(data: &[u8]) -> Option<Self> {
        data.get(0..4)?.try_into().ok().map(i32::from_be_bytes)
    }
}

// https://docs.microsoft.com/en-us/typography/opentype/spec/otff#data-types
#[derive(Clone, Copy, Debug)]
pub struct U24(pub u32);

impl FromData for U24 {
    const SIZE: usize = 3;

    #[inline]
    fn parse(data: &[u8]) -> Option<Self> {
        let data = data.get(0..3)?;
        Some(U24(
            u32::from(data[0]) << 16 | u32::from(data[1]) << 8 | u32::from(data[2]),
        ))
    }
}

/// A 16.16 signed fixed-point number.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fixed(i32);

impl Fixed {
    /// Zero.
    pub const ZERO: Self = Fixed(0);
    /// One.
    pub const ONE: Self = Fixed(0x10000);

    /// Creates a number from its raw 16.16 representation.
    #[inline]
    pub const fn from_bits(bits: i32) -> Self {
        Fixed(bits)
    }

    /// Returns the raw 16.16 representation.
    #[inline]
    pub const fn to_bits(self) -> i32 {
        self.0
    }

    /// Creates a number from an integer, saturating when it doesn't fit.
    #[inline]
    pub fn from_i32(n: i32) -> Self {
        Fixed(n.saturating_mul(0x10000))
    }

    /// Creates a number from a float, rounding to the nearest 1/65536.
    ///
    /// Out of range values saturate.
    #[inline]
    pub fn from_f64(n: f64) -> Self {
        Fixed((n * 65536.0).round() as i32)
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / 65536.0
    }

    #[inline]
    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }

    /// Returns the integer part if the fractional part is zero.
    #[inline]
    pub fn to_integer(self) -> Option<i32> {
        if self.0 & 0xFFFF == 0 {
            Some(self.0 >> 16)
        } else {
            None
        }
    }
}

impl core::fmt::Debug for Fixed {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

impl FromData for Fixed {
    const SIZE: usize = 4;

    #[inline]
    fn parse(data: &[u8]) -> Option<Self> {
        i32::parse(data).map(Fixed)
    }
}

/// A bounds-checked cursor over a borrowed byte range.
///
/// Cheap to copy: saving and restoring a position is a plain value copy.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Stream<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Stream<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Stream { data, offset: 0 }
    }

    #[inline]
    pub fn new_at(data: &'a [u8], offset: usize) -> Option<Self> {
        if offset <= data.len() {
            Some(Stream { data, offset })
        } else {
            None
        }
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the whole underlying range.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of bytes left after the current position.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    #[inline]
    pub fn available(&self, len: usize) -> bool {
        len <= self.remaining()
    }

    #[inline]
    pub fn tail(&self) -> Option<&'a [u8]> {
        self.data.get(self.offset..)
    }

    /// Moves forward by `len` bytes.
    ///
    /// Callers are expected to check `available` first.
    #[inline]
    pub fn advance(&mut self, len: usize) {
        self.offset = self.offset.saturating_add(len);
    }

    #[inline]
    pub fn read<T: FromData>(&mut self) -> Option<T> {
        let data = self.read_bytes(T::SIZE)?;
        T::parse(data)
    }

    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.offset.checked_add(len)?;
        let data = self.data.get(self.offset..end)?;
        self.offset = end;
        Some(data)
    }
}

impl core::fmt::Debug for Stream<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "Stream({}/{})", self.offset, self.data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_big_endian() {
        let mut s = Stream::new(&[0x01, 0x02, 0xFF, 0xFE, 0x00, 0x01, 0x80, 0x00]);
        assert_eq!(s.read::<u16>(), Some(0x0102));
        assert_eq!(s.read::<i16>(), Some(-2));
        assert_eq!(s.read::<Fixed>(), Some(Fixed::from_f64(1.5)));
        assert!(s.at_end());
        assert_eq!(s.read::<u8>(), None);
    }

    #[test]
    fn failed_read_keeps_position() {
        let mut s = Stream::new(&[0x01, 0x02, 0x03]);
        s.advance(1);
        assert_eq!(s.read::<u32>(), None);
        assert_eq!(s.offset(), 1);
        assert!(s.available(2));
        assert!(!s.available(3));
    }

    #[test]
    fn read_bytes_past_end() {
        let mut s = Stream::new(&[1, 2, 3]);
        assert_eq!(s.read_bytes(2), Some(&[1, 2][..]));
        assert_eq!(s.read_bytes(2), None);
        assert_eq!(s.tail(), Some(&[3][..]));
    }

    #[test]
    fn fixed_conversions() {
        assert_eq!(Fixed::from_i32(3).to_integer(), Some(3));
        assert_eq!(Fixed::from_i32(-3).to_integer(), Some(-3));
        assert_eq!(Fixed::from_f64(0.5).to_integer(), None);
        assert_eq!(Fixed::from_bits(0x0001_8000).to_f64(), 1.5);
        assert_eq!(Fixed::from_i32(i32::MAX), Fixed::from_bits(i32::MAX));
    }
}
