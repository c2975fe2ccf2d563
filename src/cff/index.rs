//! CFF and CFF2 INDEX parsing.

use core::convert::TryFrom;

use crate::parser::{FromData, Stream, U24};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OffsetSize {
    Size1 = 1,
    Size2 = 2,
    Size3 = 3,
    Size4 = 4,
}

impl OffsetSize {
    #[inline]
    fn to_usize(self) -> usize {
        self as usize
    }
}

impl FromData for OffsetSize {
    const SIZE: usize = 1;

    #[inline]
    fn parse(data: &[u8]) -> Option<Self> {
        match u8::parse(data)? {
            1 => Some(OffsetSize::Size1),
            2 => Some(OffsetSize::Size2),
            3 => Some(OffsetSize::Size3),
            4 => Some(OffsetSize::Size4),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct VarOffsets<'a> {
    data: &'a [u8],
    offset_size: OffsetSize,
}

impl<'a> VarOffsets<'a> {
    fn get(&self, index: u32) -> Option<u32> {
        if index >= self.len() {
            return None;
        }

        let start = usize::try_from(index).ok()? * self.offset_size.to_usize();
        let data = self.data.get(start..)?;
        let n: u32 = match self.offset_size {
            OffsetSize::Size1 => u32::from(u8::parse(data)?),
            OffsetSize::Size2 => u32::from(u16::parse(data)?),
            OffsetSize::Size3 => U24::parse(data)?.0,
            OffsetSize::Size4 => u32::parse(data)?,
        };

        // Offsets are 1-based, so zero is never valid.
        n.checked_sub(1)
    }

    #[inline]
    fn last(&self) -> Option<u32> {
        if self.len() != 0 {
            self.get(self.len() - 1)
        } else {
            None
        }
    }

    #[inline]
    fn len(&self) -> u32 {
        (self.data.len() / self.offset_size.to_usize()) as u32
    }
}

/// An INDEX of byte ranges, used for charstrings and subroutines.
#[derive(Clone, Copy, Debug)]
pub struct Index<'a> {
    data: &'a [u8],
    offsets: VarOffsets<'a>,
}

impl Default for Index<'_> {
    #[inline]
    fn default() -> Self {
        Index {
            data: b"",
            offsets: VarOffsets {
                data: b"",
                offset_size: OffsetSize::Size1,
            },
        }
    }
}

impl<'a> Index<'a> {
    /// Parses a CFF INDEX with a 16-bit count.
    pub fn parse(s: &mut Stream<'a>) -> Option<Self> {
        let count: u16 = s.read()?;
        Self::parse_impl(u32::from(count), s)
    }

    /// Parses a CFF2 INDEX with a 32-bit count.
    pub fn parse_cff2(s: &mut Stream<'a>) -> Option<Self> {
        let count: u32 = s.read()?;
        Self::parse_impl(count, s)
    }

    fn parse_impl(count: u32, s: &mut Stream<'a>) -> Option<Self> {
        if count == 0 {
            return Some(Index::default());
        }

        let offset_size: OffsetSize = s.read()?;
        let offsets_len = usize::try_from(count.checked_add(1)?)
            .ok()?
            .checked_mul(offset_size.to_usize())?;
        let offsets = VarOffsets {
            data: s.read_bytes(offsets_len)?,
            offset_size,
        };

        // Last offset indicates the size of the object data.
        let data_len = usize::try_from(offsets.last()?).ok()?;
        let data = s.read_bytes(data_len)?;
        Some(Index { data, offsets })
    }

    #[inline]
    pub fn len(&self) -> u32 {
        // The last offset points past the object data.
        self.offsets.len().saturating_sub(1)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: u32) -> Option<&'a [u8]> {
        if index >= self.len() {
            return None;
        }

        let start = usize::try_from(self.offsets.get(index)?).ok()?;
        let end = usize::try_from(self.offsets.get(index + 1)?).ok()?;
        self.data.get(start..end)
    }

    #[inline]
    pub fn iter(&self) -> IndexIter<'a> {
        IndexIter {
            index: *self,
            offset_index: 0,
        }
    }
}

impl<'a> IntoIterator for Index<'a> {
    type Item = &'a [u8];
    type IntoIter = IndexIter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct IndexIter<'a> {
    index: Index<'a>,
    offset_index: u32,
}

impl<'a> Iterator for IndexIter<'a> {
    type Item = &'a [u8];

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.offset_index >= self.index.len() {
            return None;
        }

        let index = self.offset_index;
        self.offset_index += 1;
        self.index.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty() {
        let mut s = Stream::new(&[0, 0]);
        let index = Index::parse(&mut s).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.get(0), None);
        assert!(s.at_end());
    }

    #[test]
    fn two_items() {
        let data = [0, 2, 1, 1, 3, 4, 0xAA, 0xBB, 0xCC, 0xFF];
        let mut s = Stream::new(&data);
        let index = Index::parse(&mut s).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(0), Some(&[0xAA, 0xBB][..]));
        assert_eq!(index.get(1), Some(&[0xCC][..]));
        assert_eq!(index.get(2), None);
        assert_eq!(index.iter().count(), 2);
        assert_eq!(s.tail(), Some(&[0xFF][..]));
    }

    #[test]
    fn cff2_count() {
        let data = [0, 0, 0, 1, 2, 0, 1, 0, 2, 0x0E];
        let mut s = Stream::new(&data);
        let index = Index::parse_cff2(&mut s).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(0), Some(&[0x0E][..]));
    }

    #[test]
    fn invalid_offset_size() {
        let mut s = Stream::new(&[0, 1, 0, 1, 1]);
        assert!(Index::parse(&mut s).is_none());

        let mut s = Stream::new(&[0, 1, 5, 1, 1]);
        assert!(Index::parse(&mut s).is_none());
    }

    #[test]
    fn zero_offset() {
        let data = [0, 1, 1, 0, 2, 0xAA];
        let mut s = Stream::new(&data);
        let index = Index::parse(&mut s).unwrap();
        assert_eq!(index.get(0), None);
    }

    #[test]
    fn truncated_data() {
        let mut s = Stream::new(&[0, 1, 1, 1, 5, 0xAA]);
        assert!(Index::parse(&mut s).is_none());
    }
}
