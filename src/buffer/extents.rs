//! Read-only view over extent slots embedded in a foreign array header.

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ops::Index;
use std::ptr::NonNull;

use crate::runtime::RawExtents;

/// A read-only view over `len` `usize` slots spaced `step` words apart.
///
/// Foreign runtimes keep an array's dimensions inside the array object,
/// often interleaved with other header fields. This view reads them in place
/// so a shape query costs no copy. Packed data (a plain `&[usize]`) is the
/// special case `step == 1`.
#[derive(Clone, Copy)]
pub struct ExtentsView<'a> {
    ptr: NonNull<usize>,
    len: usize,
    step: usize,
    _marker: PhantomData<&'a [usize]>,
}

impl<'a> ExtentsView<'a> {
    /// View the extent slots described by `raw`.
    ///
    /// # Safety
    ///
    /// For every `i < raw.len`, `raw.ptr.add(i * raw.step)` must be valid for
    /// reads for `'a` and must not be mutated during `'a`.
    pub unsafe fn from_raw(raw: RawExtents) -> Self {
        Self {
            ptr: NonNull::new(raw.ptr as *mut usize).unwrap_or(NonNull::dangling()),
            len: raw.len,
            step: raw.step.max(1),
            _marker: PhantomData,
        }
    }

    /// View a packed slice of extents.
    pub fn from_slice(extents: &'a [usize]) -> Self {
        // SAFETY: every slot of the slice is readable for 'a.
        unsafe {
            Self::from_raw(RawExtents {
                ptr: extents.as_ptr(),
                len: extents.len(),
                step: 1,
            })
        }
    }

    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Distance in words between consecutive slots.
    #[inline]
    pub fn step(&self) -> usize {
        self.step
    }

    /// Slot `i`, if in range.
    #[inline]
    pub fn get(&self, i: usize) -> Option<usize> {
        (i < self.len).then(|| *self.slot(i))
    }

    /// First slot.
    pub fn front(&self) -> Option<usize> {
        self.get(0)
    }

    /// Last slot.
    pub fn back(&self) -> Option<usize> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    /// Iterate the slots in axis order.
    pub fn iter(&self) -> ExtentsIter<'a> {
        ExtentsIter {
            view: *self,
            front: 0,
            back: self.len,
        }
    }

    /// Packed slice of the slots, when they are contiguous.
    pub fn as_slice(&self) -> Option<&'a [usize]> {
        // SAFETY: with step 1 the slots form a contiguous readable run.
        (self.step == 1).then(|| unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) })
    }

    /// Copy the slots into a vector.
    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }

    /// Product of all slots, i.e. the element count of the shape. Saturates at
    /// `usize::MAX`; any zero slot makes it 0.
    pub fn product(&self) -> usize {
        if self.iter().any(|extent| extent == 0) {
            return 0;
        }
        self.iter().fold(1, usize::saturating_mul)
    }

    #[inline]
    fn slot(&self, i: usize) -> &'a usize {
        debug_assert!(i < self.len);
        // SAFETY: `i < len`, so the slot is covered by the constructor contract.
        unsafe { &*self.ptr.as_ptr().add(i * self.step) }
    }
}

impl Index<usize> for ExtentsView<'_> {
    type Output = usize;

    fn index(&self, i: usize) -> &usize {
        assert!(
            i < self.len,
            "extent index {} out of range for {} dimensions",
            i,
            self.len
        );
        self.slot(i)
    }
}

impl<'a> IntoIterator for ExtentsView<'a> {
    type Item = usize;
    type IntoIter = ExtentsIter<'a>;

    fn into_iter(self) -> ExtentsIter<'a> {
        self.iter()
    }
}

impl PartialEq for ExtentsView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for ExtentsView<'_> {}

impl PartialEq<[usize]> for ExtentsView<'_> {
    fn eq(&self, other: &[usize]) -> bool {
        self.len == other.len() && self.iter().eq(other.iter().copied())
    }
}

impl PartialEq<&[usize]> for ExtentsView<'_> {
    fn eq(&self, other: &&[usize]) -> bool {
        *self == **other
    }
}

impl PartialEq<Vec<usize>> for ExtentsView<'_> {
    fn eq(&self, other: &Vec<usize>) -> bool {
        *self == other[..]
    }
}

impl<const N: usize> PartialEq<[usize; N]> for ExtentsView<'_> {
    fn eq(&self, other: &[usize; N]) -> bool {
        *self == other[..]
    }
}

impl fmt::Debug for ExtentsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Iterator over the slots of an [`ExtentsView`], stepping over the words
/// interleaved between them.
#[derive(Clone)]
pub struct ExtentsIter<'a> {
    view: ExtentsView<'a>,
    front: usize,
    back: usize,
}

impl Iterator for ExtentsIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.front == self.back {
            return None;
        }
        let value = *self.view.slot(self.front);
        self.front += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<usize> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }
}

impl DoubleEndedIterator for ExtentsIter<'_> {
    fn next_back(&mut self) -> Option<usize> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(*self.view.slot(self.back))
    }
}

impl ExactSizeIterator for ExtentsIter<'_> {}

impl FusedIterator for ExtentsIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn interleaved() -> Vec<usize> {
        // extent, stride, extent, stride, extent, stride
        vec![2, 8, 3, 16, 4, 48]
    }

    #[test]
    fn test_strided_iteration() {
        let header = interleaved();
        let view = unsafe {
            ExtentsView::from_raw(RawExtents {
                ptr: header.as_ptr(),
                len: 3,
                step: 2,
            })
        };

        assert_eq!(view.len(), 3);
        assert_eq!(view.to_vec(), vec![2, 3, 4]);
        assert_eq!(view.iter().rev().collect::<Vec<_>>(), vec![4, 3, 2]);
        assert_eq!(view[1], 3);
        assert_eq!(view.front(), Some(2));
        assert_eq!(view.back(), Some(4));
        assert_eq!(view.product(), 24);
        assert_eq!(view.as_slice(), None);
    }

    #[test]
    fn test_compares_with_packed() {
        let header = interleaved();
        let strided = unsafe {
            ExtentsView::from_raw(RawExtents {
                ptr: header.as_ptr(),
                len: 3,
                step: 2,
            })
        };
        let packed = [2usize, 3, 4];

        assert_eq!(strided, ExtentsView::from_slice(&packed));
        assert_eq!(strided, packed);
        assert_eq!(strided, vec![2, 3, 4]);
        assert_ne!(strided, [2usize, 3]);
        assert_eq!(ExtentsView::from_slice(&packed).as_slice(), Some(&packed[..]));
    }

    #[test]
    fn test_iterator_len_and_nth() {
        let packed = [5usize, 6, 7, 8];
        let view = ExtentsView::from_slice(&packed);
        let mut iter = view.iter();

        assert_eq!(iter.len(), 4);
        assert_eq!(iter.nth(2), Some(7));
        assert_eq!(iter.len(), 1);
        assert_eq!(iter.next_back(), Some(8));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_empty_view() {
        let view = ExtentsView::from_slice(&[]);
        assert!(view.is_empty());
        assert_eq!(view.product(), 1);
        assert_eq!(view.get(0), None);
        assert_eq!(view.back(), None);
    }

    #[test]
    fn test_product_of_huge_extents() {
        let huge = [usize::MAX, 2];
        assert_eq!(ExtentsView::from_slice(&huge).product(), usize::MAX);
        let empty = [usize::MAX, 2, 0];
        assert_eq!(ExtentsView::from_slice(&empty).product(), 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_index_out_of_range() {
        let view = ExtentsView::from_slice(&[1, 2]);
        let _extent: usize = view[2];
    }
}
