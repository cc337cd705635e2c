//! Non-owning views over foreign-owned memory.
//!
//! - [`BufferView`] / [`BufferViewMut`]: a contiguous run of elements
//! - [`ExtentsView`]: per-axis extent slots embedded in a foreign array header
//!
//! None of these types own or copy what they point at. Their lifetime
//! parameter ties them to whoever keeps the foreign object alive, usually a
//! [`Container`](crate::Container) borrowed for `'a`.

mod extents;

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::slice;

pub use extents::{ExtentsIter, ExtentsView};

/// A read-only view over `len` contiguous elements.
///
/// Copying the view copies the `(pointer, length)` pair, never the elements.
/// Equality is elementwise and ordering is lexicographic, exactly as for
/// slices.
#[derive(Clone, Copy)]
pub struct BufferView<'a, T> {
    ptr: NonNull<T>,
    len: usize,
    _marker: PhantomData<&'a [T]>,
}

impl<'a, T> BufferView<'a, T> {
    /// Create a view from a raw pointer and length.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `len` properly aligned, initialized
    /// elements for `'a`, and nothing may mutate them during `'a`. A null
    /// `ptr` is only allowed when `len` is zero.
    pub unsafe fn from_raw_parts(ptr: *const T, len: usize) -> Self {
        debug_assert!(!ptr.is_null() || len == 0);
        Self {
            ptr: NonNull::new(ptr as *mut T).unwrap_or(NonNull::dangling()),
            len,
            _marker: PhantomData,
        }
    }

    /// View an ordinary slice.
    pub fn from_slice(data: &'a [T]) -> Self {
        // SAFETY: a slice satisfies every requirement of from_raw_parts.
        unsafe { Self::from_raw_parts(data.as_ptr(), data.len()) }
    }

    /// Number of elements in the view.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the view is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pointer to the first element.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// The viewed elements as a slice living for `'a`.
    #[inline]
    pub fn as_slice(&self) -> &'a [T] {
        // SAFETY: guaranteed by the constructor contract.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// First element, if any.
    pub fn front(&self) -> Option<&'a T> {
        self.as_slice().first()
    }

    /// Last element, if any.
    pub fn back(&self) -> Option<&'a T> {
        self.as_slice().last()
    }

    /// Iterate the elements in buffer order; `.rev()` walks backwards.
    pub fn iter(&self) -> slice::Iter<'a, T> {
        self.as_slice().iter()
    }
}

impl<T> Deref for BufferView<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<'a, T> IntoIterator for BufferView<'a, T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<T: PartialEq> PartialEq for BufferView<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for BufferView<'_, T> {}

impl<T: PartialOrd> PartialOrd for BufferView<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Ord> Ord for BufferView<'_, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T: fmt::Debug> fmt::Debug for BufferView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// A mutable view over `len` contiguous elements.
pub struct BufferViewMut<'a, T> {
    ptr: NonNull<T>,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

impl<'a, T> BufferViewMut<'a, T> {
    /// Create a mutable view from a raw pointer and length.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads and writes of `len` properly aligned,
    /// initialized elements for `'a`, and no other access to them may happen
    /// during `'a`. A null `ptr` is only allowed when `len` is zero.
    pub unsafe fn from_raw_parts(ptr: *mut T, len: usize) -> Self {
        debug_assert!(!ptr.is_null() || len == 0);
        Self {
            ptr: NonNull::new(ptr).unwrap_or(NonNull::dangling()),
            len,
            _marker: PhantomData,
        }
    }

    /// Number of elements in the view.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the view is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pointer to the first element.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Consume the view into a slice living for `'a`.
    pub fn into_slice(self) -> &'a mut [T] {
        // SAFETY: guaranteed by the constructor contract; `self` is consumed
        // so the exclusive borrow moves into the slice.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Reborrow as a read-only view.
    pub fn as_view(&self) -> BufferView<'_, T> {
        // SAFETY: the shared reborrow of `self` forbids mutation meanwhile.
        unsafe { BufferView::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T> Deref for BufferViewMut<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        // SAFETY: guaranteed by the constructor contract.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T> DerefMut for BufferViewMut<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        // SAFETY: guaranteed by the constructor contract.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: fmt::Debug> fmt::Debug for BufferViewMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_does_not_copy() {
        let data = [1, 2, 3, 4];
        let view = BufferView::from_slice(&data);
        let copy = view;

        assert_eq!(view.as_ptr(), data.as_ptr());
        assert_eq!(copy.as_ptr(), view.as_ptr());
        assert_eq!(view.len(), 4);
        assert_eq!(view[2], 3);
    }

    #[test]
    fn test_front_back_and_reverse() {
        let data = [5, 6, 7];
        let view = BufferView::from_slice(&data);

        assert_eq!(view.front(), Some(&5));
        assert_eq!(view.back(), Some(&7));
        assert_eq!(view.iter().rev().copied().collect::<Vec<_>>(), vec![7, 6, 5]);

        let empty = BufferView::<i32>::from_slice(&[]);
        assert!(empty.is_empty());
        assert_eq!(empty.front(), None);
    }

    #[test]
    fn test_lexicographic_ordering() {
        let a = [1, 2, 3];
        let b = [1, 2, 4];
        let prefix = [1, 2];

        let va = BufferView::from_slice(&a);
        let vb = BufferView::from_slice(&b);
        let vp = BufferView::from_slice(&prefix);

        assert!(va < vb);
        assert!(vp < va);
        assert!(vb >= va);
        assert_ne!(va, vp);
        assert_eq!(va, BufferView::from_slice(&[1, 2, 3]));
    }

    #[test]
    fn test_mutable_view_writes_through() {
        let mut data = vec![0.0f64; 3];
        let view = unsafe { BufferViewMut::from_raw_parts(data.as_mut_ptr(), data.len()) };
        let slice = view.into_slice();
        slice[1] = 2.5;
        assert_eq!(data, vec![0.0, 2.5, 0.0]);
    }
}
