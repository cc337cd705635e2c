//! Column-major stride arithmetic.

use crate::buffer::ExtentsView;

/// Fill `strides` and `backstrides` for a column-major (first axis fastest)
/// layout of `shape`, returning the element count.
///
/// `strides[0] = 1`, `strides[d] = strides[d - 1] * shape[d - 1]` and
/// `backstrides[d] = (shape[d] - 1) * strides[d]`, with a backstride of 0 for
/// an empty axis. Strides of an empty array whose partial products exceed
/// `usize` saturate; they are never used to address elements.
pub fn compute_strides(
    shape: impl IntoIterator<Item = usize>,
    strides: &mut [usize],
    backstrides: &mut [usize],
) -> usize {
    let mut stride = 1;
    for (axis, extent) in shape.into_iter().enumerate() {
        strides[axis] = stride;
        backstrides[axis] = extent.saturating_sub(1).saturating_mul(stride);
        stride = stride.saturating_mul(extent);
    }
    stride
}

/// Element count of `shape`, or `None` if it does not fit in `usize`.
///
/// Any zero extent makes the count 0, whatever the other extents are.
pub fn checked_size(shape: impl IntoIterator<Item = usize>) -> Option<usize> {
    let mut size = Some(1usize);
    for extent in shape {
        if extent == 0 {
            return Some(0);
        }
        size = size.and_then(|size| size.checked_mul(extent));
    }
    size
}

/// Compute contiguous column-major strides for a shape.
pub fn compute_contiguous_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    let mut backstrides = vec![0; shape.len()];
    compute_strides(shape.iter().copied(), &mut strides, &mut backstrides);
    strides
}

/// Storage offset of `index`, or `None` when it is out of bounds.
///
/// An index shorter than the rank addresses the trailing axes (leading axes
/// are taken as 0); a longer one has its extra leading entries ignored.
pub(crate) fn offset_of(shape: ExtentsView<'_>, strides: &[usize], index: &[usize]) -> Option<usize> {
    let rank = shape.len();
    let index = &index[index.len().saturating_sub(rank)..];
    let lead = rank - index.len();
    let mut offset = 0;
    for (k, &i) in index.iter().enumerate() {
        let axis = lead + k;
        if i >= shape.get(axis)? {
            return None;
        }
        offset += i * strides[axis];
    }
    Some(offset)
}
