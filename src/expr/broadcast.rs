//! Trailing-axis broadcasting.

use super::ElementAccess;
use crate::buffer::ExtentsView;
use crate::error::{Error, Result};

/// Broadcast `input` into `output`, aligned on trailing axes.
///
/// Axes of `output` that hold 1 take the input extent; input axes of extent 1
/// stretch to the output extent. Any other disagreement is an error, as is an
/// input with more axes than `output`.
///
/// Returns `true` when `output` already equalled `input` (a trivial
/// broadcast).
pub fn broadcast_into(input: ExtentsView<'_>, output: &mut [usize]) -> Result<bool> {
    if input.len() > output.len() {
        return Err(Error::DimensionMismatch {
            expected: output.len(),
            actual: input.len(),
        });
    }
    let trivial = input == *output;
    let lead = output.len() - input.len();
    for (axis, extent) in input.iter().enumerate() {
        let slot = &mut output[lead + axis];
        if *slot == 1 {
            *slot = extent;
        } else if extent != 1 && extent != *slot {
            return Err(Error::ShapeMismatch {
                expected: output.to_vec(),
                actual: input.to_vec(),
            });
        }
    }
    Ok(trivial)
}

/// Common broadcast shape of several operands.
pub fn broadcast_shapes(shapes: &[ExtentsView<'_>]) -> Result<Vec<usize>> {
    let rank = shapes.iter().map(ExtentsView::len).max().unwrap_or(0);
    let mut output = vec![1; rank];
    for shape in shapes {
        broadcast_into(*shape, &mut output)?;
    }
    Ok(output)
}

/// Map an index over `output_rank` axes onto an operand of `shape`.
///
/// Leading axes the operand lacks are dropped and axes where the operand has
/// extent 1 are pinned to 0. Returns `None` when `index` applies unchanged.
pub(crate) fn project_index(index: &[usize], shape: ExtentsView<'_>) -> Option<Vec<usize>> {
    let lead = index.len() - shape.len();
    let trailing = &index[lead..];
    let unchanged = lead == 0 && shape.iter().zip(trailing).all(|(e, &i)| e != 1 || i == 0);
    if unchanged {
        return None;
    }
    Some(
        shape
            .iter()
            .zip(trailing)
            .map(|(extent, &i)| if extent == 1 { 0 } else { i })
            .collect(),
    )
}

/// Read `operand` at an index of the enclosing broadcast shape.
#[inline]
pub(crate) fn read<E: ElementAccess + ?Sized>(operand: &E, index: &[usize]) -> E::Elem {
    match project_index(index, operand.shape()) {
        None => operand.element(index),
        Some(projected) => operand.element(&projected),
    }
}
