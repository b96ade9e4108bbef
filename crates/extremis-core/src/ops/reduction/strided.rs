//! Generic strided reducer
//!
//! Works for every element type and every layout, including negative and
//! zero strides. The accelerated path must always agree with it.

use super::common::NormalizedAxes;
use crate::shape::checked_numel;
use crate::strided::{StrideWalker, StridedLayout};
use crate::{Element, OrderingPolicy, ReduceOp, Result, Shape, Tensor, TensorError};
use std::sync::Arc;

/// Reject reductions that would fold zero elements.
///
/// A reduced axis of length 0 is an error even if kept axes are empty too;
/// a zero-length kept axis alone yields an empty result.
pub fn check_reducible(operation: &str, shape: &Shape, axes: &NormalizedAxes) -> Result<()> {
    if let NormalizedAxes::All { .. } = axes {
        if shape.size() == 0 {
            return Err(TensorError::empty_reduction(
                operation,
                format!("cannot reduce an empty array of shape {shape} over all axes"),
            ));
        }
        return Ok(());
    }
    if let Some(axis) = axes.to_vec().into_iter().find(|&axis| shape[axis] == 0) {
        return Err(TensorError::empty_reduction(
            operation,
            format!("axis {axis} of shape {shape} has length 0"),
        ));
    }
    Ok(())
}

/// Reduce `x` over `axes` with `op`, visiting elements through its strides.
///
/// The result has the kept axes of `x`, in order, laid out in C order.
pub fn reduce_strided<T: Element>(
    x: &Tensor<T>,
    axes: &NormalizedAxes,
    op: ReduceOp,
    policy: &OrderingPolicy<T>,
) -> Result<Tensor<T>> {
    check_reducible(op.name(), x.shape(), axes)?;

    let layout = x.layout();
    let (mut kept_dims, mut kept_strides) = (Vec::new(), Vec::new());
    let (mut red_dims, mut red_strides) = (Vec::new(), Vec::new());
    for (axis, (&dim, &stride)) in layout.shape().iter().zip(layout.strides()).enumerate() {
        if axes.contains(axis) {
            red_dims.push(dim);
            red_strides.push(stride);
        } else {
            kept_dims.push(dim);
            kept_strides.push(stride);
        }
    }

    let combine = policy.combiner(op);
    let data = x.storage();
    let base = layout.offset() as isize;
    // Kept dims of a valid tensor never overflow.
    let mut out = Vec::with_capacity(checked_numel(&kept_dims).unwrap_or(0));

    let mut inner = StrideWalker::new(red_dims, red_strides);
    for outer in StrideWalker::new(kept_dims.clone(), kept_strides) {
        inner.reset();
        let start = base + outer;
        let folded = inner
            .by_ref()
            .map(|rel| data[(start + rel) as usize])
            .reduce(combine)
            .ok_or_else(|| TensorError::empty_reduction(op.name(), "reduction group is empty"))?;
        out.push(folded);
    }

    Tensor::from_parts(Arc::new(out), StridedLayout::new(kept_dims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::reduction::common::{normalize_axes, AxisSpec};
    use crate::ErrorKind;

    fn reduce<T: Element>(x: &Tensor<T>, axis: impl Into<AxisSpec>, op: ReduceOp) -> Result<Tensor<T>> {
        let axes = normalize_axes(&axis.into(), x.ndim())?;
        reduce_strided(x, &axes, op, &T::policy())
    }

    #[test]
    fn test_reduce_axis0() {
        let x = Tensor::from_vec(vec![1, 2, 3, 4, 0, 6], &[2, 3]).unwrap();
        assert_eq!(reduce(&x, 0, ReduceOp::Min).unwrap().to_vec(), vec![1, 0, 3]);
        assert_eq!(reduce(&x, 0, ReduceOp::Max).unwrap().to_vec(), vec![4, 2, 6]);
        assert_eq!(reduce(&x, -1, ReduceOp::Max).unwrap().to_vec(), vec![3, 6]);
    }

    #[test]
    fn test_reduce_all_to_scalar() {
        let x = Tensor::from_vec(vec![5u8, 9, 1, 7], &[2, 2]).unwrap();
        let r = reduce(&x, AxisSpec::All, ReduceOp::Max).unwrap();
        assert_eq!(r.ndim(), 0);
        assert_eq!(r.item(), Some(9));
    }

    #[test]
    fn test_no_axes_copies() {
        let x = Tensor::from_vec(vec![1i16, -2, 3], &[3]).unwrap();
        let r = reduce(&x, Vec::<isize>::new(), ReduceOp::Min).unwrap();
        assert_eq!(r, x);
    }

    #[test]
    fn test_negative_and_zero_strides() {
        let x = Tensor::from_vec((0..12).collect::<Vec<i64>>(), &[3, 4]).unwrap();
        let flipped = x.flip(1).unwrap().transpose(None).unwrap();
        // flipped[i][j] = x[j][3 - i]
        let r = reduce(&flipped, 1, ReduceOp::Max).unwrap();
        assert_eq!(r.to_vec(), vec![11, 10, 9, 8]);

        let row = Tensor::from_vec(vec![4.0f32, -1.0, 2.5], &[3]).unwrap();
        let broadcast = row.broadcast_to(&[5, 3]).unwrap();
        let r = reduce(&broadcast, 0, ReduceOp::Min).unwrap();
        assert_eq!(r.to_vec(), vec![4.0, -1.0, 2.5]);
    }

    #[test]
    fn test_sliced_view() {
        let x = Tensor::from_vec((0..20).collect::<Vec<i32>>(), &[4, 5]).unwrap();
        let view = x.slice_axis(1, 1..5, 2).unwrap();
        // columns 1 and 3
        let r = reduce(&view, 0, ReduceOp::Max).unwrap();
        assert_eq!(r.to_vec(), vec![16, 18]);
    }

    #[test]
    fn test_empty_reduced_axis_errors() {
        let x = Tensor::<f64>::from_vec(Vec::new(), &[0, 3]).unwrap();
        let err = reduce(&x, 0, ReduceOp::Min).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert!(reduce(&x, AxisSpec::All, ReduceOp::Max).is_err());
    }

    #[test]
    fn test_empty_kept_axis_gives_empty_result() {
        let x = Tensor::<f64>::from_vec(Vec::new(), &[0, 3]).unwrap();
        let r = reduce(&x, 1, ReduceOp::Min).unwrap();
        assert_eq!(r.shape().dims(), &[0]);
        assert!(r.is_empty());
    }
}
