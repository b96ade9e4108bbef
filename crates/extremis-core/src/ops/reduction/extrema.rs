//! Min, max and peak-to-peak over any subset of axes
//!
//! Each operation normalizes the axis argument, validates the input, then
//! hands the work to a [`Dispatcher`]. `reduce_range` is computed as two
//! dispatched reductions followed by an element-wise subtraction.

use super::common::{normalize_axes, AxisSpec, NormalizedAxes};
use crate::dispatch::Dispatcher;
use crate::error::ErrorContext;
use crate::{Element, ReduceOp, Result, Tensor, TensorError};

/// Reduction front end bound to one [`Dispatcher`].
///
/// The free functions [`reduce_min`], [`reduce_max`] and [`reduce_range`]
/// use [`Reducer::global`].
#[derive(Debug, Clone, Default)]
pub struct Reducer {
    dispatcher: Dispatcher,
}

impl Reducer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Reducer using the process-wide backend and configuration
    pub fn global() -> Self {
        Self::new(Dispatcher::global())
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Smallest element over `axis`
    pub fn min<T: Element>(&self, x: &Tensor<T>, axis: impl Into<AxisSpec>, keepdims: bool) -> Result<Tensor<T>> {
        let spec = axis.into();
        self.extreme(x, &spec, keepdims, ReduceOp::Min)
            .map_err(|e| e.with_context(error_context(x, &spec, "reduce_min")))
    }

    /// Largest element over `axis`
    pub fn max<T: Element>(&self, x: &Tensor<T>, axis: impl Into<AxisSpec>, keepdims: bool) -> Result<Tensor<T>> {
        let spec = axis.into();
        self.extreme(x, &spec, keepdims, ReduceOp::Max)
            .map_err(|e| e.with_context(error_context(x, &spec, "reduce_max")))
    }

    /// `max - min` over `axis`.
    ///
    /// Integer ranges wrap on overflow. Booleans are rejected before any
    /// work is done.
    pub fn range<T: Element>(&self, x: &Tensor<T>, axis: impl Into<AxisSpec>, keepdims: bool) -> Result<Tensor<T>> {
        let spec = axis.into();
        self.peak_to_peak(x, &spec, keepdims)
            .map_err(|e| e.with_context(error_context(x, &spec, "reduce_range")))
    }

    fn extreme<T: Element>(
        &self,
        x: &Tensor<T>,
        spec: &AxisSpec,
        keepdims: bool,
        op: ReduceOp,
    ) -> Result<Tensor<T>> {
        let axes = normalize_axes(spec, x.ndim())?;
        let result = self.dispatcher.reduce(x, &axes, op)?;
        restore_reduced_axes(result, &axes, keepdims)
    }

    fn peak_to_peak<T: Element>(&self, x: &Tensor<T>, spec: &AxisSpec, keepdims: bool) -> Result<Tensor<T>> {
        if !T::DTYPE.supports_range() {
            return Err(TensorError::unsupported_dtype(
                "reduce_range",
                T::DTYPE,
                "peak-to-peak is undefined for booleans",
            ));
        }
        let axes = normalize_axes(spec, x.ndim())?;
        let max = self.dispatcher.reduce(x, &axes, ReduceOp::Max)?;
        let min = self.dispatcher.reduce(x, &axes, ReduceOp::Min)?;

        let values = max
            .iter()
            .zip(min.iter())
            .map(|(hi, lo)| T::range(hi, lo))
            .collect::<Option<Vec<T>>>()
            .ok_or_else(|| {
                TensorError::unsupported_dtype("reduce_range", T::DTYPE, "no subtraction for this dtype")
            })?;
        let result = Tensor::from_vec(values, max.shape().dims())?;
        restore_reduced_axes(result, &axes, keepdims)
    }
}

fn restore_reduced_axes<T: Element>(result: Tensor<T>, axes: &NormalizedAxes, keepdims: bool) -> Result<Tensor<T>> {
    if keepdims {
        result.insert_unit_axes(&axes.to_vec())
    } else {
        Ok(result)
    }
}

fn error_context<T: Element>(x: &Tensor<T>, spec: &AxisSpec, operation: &str) -> ErrorContext {
    ErrorContext::new()
        .with_input_tensor(x.shape().dims(), T::DTYPE)
        .with_axes(&spec.raw())
        .with_metadata("operation", operation)
}

/// Smallest element of `x` over `axis`.
///
/// `axis` may be a single (possibly negative) axis, a list of axes or
/// [`AxisSpec::All`]. With `keepdims` the reduced axes stay as size-1
/// dimensions.
///
/// # Examples
/// ```
/// use extremis_core::{reduce_min, Tensor};
///
/// let x = Tensor::from_vec(vec![1, 2, 3, 4, 0, 6], &[2, 3]).unwrap();
/// assert_eq!(reduce_min(&x, 0, false).unwrap().to_vec(), vec![1, 0, 3]);
/// ```
pub fn reduce_min<T: Element>(x: &Tensor<T>, axis: impl Into<AxisSpec>, keepdims: bool) -> Result<Tensor<T>> {
    Reducer::global().min(x, axis, keepdims)
}

/// Largest element of `x` over `axis`; see [`reduce_min`]
pub fn reduce_max<T: Element>(x: &Tensor<T>, axis: impl Into<AxisSpec>, keepdims: bool) -> Result<Tensor<T>> {
    Reducer::global().max(x, axis, keepdims)
}

/// Peak-to-peak (`max - min`) of `x` over `axis`; see [`reduce_min`]
pub fn reduce_range<T: Element>(x: &Tensor<T>, axis: impl Into<AxisSpec>, keepdims: bool) -> Result<Tensor<T>> {
    Reducer::global().range(x, axis, keepdims)
}

impl<T: Element> Tensor<T> {
    /// Shorthand for [`reduce_min`]
    pub fn amin(&self, axis: impl Into<AxisSpec>, keepdims: bool) -> Result<Self> {
        reduce_min(self, axis, keepdims)
    }

    /// Shorthand for [`reduce_max`]
    pub fn amax(&self, axis: impl Into<AxisSpec>, keepdims: bool) -> Result<Self> {
        reduce_max(self, axis, keepdims)
    }

    /// Shorthand for [`reduce_range`]
    pub fn ptp(&self, axis: impl Into<AxisSpec>, keepdims: bool) -> Result<Self> {
        reduce_range(self, axis, keepdims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DType, ErrorKind};

    fn generic() -> Reducer {
        Reducer::new(Dispatcher::generic())
    }

    #[test]
    fn test_min_max_range_axis0() {
        let x = Tensor::from_vec(vec![1, 2, 3, 4, 0, 6], &[2, 3]).unwrap();
        let r = generic();
        assert_eq!(r.min(&x, 0, false).unwrap().to_vec(), vec![1, 0, 3]);
        assert_eq!(r.max(&x, 0, false).unwrap().to_vec(), vec![4, 2, 6]);
        assert_eq!(r.range(&x, 0, false).unwrap().to_vec(), vec![3, 2, 3]);
    }

    #[test]
    fn test_keepdims_shape() {
        let x = Tensor::from_vec((0..24).map(|v| v as f64).collect(), &[2, 3, 4]).unwrap();
        let r = generic();
        let kept = r.max(&x, [1, 2], true).unwrap();
        assert_eq!(kept.shape().dims(), &[2, 1, 1]);
        assert_eq!(kept.to_vec(), vec![11.0, 23.0]);

        let all = r.range(&x, AxisSpec::All, true).unwrap();
        assert_eq!(all.shape().dims(), &[1, 1, 1]);
        assert_eq!(all.item(), Some(23.0));

        let dropped = r.min(&x, AxisSpec::All, false).unwrap();
        assert_eq!(dropped.ndim(), 0);
    }

    #[test]
    fn test_bool_range_rejected() {
        let x = Tensor::from_vec(vec![true, false], &[2]).unwrap();
        let err = generic().range(&x, 0, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        let ctx = err.context().unwrap();
        assert_eq!(ctx.input_dtype, Some(DType::Bool));
        assert_eq!(ctx.metadata.get("operation").map(String::as_str), Some("reduce_range"));

        assert_eq!(generic().min(&x, 0, false).unwrap().item(), Some(false));
        assert_eq!(generic().max(&x, 0, false).unwrap().item(), Some(true));
    }

    #[test]
    fn test_errors_carry_axes() {
        let x = Tensor::from_vec(vec![1u32, 2, 3, 4], &[2, 2]).unwrap();
        let err = generic().min(&x, [0, -2], false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Axis);
        assert_eq!(err.context().and_then(|c| c.axes.clone()), Some(vec![0, -2]));
    }

    #[test]
    fn test_integer_range_wraps() {
        let x = Tensor::from_vec(vec![-128i8, 0, 127], &[3]).unwrap();
        assert_eq!(generic().range(&x, 0, false).unwrap().item(), Some(-1));
    }

    #[test]
    fn test_tensor_methods() {
        let x = Tensor::from_vec(vec![3.0f32, -1.0, 2.0, 8.0], &[2, 2]).unwrap();
        assert_eq!(x.amin(AxisSpec::All, false).unwrap().item(), Some(-1.0));
        assert_eq!(x.amax(1, false).unwrap().to_vec(), vec![3.0, 8.0]);
        assert_eq!(x.ptp(-1, true).unwrap().shape().dims(), &[2, 1]);
    }
}
