//! Accelerated-backend dispatch
//!
//! The [`Dispatcher`] decides per call whether a reduction can be handed to a
//! [`ReductionBackend`], runs it there, and recomputes it with the generic
//! strided reducer when the backend declines. Callers always receive the
//! generic reducer's answer; the route taken is only visible through
//! [`DispatchReport`] and `tracing` output.

use crate::backend::{
    default_backend, BackendBuffer, BackendOutcome, BackendType, ReductionBackend, SegmentSpec,
};
use crate::config::{get_dispatch_config, DispatchConfig};
use crate::ops::reduction::common::NormalizedAxes;
use crate::ops::reduction::strided::{check_reducible, reduce_strided};
use crate::strided::{MemoryOrder, StridedLayout};
use crate::{DType, Element, ReduceOp, Result, Tensor, TensorError};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Shape class of an accelerated reduction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReductionKind {
    /// Every axis reduced; the input collapses to one element
    Full,
    /// A proper subset of axes reduced
    Segmented,
}

/// How the reduced and kept axes of a view sit in memory.
///
/// Axes of extent 1 are ignored: they never change an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisGroupDescriptor {
    /// Dense order of the view, if it is dense at all
    pub memory_order: Option<MemoryOrder>,
    /// The reduced axes form one run in memory order
    pub reduced_contiguous: bool,
    /// The kept axes form one run in memory order
    pub kept_contiguous: bool,
    pub kind: ReductionKind,
    /// Matrix view of a segmented reduction over a dense view
    pub segments: Option<SegmentSpec>,
}

impl AxisGroupDescriptor {
    /// True when a backend can run the reduction as one full or segmented
    /// call
    pub fn is_backend_shaped(&self) -> bool {
        self.memory_order.is_some() && self.reduced_contiguous && self.kept_contiguous
    }
}

/// Describe the axis groups of `layout` for the reduced set `axes`
pub fn describe_axis_groups(layout: &StridedLayout, axes: &NormalizedAxes) -> AxisGroupDescriptor {
    let kind = if axes.covers_all() {
        ReductionKind::Full
    } else {
        ReductionKind::Segmented
    };
    let memory_order = layout.memory_order();

    // (extent, reduced) from the outermost to the innermost axis in memory
    let shape = layout.shape();
    let mut groups: Vec<(usize, bool)> = (0..shape.len())
        .filter(|&axis| shape[axis] != 1)
        .map(|axis| (shape[axis], axes.contains(axis)))
        .collect();
    if memory_order == Some(MemoryOrder::F) {
        groups.reverse();
    }

    let runs = |reduced: bool| {
        groups
            .iter()
            .enumerate()
            .filter(|&(i, &(_, r))| r == reduced && (i == 0 || groups[i - 1].1 != reduced))
            .count()
    };
    let reduced_contiguous = runs(true) <= 1;
    let kept_contiguous = runs(false) <= 1;

    let segments = match (memory_order, kind) {
        (Some(_), ReductionKind::Segmented) if reduced_contiguous && kept_contiguous => {
            let product = |reduced: bool| -> usize {
                groups
                    .iter()
                    .filter(|&&(_, r)| r == reduced)
                    .map(|&(extent, _)| extent)
                    .product()
            };
            let num_segments = product(false);
            let segment_len = product(true);
            // Reduced axes outermost means each segment is a strided column.
            if groups.first().map_or(false, |&(_, reduced)| reduced)
                && groups.iter().any(|&(_, reduced)| !reduced)
            {
                Some(SegmentSpec::columns(num_segments, segment_len))
            } else {
                Some(SegmentSpec::rows(num_segments, segment_len))
            }
        }
        _ => None,
    };

    AxisGroupDescriptor {
        memory_order,
        reduced_contiguous,
        kept_contiguous,
        kind,
        segments,
    }
}

/// Why a reduction went straight to the generic reducer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ineligibility {
    AccelerationDisabled,
    NoBackend,
    UnsupportedDType(DType),
    EmptyInput,
    BelowThreshold { len: usize, min: usize },
    NoReducedAxes,
    NonContiguousLayout,
    InterleavedAxes,
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ineligibility::AccelerationDisabled => write!(f, "acceleration disabled"),
            Ineligibility::NoBackend => write!(f, "no backend registered"),
            Ineligibility::UnsupportedDType(dtype) => write!(f, "dtype {dtype} is not accelerable"),
            Ineligibility::EmptyInput => write!(f, "input has no elements"),
            Ineligibility::BelowThreshold { len, min } => {
                write!(f, "{len} elements is below the threshold of {min}")
            }
            Ineligibility::NoReducedAxes => write!(f, "no axes reduced"),
            Ineligibility::NonContiguousLayout => write!(f, "view is neither C- nor F-contiguous"),
            Ineligibility::InterleavedAxes => write!(f, "reduced and kept axes interleave in memory"),
        }
    }
}

/// Why an eligible reduction fell back after calling the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackCause {
    FullReductionUnsupported(String),
    SegmentedReductionUnsupported(String),
}

impl FallbackCause {
    fn new(kind: ReductionKind, reason: String) -> Self {
        match kind {
            ReductionKind::Full => FallbackCause::FullReductionUnsupported(reason),
            ReductionKind::Segmented => FallbackCause::SegmentedReductionUnsupported(reason),
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            FallbackCause::FullReductionUnsupported(reason)
            | FallbackCause::SegmentedReductionUnsupported(reason) => reason,
        }
    }
}

impl fmt::Display for FallbackCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackCause::FullReductionUnsupported(reason) => {
                write!(f, "full reduction unsupported: {reason}")
            }
            FallbackCause::SegmentedReductionUnsupported(reason) => {
                write!(f, "segmented reduction unsupported: {reason}")
            }
        }
    }
}

/// Route taken by one reduction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchPath {
    Accelerated {
        backend: String,
        backend_type: BackendType,
        kind: ReductionKind,
    },
    Fallback {
        backend: String,
        cause: FallbackCause,
    },
    Generic(Ineligibility),
}

/// Diagnostics for one [`Dispatcher`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub op: ReduceOp,
    pub dtype: DType,
    pub path: DispatchPath,
}

impl DispatchReport {
    pub fn is_accelerated(&self) -> bool {
        matches!(self.path, DispatchPath::Accelerated { .. })
    }

    pub fn fallback_cause(&self) -> Option<&FallbackCause> {
        match &self.path {
            DispatchPath::Fallback { cause, .. } => Some(cause),
            _ => None,
        }
    }

    pub fn ineligibility(&self) -> Option<&Ineligibility> {
        match &self.path {
            DispatchPath::Generic(reason) => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
enum BackendSlot {
    /// Resolve [`default_backend`] on every call
    Global,
    Fixed(Option<Arc<dyn ReductionBackend>>),
}

struct Plan<'a> {
    backend: &'a dyn ReductionBackend,
    kind: ReductionKind,
    segments: Option<SegmentSpec>,
    order: MemoryOrder,
}

/// Chooses between an accelerated backend and the generic strided reducer.
///
/// ```
/// use extremis_core::ops::reduction::{normalize_axes, AxisSpec};
/// use extremis_core::{Dispatcher, ReduceOp, Tensor};
///
/// let x = Tensor::from_vec(vec![3, 1, 2, 9], &[2, 2]).unwrap();
/// let axes = normalize_axes(&AxisSpec::Single(1), 2).unwrap();
/// let min = Dispatcher::generic().reduce(&x, &axes, ReduceOp::Min).unwrap();
/// assert_eq!(min.to_vec(), vec![1, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher {
    backend: BackendSlot,
    config: Option<DispatchConfig>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::global()
    }
}

impl Dispatcher {
    /// Dispatcher using the process-wide backend and configuration
    pub fn global() -> Self {
        Self {
            backend: BackendSlot::Global,
            config: None,
        }
    }

    /// Dispatcher bound to `backend`
    pub fn new(backend: Arc<dyn ReductionBackend>) -> Self {
        Self {
            backend: BackendSlot::Fixed(Some(backend)),
            config: None,
        }
    }

    /// Dispatcher that never leaves the generic reducer
    pub fn generic() -> Self {
        Self {
            backend: BackendSlot::Fixed(None),
            config: None,
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn ReductionBackend>) -> Self {
        self.backend = BackendSlot::Fixed(Some(backend));
        self
    }

    /// Use `config` instead of the global configuration.
    ///
    /// The global [`crate::config::set_acceleration_enabled`] switch does not
    /// apply to an explicit configuration.
    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = Some(config);
        self
    }

    fn resolve_backend(&self) -> Option<Arc<dyn ReductionBackend>> {
        match &self.backend {
            BackendSlot::Global => default_backend(),
            BackendSlot::Fixed(backend) => backend.clone(),
        }
    }

    fn resolve_config(&self) -> DispatchConfig {
        self.config.clone().unwrap_or_else(get_dispatch_config)
    }

    /// Reduce `x` over `axes` with `op`
    pub fn reduce<T: Element>(&self, x: &Tensor<T>, axes: &NormalizedAxes, op: ReduceOp) -> Result<Tensor<T>> {
        self.reduce_with_report(x, axes, op).map(|(result, _)| result)
    }

    /// Reduce `x` over `axes` with `op` and report the route taken
    pub fn reduce_with_report<T: Element>(
        &self,
        x: &Tensor<T>,
        axes: &NormalizedAxes,
        op: ReduceOp,
    ) -> Result<(Tensor<T>, DispatchReport)> {
        if axes.rank() != x.ndim() {
            return Err(TensorError::invalid_argument_op(
                op.name(),
                format!(
                    "axes normalized for rank {} applied to a tensor of rank {}",
                    axes.rank(),
                    x.ndim()
                ),
            ));
        }
        check_reducible(op.name(), x.shape(), axes)?;

        let config = self.resolve_config();
        let backend = self.resolve_backend();
        let report = |path| DispatchReport {
            op,
            dtype: T::DTYPE,
            path,
        };

        let plan = match self.plan(x, axes, &config, backend.as_deref()) {
            Ok(plan) => plan,
            Err(reason) => {
                let policy = T::policy();
                debug!(
                    %op,
                    dtype = %T::DTYPE,
                    ordering = ?policy.class(),
                    shape = %x.shape(),
                    %reason,
                    "generic reduction"
                );
                let result = reduce_strided(x, axes, op, &policy)?;
                return Ok((result, report(DispatchPath::Generic(reason))));
            }
        };

        let backend_name = plan.backend.name().to_string();
        match Self::run_backend(x, axes, op, &plan) {
            Ok(result) => {
                trace!(
                    %op,
                    dtype = %T::DTYPE,
                    backend = %backend_name,
                    kind = ?plan.kind,
                    "accelerated reduction"
                );
                let path = DispatchPath::Accelerated {
                    backend: backend_name,
                    backend_type: plan.backend.backend_type(),
                    kind: plan.kind,
                };
                Ok((result, report(path)))
            }
            Err(cause) => {
                if config.log_fallbacks {
                    warn!(%op, dtype = %T::DTYPE, backend = %backend_name, %cause, "backend fallback");
                } else {
                    debug!(%op, dtype = %T::DTYPE, backend = %backend_name, %cause, "backend fallback");
                }
                let result = reduce_strided(x, axes, op, &T::policy())?;
                let path = DispatchPath::Fallback {
                    backend: backend_name,
                    cause,
                };
                Ok((result, report(path)))
            }
        }
    }

    fn plan<'a, T: Element>(
        &self,
        x: &Tensor<T>,
        axes: &NormalizedAxes,
        config: &DispatchConfig,
        backend: Option<&'a dyn ReductionBackend>,
    ) -> std::result::Result<Plan<'a>, Ineligibility> {
        if !config.accelerate {
            return Err(Ineligibility::AccelerationDisabled);
        }
        let backend = backend.ok_or(Ineligibility::NoBackend)?;
        if !T::DTYPE.is_accelerable() {
            return Err(Ineligibility::UnsupportedDType(T::DTYPE));
        }
        let len = x.numel();
        if len == 0 {
            return Err(Ineligibility::EmptyInput);
        }
        if len < config.min_accelerated_len {
            return Err(Ineligibility::BelowThreshold {
                len,
                min: config.min_accelerated_len,
            });
        }
        if axes.to_vec().is_empty() {
            return Err(Ineligibility::NoReducedAxes);
        }

        let descriptor = describe_axis_groups(x.layout(), axes);
        let order = descriptor
            .memory_order
            .ok_or(Ineligibility::NonContiguousLayout)?;
        if !descriptor.is_backend_shaped() {
            return Err(Ineligibility::InterleavedAxes);
        }

        Ok(Plan {
            backend,
            kind: descriptor.kind,
            segments: descriptor.segments,
            order,
        })
    }

    fn run_backend<T: Element>(
        x: &Tensor<T>,
        axes: &NormalizedAxes,
        op: ReduceOp,
        plan: &Plan<'_>,
    ) -> std::result::Result<Tensor<T>, FallbackCause> {
        let fail = |reason: String| FallbackCause::new(plan.kind, reason);

        let start = x.layout().offset();
        let dense = x
            .storage()
            .get(start..start + x.numel())
            .ok_or_else(|| fail("view exceeds its buffer".to_string()))?;
        let bytes = T::as_backend_bytes(dense)
            .ok_or_else(|| fail(format!("dtype {} has no raw representation", T::DTYPE)))?;
        let input = BackendBuffer::new(T::DTYPE, bytes)
            .ok_or_else(|| fail("input is not a whole number of elements".to_string()))?;

        let (outcome, out_len) = match (plan.kind, plan.segments) {
            (ReductionKind::Full, _) => (plan.backend.full_reduce(input, op), 1),
            (ReductionKind::Segmented, Some(segments)) => (
                plan.backend.segmented_reduce(input, segments, op),
                segments.num_segments,
            ),
            (ReductionKind::Segmented, None) => {
                return Err(fail("no segment layout".to_string()));
            }
        };

        let bytes = match outcome {
            BackendOutcome::Success(bytes) => bytes,
            BackendOutcome::Unsupported(reason) => return Err(fail(reason)),
        };
        let values = decode_output::<T>(&bytes, out_len).ok_or_else(|| {
            fail(format!(
                "backend returned {} bytes, expected {}",
                bytes.len(),
                out_len * T::DTYPE.size()
            ))
        })?;

        let kept: Vec<usize> = x
            .shape()
            .iter()
            .enumerate()
            .filter(|&(axis, _)| !axes.contains(axis))
            .map(|(_, &dim)| dim)
            .collect();
        let layout = match plan.order {
            MemoryOrder::C => StridedLayout::new(kept),
            MemoryOrder::F => StridedLayout::fortran(kept),
        };
        Tensor::from_parts(Arc::new(values), layout)
            .map_err(|e| fail(format!("cannot shape backend output: {e}")))
    }
}

fn decode_output<T: Element>(bytes: &[u8], len: usize) -> Option<Vec<T>> {
    let mut values = vec![T::default(); len];
    let target = T::as_backend_bytes_mut(&mut values)?;
    if target.len() != bytes.len() {
        return None;
    }
    target.copy_from_slice(bytes);
    Some(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::reduction::common::{normalize_axes, AxisSpec};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct RefusingBackend {
        calls: AtomicUsize,
    }

    impl ReductionBackend for RefusingBackend {
        fn name(&self) -> &str {
            "refusing"
        }

        fn full_reduce(&self, _input: BackendBuffer<'_>, _op: ReduceOp) -> BackendOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            BackendOutcome::unsupported("gotcha_full")
        }

        fn segmented_reduce(
            &self,
            _input: BackendBuffer<'_>,
            _segments: SegmentSpec,
            _op: ReduceOp,
        ) -> BackendOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            BackendOutcome::unsupported("gotcha_segment")
        }
    }

    /// Claims success but returns nothing
    #[derive(Debug)]
    struct TruncatingBackend;

    impl ReductionBackend for TruncatingBackend {
        fn name(&self) -> &str {
            "truncating"
        }

        fn full_reduce(&self, _input: BackendBuffer<'_>, _op: ReduceOp) -> BackendOutcome {
            BackendOutcome::Success(Vec::new())
        }

        fn segmented_reduce(
            &self,
            _input: BackendBuffer<'_>,
            _segments: SegmentSpec,
            _op: ReduceOp,
        ) -> BackendOutcome {
            BackendOutcome::Success(vec![0; 3])
        }
    }

    fn axes(spec: impl Into<AxisSpec>, rank: usize) -> NormalizedAxes {
        normalize_axes(&spec.into(), rank).unwrap()
    }

    fn sample() -> Tensor<i32> {
        Tensor::from_vec((0..24).map(|i| (i * 7) % 24 - 12).collect(), &[2, 3, 4]).unwrap()
    }

    #[test]
    fn test_describe_c_order() {
        let layout = StridedLayout::new(vec![2, 3, 4]);

        let d = describe_axis_groups(&layout, &axes([1, 2], 3));
        assert_eq!(d.kind, ReductionKind::Segmented);
        assert_eq!(d.segments, Some(SegmentSpec::rows(2, 12)));

        let d = describe_axis_groups(&layout, &axes(0, 3));
        assert_eq!(d.segments, Some(SegmentSpec::columns(12, 2)));

        let d = describe_axis_groups(&layout, &axes([0, 2], 3));
        assert!(!d.reduced_contiguous);
        assert!(d.kept_contiguous);
        assert!(!d.is_backend_shaped());
        assert_eq!(d.segments, None);

        let d = describe_axis_groups(&layout, &axes(AxisSpec::All, 3));
        assert_eq!(d.kind, ReductionKind::Full);
        assert!(d.is_backend_shaped());
    }

    #[test]
    fn test_describe_fortran_order() {
        let layout = StridedLayout::fortran(vec![2, 3, 4]);
        let d = describe_axis_groups(&layout, &axes(0, 3));
        assert_eq!(d.memory_order, Some(MemoryOrder::F));
        assert_eq!(d.segments, Some(SegmentSpec::rows(12, 2)));

        let d = describe_axis_groups(&layout, &axes([1, 2], 3));
        assert_eq!(d.segments, Some(SegmentSpec::columns(2, 12)));
    }

    #[test]
    fn test_describe_ignores_unit_axes() {
        // kept axis 1 has extent 1, so reduced axes 0 and 2 are adjacent
        let layout = StridedLayout::new(vec![3, 1, 5]);
        let d = describe_axis_groups(&layout, &axes([0, 2], 3));
        assert!(d.is_backend_shaped());
        assert_eq!(d.segments, Some(SegmentSpec::rows(1, 15)));
    }

    #[test]
    fn test_refused_full_reduction_falls_back() {
        let backend = Arc::new(RefusingBackend::default());
        let dispatcher = Dispatcher::new(backend.clone()).with_config(DispatchConfig::default());
        let x = sample();

        let (result, report) = dispatcher
            .reduce_with_report(&x, &axes(AxisSpec::All, 3), ReduceOp::Max)
            .unwrap();
        assert_eq!(result.item(), Some(11));
        assert_eq!(
            report.fallback_cause(),
            Some(&FallbackCause::FullReductionUnsupported("gotcha_full".to_string()))
        );
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_refused_segmented_reduction_falls_back() {
        let backend = Arc::new(RefusingBackend::default());
        let dispatcher = Dispatcher::new(backend).with_config(DispatchConfig::default());
        let x = sample();
        let a = axes(-1, 3);

        let (result, report) = dispatcher.reduce_with_report(&x, &a, ReduceOp::Min).unwrap();
        let expected = reduce_strided(&x, &a, ReduceOp::Min, &i32::policy()).unwrap();
        assert_eq!(result, expected);
        assert!(matches!(
            report.fallback_cause(),
            Some(FallbackCause::SegmentedReductionUnsupported(reason)) if reason == "gotcha_segment"
        ));
    }

    #[test]
    fn test_malformed_success_falls_back() {
        let dispatcher = Dispatcher::new(Arc::new(TruncatingBackend)).with_config(DispatchConfig::default());
        let x = Tensor::from_vec(vec![1.5f64, -2.0, 8.0, 0.25], &[2, 2]).unwrap();

        let (result, report) = dispatcher
            .reduce_with_report(&x, &axes(AxisSpec::All, 2), ReduceOp::Min)
            .unwrap();
        assert_eq!(result.item(), Some(-2.0));
        assert!(report.fallback_cause().is_some());

        let (result, report) = dispatcher.reduce_with_report(&x, &axes(1, 2), ReduceOp::Max).unwrap();
        assert_eq!(result.to_vec(), vec![1.5, 8.0]);
        assert!(matches!(
            report.fallback_cause(),
            Some(FallbackCause::SegmentedReductionUnsupported(_))
        ));
    }

    #[test]
    fn test_ineligible_routes_skip_backend() {
        let backend = Arc::new(RefusingBackend::default());
        let dispatcher = Dispatcher::new(backend.clone()).with_config(DispatchConfig::default());

        let flags = Tensor::from_vec(vec![true, false, true, true], &[2, 2]).unwrap();
        let (_, report) = dispatcher.reduce_with_report(&flags, &axes(0, 2), ReduceOp::Min).unwrap();
        assert_eq!(
            report.ineligibility(),
            Some(&Ineligibility::UnsupportedDType(DType::Bool))
        );

        let x = sample();
        let (_, report) = dispatcher.reduce_with_report(&x, &axes([0, 2], 3), ReduceOp::Min).unwrap();
        assert_eq!(report.ineligibility(), Some(&Ineligibility::InterleavedAxes));

        let strided = x.slice_axis(2, 0..4, 2).unwrap();
        let (_, report) = dispatcher.reduce_with_report(&strided, &axes(2, 3), ReduceOp::Min).unwrap();
        assert_eq!(report.ineligibility(), Some(&Ineligibility::NonContiguousLayout));

        let (_, report) = dispatcher
            .reduce_with_report(&x, &axes(Vec::<isize>::new(), 3), ReduceOp::Max)
            .unwrap();
        assert_eq!(report.ineligibility(), Some(&Ineligibility::NoReducedAxes));

        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_config_gates_backend() {
        let backend = Arc::new(RefusingBackend::default());
        let x = sample();
        let a = axes(0, 3);

        let off = Dispatcher::new(backend.clone()).with_config(DispatchConfig::default().with_acceleration(false));
        let (_, report) = off.reduce_with_report(&x, &a, ReduceOp::Max).unwrap();
        assert_eq!(report.ineligibility(), Some(&Ineligibility::AccelerationDisabled));

        let big = Dispatcher::new(backend.clone())
            .with_config(DispatchConfig::default().with_min_accelerated_len(1000));
        let (_, report) = big.reduce_with_report(&x, &a, ReduceOp::Max).unwrap();
        assert_eq!(
            report.ineligibility(),
            Some(&Ineligibility::BelowThreshold { len: 24, min: 1000 })
        );

        let (_, report) = Dispatcher::generic()
            .with_config(DispatchConfig::default())
            .reduce_with_report(&x, &a, ReduceOp::Max)
            .unwrap();
        assert_eq!(report.ineligibility(), Some(&Ineligibility::NoBackend));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_validation_precedes_dispatch() {
        let backend = Arc::new(RefusingBackend::default());
        let dispatcher = Dispatcher::new(backend.clone()).with_config(DispatchConfig::default());
        let empty = Tensor::<f32>::from_vec(Vec::new(), &[4, 0]).unwrap();
        assert!(dispatcher.reduce(&empty, &axes(1, 2), ReduceOp::Min).is_err());
        assert!(dispatcher.reduce(&sample(), &axes(0, 2), ReduceOp::Min).is_err());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_backend_matches_generic() {
        use crate::backend::ParallelBackend;

        let dispatcher = Dispatcher::new(Arc::new(ParallelBackend::new().with_chunk_len(5)))
            .with_config(DispatchConfig::default());
        let c = Tensor::from_vec((0..60).map(|i| ((i * 13) % 29) as f32 - 14.5).collect(), &[3, 4, 5])
            .unwrap();
        let f = c.to_fortran();

        for x in [&c, &f] {
            for spec in [AxisSpec::All, AxisSpec::Single(0), AxisSpec::from([1, 2]), AxisSpec::from([0, 1])] {
                let a = axes(spec, 3);
                for op in [ReduceOp::Min, ReduceOp::Max] {
                    let (fast, report) = dispatcher.reduce_with_report(x, &a, op).unwrap();
                    let slow = reduce_strided(x, &a, op, &f32::policy()).unwrap();
                    assert!(report.is_accelerated(), "{report:?}");
                    assert_eq!(fast, slow);
                }
            }
        }
    }
}
