//! Multi-axis min / max / peak-to-peak reductions over strided tensors.
//!
//! Reductions run on a generic strided reducer that understands any layout,
//! or on an accelerated [`backend::ReductionBackend`] when the element type
//! and axis pattern allow it. Both paths produce identical results.
#![allow(clippy::result_large_err)]

pub mod backend;
pub mod complex;
pub mod config;
pub mod dispatch;
pub mod dtype;
pub mod dynamic;
pub mod error;
pub mod ops;
pub mod ordering;
pub mod shape;
pub mod strided;
pub mod tensor;

pub use backend::{
    clear_default_backend, default_backend, register_backend, set_default_backend, BackendBuffer, BackendOutcome,
    BackendType, ReductionBackend, SegmentOrientation, SegmentSpec,
};
#[cfg(feature = "parallel")]
pub use backend::ParallelBackend;
pub use complex::{Complex32, Complex64};
pub use config::{
    get_dispatch_config, is_acceleration_enabled, set_acceleration_enabled, set_dispatch_config,
    DispatchConfig,
};
pub use dispatch::{
    describe_axis_groups, AxisGroupDescriptor, DispatchPath, DispatchReport, Dispatcher,
    FallbackCause, Ineligibility, ReductionKind,
};
pub use dtype::{DType, DTypeKind, OrderingClass};
pub use dynamic::AnyTensor;
pub use error::{ErrorContext, ErrorKind, Result, TensorError};
pub use half::{bf16, f16};
pub use ops::reduction::{reduce_max, reduce_min, reduce_range, AxisSpec, NormalizedAxes, Reducer};
pub use ordering::{Element, OrderingPolicy, ReduceOp};
pub use shape::Shape;
pub use strided::{MemoryOrder, StridedLayout};
pub use tensor::Tensor;
