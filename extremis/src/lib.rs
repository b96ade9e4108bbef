//! # extremis
//!
//! Min, max and peak-to-peak reductions over N-dimensional strided arrays,
//! with an optional accelerated backend for dense inputs.
//!
//! - **Any axis set**: one axis, several axes, negative axes, or all of them
//! - **Every element type**: integers, floats (including `f16`/`bf16`),
//!   complex numbers and booleans
//! - **NaN-aware**: a NaN anywhere in a group makes that group's result NaN
//! - **Accelerated**: dense C- or F-ordered inputs run on a multi-threaded
//!   backend, and any backend that declines falls back transparently
//!
//! ## Quick Start
//!
//! ```rust
//! use extremis::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let x = Tensor::from_vec(vec![1, 2, 3, 4, 0, 6], &[2, 3])?;
//!
//! assert_eq!(reduce_min(&x, 0, false)?.to_vec(), vec![1, 0, 3]);
//! assert_eq!(reduce_max(&x, 0, false)?.to_vec(), vec![4, 2, 6]);
//! assert_eq!(x.ptp(0, false)?.to_vec(), vec![3, 2, 3]);
//!
//! let kept = x.amax(AxisSpec::All, true)?;
//! assert_eq!(kept.shape().dims(), &[1, 1]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Choosing a backend
//!
//! ```rust
//! use extremis::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let reducer = Reducer::new(Dispatcher::generic());
//! let x = Tensor::from_vec(vec![0.5f64, f64::NAN, -2.0], &[3])?;
//! assert!(reducer.min(&x, 0, false)?.item().unwrap().is_nan());
//! # Ok(())
//! # }
//! ```

pub use extremis_core as core;

pub mod prelude {
    // Core types
    pub use crate::core::{AnyTensor, AxisSpec, DType, Shape, Tensor};
    pub use crate::core::{Complex32, Complex64};

    // Reductions
    pub use crate::core::{reduce_max, reduce_min, reduce_range, Reducer};

    // Dispatch
    pub use crate::core::{DispatchConfig, DispatchReport, Dispatcher, ReductionBackend};
    #[cfg(feature = "parallel")]
    pub use crate::core::ParallelBackend;

    // Errors
    pub use crate::core::{ErrorKind, Result, TensorError};

    // Common trait re-exports
    pub use crate::core::Element;
}

// Version information
/// The version of extremis
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the version string of extremis
pub fn version() -> &'static str {
    VERSION
}
