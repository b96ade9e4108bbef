//! Tensor reduction operations
//!
//! - **common**: axis normalization shared by every reduction
//! - **strided**: the generic strided reducer, valid for any layout
//! - **extrema**: min / max / peak-to-peak front end

pub mod common;
pub mod extrema;
pub mod strided;

pub use common::{normalize_axes, normalize_axis, AxisSpec, NormalizedAxes};
pub use extrema::{reduce_max, reduce_min, reduce_range, Reducer};
pub use strided::{check_reducible, reduce_strided};
