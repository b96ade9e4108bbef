pub mod reduction;

pub use reduction::{reduce_max, reduce_min, reduce_range, AxisSpec, Reducer};
