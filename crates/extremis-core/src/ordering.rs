//! Ordering policies used by every reducer
//!
//! A reducer never compares elements directly. It asks the element type for
//! its [`OrderingPolicy`] once per call and folds with the `min`/`max`
//! combine functions stored there, so the generic strided reducer and any
//! accelerated backend agree bit for bit.
//!
//! All combine functions are associative and commutative:
//!
//! - NaN results are always the canonical quiet NaN of the type.
//! - Numerically equal zeros resolve by sign: `min` yields `-0.0`, `max`
//!   yields `+0.0`.
//!
//! Reductions may therefore visit elements in any order (memory order,
//! logical order, or split across threads) without changing the result.

use crate::complex::{complex_max, complex_min};
use crate::{DType, OrderingClass};
use half::{bf16, f16};
use num_complex::Complex;
use num_traits::Float;
use std::fmt::Debug;

/// The two primitive reductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReduceOp {
    Min,
    Max,
}

impl ReduceOp {
    pub fn name(&self) -> &'static str {
        match self {
            ReduceOp::Min => "min",
            ReduceOp::Max => "max",
        }
    }
}

impl std::fmt::Display for ReduceOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Pairwise combine function.
pub type CombineFn<T> = fn(T, T) -> T;

/// Comparison function table for one element type.
pub struct OrderingPolicy<T> {
    class: OrderingClass,
    min: CombineFn<T>,
    max: CombineFn<T>,
}

impl<T> Clone for OrderingPolicy<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for OrderingPolicy<T> {}

impl<T> Debug for OrderingPolicy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderingPolicy")
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}

impl<T: Copy> OrderingPolicy<T> {
    pub const fn new(class: OrderingClass, min: CombineFn<T>, max: CombineFn<T>) -> Self {
        Self { class, min, max }
    }

    pub fn class(&self) -> OrderingClass {
        self.class
    }

    /// The combine function for `op`
    pub fn combiner(&self, op: ReduceOp) -> CombineFn<T> {
        match op {
            ReduceOp::Min => self.min,
            ReduceOp::Max => self.max,
        }
    }
}

/// An element type the engine can reduce.
pub trait Element: Copy + Default + PartialEq + Debug + Send + Sync + 'static {
    /// Type tag
    const DTYPE: DType;

    /// Comparison table for this type
    fn policy() -> OrderingPolicy<Self>;

    /// `max - min`, or `None` when a range is meaningless for the type
    fn range(max: Self, min: Self) -> Option<Self>;

    /// Raw bytes handed to an accelerated backend; `None` for types that
    /// never leave the generic path
    fn as_backend_bytes(data: &[Self]) -> Option<&[u8]>;

    /// Mutable counterpart of [`Element::as_backend_bytes`]
    fn as_backend_bytes_mut(data: &mut [Self]) -> Option<&mut [u8]>;
}

/// NaN-propagating minimum
pub fn nan_min<F: Float>(a: F, b: F) -> F {
    if a.is_nan() || b.is_nan() {
        F::nan()
    } else if a < b {
        a
    } else if b < a {
        b
    } else if a.is_sign_negative() {
        a
    } else {
        b
    }
}

/// NaN-propagating maximum
pub fn nan_max<F: Float>(a: F, b: F) -> F {
    if a.is_nan() || b.is_nan() {
        F::nan()
    } else if a > b {
        a
    } else if b > a {
        b
    } else if a.is_sign_positive() {
        a
    } else {
        b
    }
}

fn total_min<T: Ord>(a: T, b: T) -> T {
    std::cmp::min(a, b)
}

fn total_max<T: Ord>(a: T, b: T) -> T {
    std::cmp::max(a, b)
}

fn bool_min(a: bool, b: bool) -> bool {
    a && b
}

fn bool_max(a: bool, b: bool) -> bool {
    a || b
}

macro_rules! impl_integer_element {
    ($($ty:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = DType::$dtype;

                fn policy() -> OrderingPolicy<Self> {
                    OrderingPolicy::new(OrderingClass::TotallyOrdered, total_min, total_max)
                }

                // Integer ranges wrap on overflow, e.g. int8 [-128, 127] -> -1.
                fn range(max: Self, min: Self) -> Option<Self> {
                    Some(max.wrapping_sub(min))
                }

                fn as_backend_bytes(data: &[Self]) -> Option<&[u8]> {
                    Some(bytemuck::cast_slice(data))
                }

                fn as_backend_bytes_mut(data: &mut [Self]) -> Option<&mut [u8]> {
                    Some(bytemuck::cast_slice_mut(data))
                }
            }
        )*
    };
}

impl_integer_element!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
);

macro_rules! impl_float_element {
    (@bytes true) => {
        fn as_backend_bytes(data: &[Self]) -> Option<&[u8]> {
            Some(bytemuck::cast_slice(data))
        }

        fn as_backend_bytes_mut(data: &mut [Self]) -> Option<&mut [u8]> {
            Some(bytemuck::cast_slice_mut(data))
        }
    };
    (@bytes false) => {
        fn as_backend_bytes(_data: &[Self]) -> Option<&[u8]> {
            None
        }

        fn as_backend_bytes_mut(_data: &mut [Self]) -> Option<&mut [u8]> {
            None
        }
    };
    ($($ty:ty => $dtype:ident, accelerable: $accel:tt),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = DType::$dtype;

                fn policy() -> OrderingPolicy<Self> {
                    OrderingPolicy::new(OrderingClass::NanAwareFloat, nan_min, nan_max)
                }

                fn range(max: Self, min: Self) -> Option<Self> {
                    Some(max - min)
                }

                impl_float_element!(@bytes $accel);
            }
        )*
    };
}

impl_float_element!(
    f16 => Float16, accelerable: false,
    bf16 => BFloat16, accelerable: false,
    f32 => Float32, accelerable: true,
    f64 => Float64, accelerable: true,
);

macro_rules! impl_complex_element {
    ($($part:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Element for Complex<$part> {
                const DTYPE: DType = DType::$dtype;

                fn policy() -> OrderingPolicy<Self> {
                    OrderingPolicy::new(OrderingClass::NanAwareComplex, complex_min, complex_max)
                }

                fn range(max: Self, min: Self) -> Option<Self> {
                    Some(max - min)
                }

                fn as_backend_bytes(data: &[Self]) -> Option<&[u8]> {
                    Some(bytemuck::cast_slice(data))
                }

                fn as_backend_bytes_mut(data: &mut [Self]) -> Option<&mut [u8]> {
                    Some(bytemuck::cast_slice_mut(data))
                }
            }
        )*
    };
}

impl_complex_element!(f32 => Complex32, f64 => Complex64);

impl Element for bool {
    const DTYPE: DType = DType::Bool;

    fn policy() -> OrderingPolicy<Self> {
        OrderingPolicy::new(OrderingClass::Boolean, bool_min, bool_max)
    }

    fn range(_max: Self, _min: Self) -> Option<Self> {
        None
    }

    fn as_backend_bytes(_data: &[Self]) -> Option<&[u8]> {
        None
    }

    fn as_backend_bytes_mut(_data: &mut [Self]) -> Option<&mut [u8]> {
        None
    }
}
