//! Element-type-erased tensors
//!
//! [`AnyTensor`] lets callers that only learn the dtype at runtime use the
//! same reductions as the typed API.

use crate::complex::{Complex32, Complex64};
use crate::ops::reduction::{reduce_max, reduce_min, reduce_range, AxisSpec};
use crate::{DType, Result, Shape, Tensor};
use half::{bf16, f16};

/// A tensor of any supported element type
#[derive(Debug, Clone, PartialEq)]
pub enum AnyTensor {
    Bool(Tensor<bool>),
    Int8(Tensor<i8>),
    Int16(Tensor<i16>),
    Int32(Tensor<i32>),
    Int64(Tensor<i64>),
    UInt8(Tensor<u8>),
    UInt16(Tensor<u16>),
    UInt32(Tensor<u32>),
    UInt64(Tensor<u64>),
    Float16(Tensor<f16>),
    BFloat16(Tensor<bf16>),
    Float32(Tensor<f32>),
    Float64(Tensor<f64>),
    Complex32(Tensor<Complex32>),
    Complex64(Tensor<Complex64>),
}

macro_rules! for_each_variant {
    ($value:expr, $t:ident => $body:expr) => {
        match $value {
            AnyTensor::Bool($t) => $body,
            AnyTensor::Int8($t) => $body,
            AnyTensor::Int16($t) => $body,
            AnyTensor::Int32($t) => $body,
            AnyTensor::Int64($t) => $body,
            AnyTensor::UInt8($t) => $body,
            AnyTensor::UInt16($t) => $body,
            AnyTensor::UInt32($t) => $body,
            AnyTensor::UInt64($t) => $body,
            AnyTensor::Float16($t) => $body,
            AnyTensor::BFloat16($t) => $body,
            AnyTensor::Float32($t) => $body,
            AnyTensor::Float64($t) => $body,
            AnyTensor::Complex32($t) => $body,
            AnyTensor::Complex64($t) => $body,
        }
    };
}

macro_rules! map_variant {
    ($value:expr, $t:ident => $body:expr) => {
        match $value {
            AnyTensor::Bool($t) => AnyTensor::Bool($body),
            AnyTensor::Int8($t) => AnyTensor::Int8($body),
            AnyTensor::Int16($t) => AnyTensor::Int16($body),
            AnyTensor::Int32($t) => AnyTensor::Int32($body),
            AnyTensor::Int64($t) => AnyTensor::Int64($body),
            AnyTensor::UInt8($t) => AnyTensor::UInt8($body),
            AnyTensor::UInt16($t) => AnyTensor::UInt16($body),
            AnyTensor::UInt32($t) => AnyTensor::UInt32($body),
            AnyTensor::UInt64($t) => AnyTensor::UInt64($body),
            AnyTensor::Float16($t) => AnyTensor::Float16($body),
            AnyTensor::BFloat16($t) => AnyTensor::BFloat16($body),
            AnyTensor::Float32($t) => AnyTensor::Float32($body),
            AnyTensor::Float64($t) => AnyTensor::Float64($body),
            AnyTensor::Complex32($t) => AnyTensor::Complex32($body),
            AnyTensor::Complex64($t) => AnyTensor::Complex64($body),
        }
    };
}

impl AnyTensor {
    pub fn dtype(&self) -> DType {
        for_each_variant!(self, t => t.dtype())
    }

    pub fn shape(&self) -> &Shape {
        for_each_variant!(self, t => t.shape())
    }

    pub fn reduce_min(&self, axis: impl Into<AxisSpec>, keepdims: bool) -> Result<Self> {
        let axis = axis.into();
        Ok(map_variant!(self, t => reduce_min(t, axis.clone(), keepdims)?))
    }

    pub fn reduce_max(&self, axis: impl Into<AxisSpec>, keepdims: bool) -> Result<Self> {
        let axis = axis.into();
        Ok(map_variant!(self, t => reduce_max(t, axis.clone(), keepdims)?))
    }

    /// Peak-to-peak; fails with a type error for boolean tensors
    pub fn reduce_range(&self, axis: impl Into<AxisSpec>, keepdims: bool) -> Result<Self> {
        let axis = axis.into();
        Ok(map_variant!(self, t => reduce_range(t, axis.clone(), keepdims)?))
    }
}

macro_rules! impl_from_tensor {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Tensor<$ty>> for AnyTensor {
                fn from(tensor: Tensor<$ty>) -> Self {
                    AnyTensor::$variant(tensor)
                }
            }
        )*
    };
}

impl_from_tensor!(
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f16 => Float16,
    bf16 => BFloat16,
    f32 => Float32,
    f64 => Float64,
    Complex32 => Complex32,
    Complex64 => Complex64,
);
