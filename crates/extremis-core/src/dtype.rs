#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Element type tag of an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum DType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float16,  // Half precision IEEE 754-2008
    BFloat16, // Brain floating point
    Float32,
    Float64,
    Complex32, // 2 * f32
    Complex64, // 2 * f64
}

/// Broad family of an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DTypeKind {
    Boolean,
    Integer { signed: bool },
    Float,
    Complex,
}

/// Comparison semantics used when reducing elements of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum OrderingClass {
    /// Integers: the usual total order.
    TotallyOrdered,
    /// IEEE floats: NaN poisons every group it appears in.
    NanAwareFloat,
    /// Complex numbers: lexicographic `(re, im)` with component-wise NaN poisoning.
    NanAwareComplex,
    /// `false < true`; min is AND and max is OR.
    Boolean,
}

impl DType {
    pub const ALL: [DType; 15] = [
        DType::Bool,
        DType::Int8,
        DType::Int16,
        DType::Int32,
        DType::Int64,
        DType::UInt8,
        DType::UInt16,
        DType::UInt32,
        DType::UInt64,
        DType::Float16,
        DType::BFloat16,
        DType::Float32,
        DType::Float64,
        DType::Complex32,
        DType::Complex64,
    ];

    pub fn size(&self) -> usize {
        match self {
            DType::Bool | DType::Int8 | DType::UInt8 => 1,
            DType::Int16 | DType::UInt16 | DType::Float16 | DType::BFloat16 => 2,
            DType::Int32 | DType::UInt32 | DType::Float32 => 4,
            DType::Int64 | DType::UInt64 | DType::Float64 | DType::Complex32 => 8,
            DType::Complex64 => 16,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::UInt8 => "uint8",
            DType::UInt16 => "uint16",
            DType::UInt32 => "uint32",
            DType::UInt64 => "uint64",
            DType::Float16 => "float16",
            DType::BFloat16 => "bfloat16",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Complex32 => "complex32",
            DType::Complex64 => "complex64",
        }
    }

    pub fn kind(&self) -> DTypeKind {
        match self {
            DType::Bool => DTypeKind::Boolean,
            DType::Int8 | DType::Int16 | DType::Int32 | DType::Int64 => {
                DTypeKind::Integer { signed: true }
            }
            DType::UInt8 | DType::UInt16 | DType::UInt32 | DType::UInt64 => {
                DTypeKind::Integer { signed: false }
            }
            DType::Float16 | DType::BFloat16 | DType::Float32 | DType::Float64 => DTypeKind::Float,
            DType::Complex32 | DType::Complex64 => DTypeKind::Complex,
        }
    }

    pub fn ordering_class(&self) -> OrderingClass {
        match self.kind() {
            DTypeKind::Boolean => OrderingClass::Boolean,
            DTypeKind::Integer { .. } => OrderingClass::TotallyOrdered,
            DTypeKind::Float => OrderingClass::NanAwareFloat,
            DTypeKind::Complex => OrderingClass::NanAwareComplex,
        }
    }

    /// Whether an accelerated backend may be asked to reduce this type.
    ///
    /// Booleans and the 16-bit float formats always take the generic path.
    pub fn is_accelerable(&self) -> bool {
        !matches!(self, DType::Bool | DType::Float16 | DType::BFloat16)
    }

    /// Whether peak-to-peak is defined for this type.
    pub fn supports_range(&self) -> bool {
        !matches!(self.kind(), DTypeKind::Boolean)
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accelerable_set() {
        let accelerable: Vec<DType> = DType::ALL
            .iter()
            .copied()
            .filter(DType::is_accelerable)
            .collect();
        assert_eq!(accelerable.len(), 12);
        assert!(!DType::Bool.is_accelerable());
        assert!(!DType::Float16.is_accelerable());
        assert!(DType::Complex64.is_accelerable());
    }

    #[test]
    fn test_ordering_classes() {
        assert_eq!(DType::UInt16.ordering_class(), OrderingClass::TotallyOrdered);
        assert_eq!(DType::BFloat16.ordering_class(), OrderingClass::NanAwareFloat);
        assert_eq!(DType::Complex32.ordering_class(), OrderingClass::NanAwareComplex);
        assert_eq!(DType::Bool.ordering_class(), OrderingClass::Boolean);
        assert_eq!(DType::Int8.kind(), DTypeKind::Integer { signed: true });
    }

    #[test]
    fn test_sizes() {
        assert_eq!(DType::Complex64.size(), 16);
        assert_eq!(DType::BFloat16.size(), 2);
        assert_eq!(DType::Bool.to_string(), "bool");
    }
}
