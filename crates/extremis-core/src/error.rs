use crate::DType;
use thiserror::Error;

/// Errors surfaced by the reduction engine.
///
/// Every variant carries the name of the operation that raised it and an
/// optional [`ErrorContext`] describing the input. Backend incapability is
/// not represented here: the dispatcher handles it internally by falling back
/// to the generic reducer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TensorError {
    #[error("Invalid axis {axis} in operation '{operation}' for tensor with {ndim} dimensions")]
    InvalidAxis {
        operation: String,
        axis: isize,
        ndim: usize,
        context: Option<ErrorContext>,
    },

    #[error("Duplicate axis {axis} in operation '{operation}'")]
    DuplicateAxis {
        operation: String,
        axis: usize,
        context: Option<ErrorContext>,
    },

    #[error("Zero-size reduction in operation '{operation}': {details}")]
    EmptyReduction {
        operation: String,
        details: String,
        context: Option<ErrorContext>,
    },

    #[error("Operation '{operation}' not supported for dtype {dtype}: {reason}")]
    UnsupportedDType {
        operation: String,
        dtype: DType,
        reason: String,
        context: Option<ErrorContext>,
    },

    #[error("Invalid shape in operation '{operation}': {reason}")]
    InvalidShape {
        operation: String,
        reason: String,
        shape: Option<Vec<usize>>,
        context: Option<ErrorContext>,
    },

    #[error("Invalid argument in operation '{operation}': {reason}")]
    InvalidArgument {
        operation: String,
        reason: String,
        context: Option<ErrorContext>,
    },
}

/// Coarse classification of a [`TensorError`].
///
/// Mirrors the three caller-visible failure classes of the engine plus a
/// bucket for malformed array views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Axis out of range or duplicated.
    Axis,
    /// Reduction over zero-length data.
    Value,
    /// Operation undefined for the element type.
    Type,
    /// The array view itself is malformed.
    Layout,
}

/// Additional context information for errors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorContext {
    /// Input tensor shape
    pub input_shape: Option<Vec<usize>>,
    /// Input tensor data type
    pub input_dtype: Option<DType>,
    /// Raw axis argument as supplied by the caller
    pub axes: Option<Vec<isize>>,
    /// Additional metadata
    pub metadata: std::collections::BTreeMap<String, String>,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add input tensor information
    pub fn with_input_tensor(mut self, shape: &[usize], dtype: DType) -> Self {
        self.input_shape = Some(shape.to_vec());
        self.input_dtype = Some(dtype);
        self
    }

    /// Record the axis argument
    pub fn with_axes(mut self, axes: &[isize]) -> Self {
        self.axes = Some(axes.to_vec());
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl TensorError {
    /// Create an axis-out-of-range error
    pub fn invalid_axis(operation: &str, axis: isize, ndim: usize) -> Self {
        Self::InvalidAxis {
            operation: operation.to_string(),
            axis,
            ndim,
            context: None,
        }
    }

    /// Create a duplicate-axis error
    pub fn duplicate_axis(operation: &str, axis: usize) -> Self {
        Self::DuplicateAxis {
            operation: operation.to_string(),
            axis,
            context: None,
        }
    }

    /// Create an empty-reduction error
    pub fn empty_reduction(operation: &str, details: impl Into<String>) -> Self {
        Self::EmptyReduction {
            operation: operation.to_string(),
            details: details.into(),
            context: None,
        }
    }

    /// Create an unsupported-dtype error
    pub fn unsupported_dtype(operation: &str, dtype: DType, reason: impl Into<String>) -> Self {
        Self::UnsupportedDType {
            operation: operation.to_string(),
            dtype,
            reason: reason.into(),
            context: None,
        }
    }

    /// Create an invalid shape error with the offending shape attached
    pub fn invalid_shape(operation: &str, reason: impl Into<String>, shape: &[usize]) -> Self {
        Self::InvalidShape {
            operation: operation.to_string(),
            reason: reason.into(),
            shape: Some(shape.to_vec()),
            context: None,
        }
    }

    /// Create an invalid argument error with operation context
    pub fn invalid_argument_op(operation: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            operation: operation.to_string(),
            reason: reason.into(),
            context: None,
        }
    }

    /// Add context to an existing error
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        match &mut self {
            Self::InvalidAxis { context: ctx, .. } => *ctx = Some(context),
            Self::DuplicateAxis { context: ctx, .. } => *ctx = Some(context),
            Self::EmptyReduction { context: ctx, .. } => *ctx = Some(context),
            Self::UnsupportedDType { context: ctx, .. } => *ctx = Some(context),
            Self::InvalidShape { context: ctx, .. } => *ctx = Some(context),
            Self::InvalidArgument { context: ctx, .. } => *ctx = Some(context),
        }
        self
    }

    /// Get the operation name for this error
    pub fn operation(&self) -> &str {
        match self {
            Self::InvalidAxis { operation, .. } => operation,
            Self::DuplicateAxis { operation, .. } => operation,
            Self::EmptyReduction { operation, .. } => operation,
            Self::UnsupportedDType { operation, .. } => operation,
            Self::InvalidShape { operation, .. } => operation,
            Self::InvalidArgument { operation, .. } => operation,
        }
    }

    /// Get the attached context, if any
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::InvalidAxis { context, .. }
            | Self::DuplicateAxis { context, .. }
            | Self::EmptyReduction { context, .. }
            | Self::UnsupportedDType { context, .. }
            | Self::InvalidShape { context, .. }
            | Self::InvalidArgument { context, .. } => context.as_ref(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAxis { .. } | Self::DuplicateAxis { .. } => ErrorKind::Axis,
            Self::EmptyReduction { .. } => ErrorKind::Value,
            Self::UnsupportedDType { .. } => ErrorKind::Type,
            Self::InvalidShape { .. } | Self::InvalidArgument { .. } => ErrorKind::Layout,
        }
    }
}

pub type Result<T> = std::result::Result<T, TensorError>;
