//! Accelerated reduction backends
//!
//! A backend sees raw bytes tagged with a [`DType`], never a typed tensor,
//! the same way a vendor library would be driven through a C API. It answers
//! every call with a [`BackendOutcome`]; an `Unsupported` answer is not an
//! error, the dispatcher recomputes the result on the generic path.

#[cfg(feature = "parallel")]
mod parallel;

#[cfg(feature = "parallel")]
pub use parallel::ParallelBackend;

use crate::{DType, ReduceOp};
use std::fmt::Debug;
use std::sync::{Arc, OnceLock, RwLock};
use tracing::debug;

/// Backend kind, recorded in dispatch reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendType {
    /// Bundled rayon backend
    #[cfg(feature = "parallel")]
    Parallel,
    /// Backend supplied by the integrator
    External,
}

impl BackendType {
    /// Priority for backend selection (higher = preferred), see
    /// [`register_backend`]
    pub fn priority(&self) -> u8 {
        match self {
            #[cfg(feature = "parallel")]
            BackendType::Parallel => 10,
            BackendType::External => 20,
        }
    }
}

/// Raw, dense input handed to a backend.
#[derive(Debug, Clone, Copy)]
pub struct BackendBuffer<'a> {
    dtype: DType,
    len: usize,
    bytes: &'a [u8],
}

impl<'a> BackendBuffer<'a> {
    /// Wrap `bytes` holding `bytes.len() / dtype.size()` elements.
    ///
    /// Returns `None` when the byte count is not a whole number of elements.
    pub fn new(dtype: DType, bytes: &'a [u8]) -> Option<Self> {
        let size = dtype.size();
        if size == 0 || bytes.len() % size != 0 {
            return None;
        }
        Some(Self {
            dtype,
            len: bytes.len() / size,
            bytes,
        })
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

/// How the segments of a segmented reduction sit in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentOrientation {
    /// Segment `s` occupies elements `s * len .. (s + 1) * len`
    Rows,
    /// Element `j` of segment `s` sits at `s + j * num_segments`
    Columns,
}

/// Geometry of a segmented reduction over a `num_segments × segment_len`
/// matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentSpec {
    pub num_segments: usize,
    pub segment_len: usize,
    pub orientation: SegmentOrientation,
}

impl SegmentSpec {
    pub fn rows(num_segments: usize, segment_len: usize) -> Self {
        Self {
            num_segments,
            segment_len,
            orientation: SegmentOrientation::Rows,
        }
    }

    pub fn columns(num_segments: usize, segment_len: usize) -> Self {
        Self {
            num_segments,
            segment_len,
            orientation: SegmentOrientation::Columns,
        }
    }

    /// Total number of input elements covered
    pub fn numel(&self) -> usize {
        self.num_segments * self.segment_len
    }

    /// Buffer index of element `j` of segment `s`
    pub fn element_index(&self, segment: usize, j: usize) -> usize {
        match self.orientation {
            SegmentOrientation::Rows => segment * self.segment_len + j,
            SegmentOrientation::Columns => segment + j * self.num_segments,
        }
    }
}

/// Answer of a backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendOutcome {
    /// Raw result bytes: one element for a full reduction, one per segment
    /// otherwise
    Success(Vec<u8>),
    /// The backend cannot handle this configuration
    Unsupported(String),
}

impl BackendOutcome {
    pub fn unsupported(reason: impl Into<String>) -> Self {
        BackendOutcome::Unsupported(reason.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BackendOutcome::Success(_))
    }
}

/// A high-throughput min/max implementation over dense buffers.
///
/// Implementations must reduce with the same combine functions as
/// [`crate::Element::policy`], otherwise accelerated and generic results
/// diverge.
pub trait ReductionBackend: Debug + Send + Sync {
    /// Name used in logs and reports
    fn name(&self) -> &str;

    fn backend_type(&self) -> BackendType {
        BackendType::External
    }

    /// Reduce the whole buffer to a single element
    fn full_reduce(&self, input: BackendBuffer<'_>, op: ReduceOp) -> BackendOutcome;

    /// Reduce each segment of the buffer to one element
    fn segmented_reduce(
        &self,
        input: BackendBuffer<'_>,
        segments: SegmentSpec,
        op: ReduceOp,
    ) -> BackendOutcome;
}

static DEFAULT_BACKEND: OnceLock<RwLock<Option<Arc<dyn ReductionBackend>>>> = OnceLock::new();

fn default_backend_lock() -> &'static RwLock<Option<Arc<dyn ReductionBackend>>> {
    DEFAULT_BACKEND.get_or_init(|| RwLock::new(bundled_backend()))
}

#[cfg(feature = "parallel")]
fn bundled_backend() -> Option<Arc<dyn ReductionBackend>> {
    Some(Arc::new(ParallelBackend::default()))
}

#[cfg(not(feature = "parallel"))]
fn bundled_backend() -> Option<Arc<dyn ReductionBackend>> {
    None
}

/// The backend used by [`crate::Dispatcher::global`]
pub fn default_backend() -> Option<Arc<dyn ReductionBackend>> {
    default_backend_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Offer `backend` as the process-wide default.
///
/// It replaces the current default only when none is registered or when its
/// [`BackendType::priority`] is at least that of the current one, so an
/// integrator's backend is not displaced by a later bundled one. Returns
/// whether `backend` was installed.
pub fn register_backend(backend: Arc<dyn ReductionBackend>) -> bool {
    let mut slot = default_backend_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if !outranks(backend.as_ref(), slot.as_deref()) {
        debug!(backend = backend.name(), "kept higher-priority reduction backend");
        return false;
    }
    debug!(
        backend = backend.name(),
        priority = backend.backend_type().priority(),
        "registered reduction backend"
    );
    *slot = Some(backend);
    true
}

fn outranks(candidate: &dyn ReductionBackend, current: Option<&dyn ReductionBackend>) -> bool {
    current.map_or(true, |current| {
        candidate.backend_type().priority() >= current.backend_type().priority()
    })
}

/// Replace the process-wide default backend unconditionally
pub fn set_default_backend(backend: Arc<dyn ReductionBackend>) {
    *default_backend_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(backend);
}

/// Remove the process-wide default backend; every reduction then takes the
/// generic path
pub fn clear_default_backend() {
    *default_backend_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
}
