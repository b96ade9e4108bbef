use super::{BackendBuffer, BackendOutcome, BackendType, ReductionBackend, SegmentOrientation, SegmentSpec};
use crate::{DType, Element, ReduceOp};
use bytemuck::Pod;
use num_complex::Complex;
use rayon::prelude::*;

/// Default number of elements per rayon task
const DEFAULT_CHUNK_LEN: usize = 16 * 1024;

/// Multi-threaded CPU backend built on rayon.
///
/// Handles every accelerable dtype in both shapes.
#[derive(Debug, Clone)]
pub struct ParallelBackend {
    chunk_len: usize,
}

impl Default for ParallelBackend {
    fn default() -> Self {
        Self {
            chunk_len: DEFAULT_CHUNK_LEN,
        }
    }
}

macro_rules! reduce_as {
    ($this:expr, $dtype:expr, $method:ident($($arg:expr),*)) => {
        match $dtype {
            DType::Int8 => $this.$method::<i8>($($arg),*),
            DType::Int16 => $this.$method::<i16>($($arg),*),
            DType::Int32 => $this.$method::<i32>($($arg),*),
            DType::Int64 => $this.$method::<i64>($($arg),*),
            DType::UInt8 => $this.$method::<u8>($($arg),*),
            DType::UInt16 => $this.$method::<u16>($($arg),*),
            DType::UInt32 => $this.$method::<u32>($($arg),*),
            DType::UInt64 => $this.$method::<u64>($($arg),*),
            DType::Float32 => $this.$method::<f32>($($arg),*),
            DType::Float64 => $this.$method::<f64>($($arg),*),
            DType::Complex32 => $this.$method::<Complex<f32>>($($arg),*),
            DType::Complex64 => $this.$method::<Complex<f64>>($($arg),*),
            other => BackendOutcome::unsupported(format!("dtype {other} is not handled")),
        }
    };
}

impl ParallelBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elements handled by one rayon task; clamped to at least 1
    pub fn with_chunk_len(mut self, chunk_len: usize) -> Self {
        self.chunk_len = chunk_len.max(1);
        self
    }

    pub fn chunk_len(&self) -> usize {
        self.chunk_len
    }

    fn full_typed<T: Element + Pod>(&self, input: BackendBuffer<'_>, op: ReduceOp) -> BackendOutcome {
        let data: &[T] = match bytemuck::try_cast_slice(input.bytes()) {
            Ok(data) => data,
            Err(e) => return BackendOutcome::unsupported(format!("cannot view input as {}: {e}", T::DTYPE)),
        };
        let combine = T::policy().combiner(op);
        let result = data
            .par_chunks(self.chunk_len)
            .filter_map(|chunk| chunk.iter().copied().reduce(combine))
            .reduce_with(combine);
        match result {
            Some(value) => BackendOutcome::Success(bytemuck::bytes_of(&value).to_vec()),
            None => BackendOutcome::unsupported("empty input"),
        }
    }

    fn segmented_typed<T: Element + Pod>(
        &self,
        input: BackendBuffer<'_>,
        segments: SegmentSpec,
        op: ReduceOp,
    ) -> BackendOutcome {
        let data: &[T] = match bytemuck::try_cast_slice(input.bytes()) {
            Ok(data) => data,
            Err(e) => return BackendOutcome::unsupported(format!("cannot view input as {}: {e}", T::DTYPE)),
        };
        if segments.numel() != data.len() {
            return BackendOutcome::unsupported(format!(
                "{} segments of length {} do not cover {} elements",
                segments.num_segments,
                segments.segment_len,
                data.len()
            ));
        }
        if segments.segment_len == 0 {
            return BackendOutcome::unsupported("zero-length segments");
        }

        let combine = T::policy().combiner(op);
        let segment_len = segments.segment_len;
        let num_segments = segments.num_segments;
        let mut out = vec![T::default(); num_segments];

        match segments.orientation {
            SegmentOrientation::Rows => {
                out.par_iter_mut()
                    .zip(data.par_chunks(segment_len))
                    .for_each(|(slot, row)| {
                        if let Some(value) = row.iter().copied().reduce(combine) {
                            *slot = value;
                        }
                    });
            }
            SegmentOrientation::Columns => {
                // Sweep the matrix row by row so every task streams through
                // memory instead of jumping by `num_segments`.
                let block_len = self.chunk_len.min(num_segments).max(1);
                out.par_chunks_mut(block_len)
                    .enumerate()
                    .for_each(|(block, acc)| {
                        let start = block * block_len;
                        let end = start + acc.len();
                        acc.copy_from_slice(&data[start..end]);
                        for row in 1..segment_len {
                            let base = row * num_segments;
                            for (slot, &value) in acc.iter_mut().zip(&data[base + start..base + end]) {
                                *slot = combine(*slot, value);
                            }
                        }
                    });
            }
        }

        BackendOutcome::Success(bytemuck::cast_slice(&out).to_vec())
    }
}

impl ReductionBackend for ParallelBackend {
    fn name(&self) -> &str {
        "rayon"
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Parallel
    }

    fn full_reduce(&self, input: BackendBuffer<'_>, op: ReduceOp) -> BackendOutcome {
        reduce_as!(self, input.dtype(), full_typed(input, op))
    }

    fn segmented_reduce(
        &self,
        input: BackendBuffer<'_>,
        segments: SegmentSpec,
        op: ReduceOp,
    ) -> BackendOutcome {
        reduce_as!(self, input.dtype(), segmented_typed(input, segments, op))
    }
}
