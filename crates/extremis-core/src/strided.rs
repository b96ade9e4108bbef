use crate::shape::checked_numel;
use crate::{Result, TensorError};
use std::ops::Range;

/// Memory order of a dense layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryOrder {
    /// Row-major: the last axis varies fastest.
    C,
    /// Column-major: the first axis varies fastest.
    F,
}

/// Strided tensor layout: shape, per-axis element strides and a base offset.
///
/// Strides may be negative (reversed views) or zero (broadcast axes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StridedLayout {
    shape: Vec<usize>,
    strides: Vec<isize>,
    offset: usize,
}

impl StridedLayout {
    /// Create a new strided layout with default C-contiguous strides
    pub fn new(shape: Vec<usize>) -> Self {
        let strides = Self::compute_strides(&shape);
        Self {
            shape,
            strides,
            offset: 0,
        }
    }

    /// Create a new layout with Fortran-contiguous strides
    pub fn fortran(shape: Vec<usize>) -> Self {
        let strides = Self::compute_fortran_strides(&shape);
        Self {
            shape,
            strides,
            offset: 0,
        }
    }

    /// Create layout with custom strides
    pub fn with_strides(shape: Vec<usize>, strides: Vec<isize>, offset: usize) -> Result<Self> {
        if shape.len() != strides.len() {
            return Err(TensorError::invalid_shape(
                "strided_layout",
                format!(
                    "shape and strides must have same length: {} != {}",
                    shape.len(),
                    strides.len()
                ),
                &shape,
            ));
        }

        Ok(Self {
            shape,
            strides,
            offset,
        })
    }

    /// Compute C-contiguous strides for a shape
    fn compute_strides(shape: &[usize]) -> Vec<isize> {
        let mut strides = vec![1isize; shape.len()];
        for i in (0..shape.len().saturating_sub(1)).rev() {
            strides[i] = dense_step(strides[i + 1], shape[i + 1]);
        }
        strides
    }

    fn compute_fortran_strides(shape: &[usize]) -> Vec<isize> {
        let mut strides = vec![1isize; shape.len()];
        for i in 1..shape.len() {
            strides[i] = dense_step(strides[i - 1], shape[i - 1]);
        }
        strides
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Get total number of elements, saturating at `usize::MAX`
    pub fn numel(&self) -> usize {
        self.checked_numel().unwrap_or(usize::MAX)
    }

    /// Total number of elements, `None` if it does not fit in `usize`
    pub fn checked_numel(&self) -> Option<usize> {
        checked_numel(&self.shape)
    }

    /// Whether the strides match a dense C-order block.
    ///
    /// Axes of extent 1 are ignored since their stride never contributes to an
    /// address. The base offset is not considered.
    pub fn is_c_contiguous(&self) -> bool {
        Self::dense_along(self.shape.iter().zip(&self.strides).rev())
    }

    /// Whether the strides match a dense F-order block (offset ignored).
    pub fn is_fortran_contiguous(&self) -> bool {
        Self::dense_along(self.shape.iter().zip(&self.strides))
    }

    fn dense_along<'a>(axes: impl Iterator<Item = (&'a usize, &'a isize)>) -> bool {
        let mut expected = 1isize;
        for (&dim, &stride) in axes {
            if dim == 1 {
                continue;
            }
            if stride != expected {
                return false;
            }
            expected = dense_step(expected, dim);
        }
        true
    }

    /// Dense memory order of this layout, preferring C when both apply.
    pub fn memory_order(&self) -> Option<MemoryOrder> {
        if self.is_c_contiguous() {
            Some(MemoryOrder::C)
        } else if self.is_fortran_contiguous() {
            Some(MemoryOrder::F)
        } else {
            None
        }
    }

    /// Compute the buffer offset of a multi-dimensional index
    pub fn linear_index(&self, indices: &[usize]) -> Result<usize> {
        if indices.len() != self.shape.len() {
            return Err(TensorError::invalid_argument_op(
                "linear_index",
                format!(
                    "index dimension mismatch: {} != {}",
                    indices.len(),
                    self.shape.len()
                ),
            ));
        }

        let mut linear_idx = self.base_offset("linear_index")?;
        for (i, &idx) in indices.iter().enumerate() {
            if idx >= self.shape[i] {
                return Err(TensorError::invalid_argument_op(
                    "linear_index",
                    format!("index out of bounds: {} >= {}", idx, self.shape[i]),
                ));
            }
            linear_idx = scaled(idx, self.strides[i])
                .and_then(|step| linear_idx.checked_add(step))
                .ok_or_else(|| self.overflow("linear_index"))?;
        }

        usize::try_from(linear_idx).map_err(|_| {
            TensorError::invalid_argument_op(
                "linear_index",
                format!("index {indices:?} resolves to negative offset {linear_idx}"),
            )
        })
    }

    /// Smallest and largest buffer offsets reachable through this layout.
    ///
    /// Returns `Ok(None)` for layouts with no elements, and an error when an
    /// offset does not fit in `isize`.
    pub fn offset_span(&self) -> Result<Option<(isize, isize)>> {
        if self.shape.contains(&0) {
            return Ok(None);
        }
        let mut lo = self.base_offset("strided_layout")?;
        let mut hi = lo;
        for (&dim, &stride) in self.shape.iter().zip(&self.strides) {
            let extent = scaled(dim - 1, stride).ok_or_else(|| self.overflow("strided_layout"))?;
            let bound = if extent < 0 { &mut lo } else { &mut hi };
            *bound = bound
                .checked_add(extent)
                .ok_or_else(|| self.overflow("strided_layout"))?;
        }
        Ok(Some((lo, hi)))
    }

    /// Verify that every reachable offset addresses a buffer of `len` elements.
    pub fn check_bounds(&self, len: usize) -> Result<()> {
        if self.checked_numel().is_none() {
            return Err(self.overflow("strided_layout"));
        }
        match self.offset_span()? {
            None => Ok(()),
            Some((lo, hi)) if lo >= 0 && (hi as usize) < len => Ok(()),
            Some((lo, hi)) => Err(TensorError::invalid_shape(
                "strided_layout",
                format!("layout addresses offsets {lo}..={hi} outside a buffer of {len} elements"),
                &self.shape,
            )),
        }
    }

    fn base_offset(&self, operation: &str) -> Result<isize> {
        isize::try_from(self.offset).map_err(|_| self.overflow(operation))
    }

    fn overflow(&self, operation: &str) -> TensorError {
        TensorError::invalid_shape(
            operation,
            format!("element count or offsets overflow for strides {:?}", self.strides),
            &self.shape,
        )
    }

    /// Transpose the layout; `None` reverses all axes
    pub fn transpose(&self, axes: Option<&[usize]>) -> Result<Self> {
        let axes = if let Some(axes) = axes {
            if axes.len() != self.shape.len() {
                return Err(TensorError::invalid_argument_op(
                    "transpose",
                    format!("expected {} axes, got {}", self.shape.len(), axes.len()),
                ));
            }
            axes.to_vec()
        } else {
            (0..self.shape.len()).rev().collect()
        };

        let mut seen = vec![false; self.shape.len()];
        for &ax in &axes {
            if ax >= self.shape.len() || seen[ax] {
                return Err(TensorError::invalid_argument_op(
                    "transpose",
                    format!("{axes:?} is not a permutation"),
                ));
            }
            seen[ax] = true;
        }

        Ok(Self {
            shape: axes.iter().map(|&i| self.shape[i]).collect(),
            strides: axes.iter().map(|&i| self.strides[i]).collect(),
            offset: self.offset,
        })
    }

    /// Reverse the traversal direction of one axis (negative stride view)
    pub fn flip(&self, axis: usize) -> Result<Self> {
        if axis >= self.shape.len() {
            return Err(TensorError::invalid_axis("flip", axis as isize, self.shape.len()));
        }
        let mut flipped = self.clone();
        let dim = self.shape[axis];
        if dim > 1 {
            let start = scaled(dim - 1, self.strides[axis])
                .and_then(|extent| self.base_offset("flip").ok()?.checked_add(extent))
                .ok_or_else(|| self.overflow("flip"))?;
            flipped.offset = usize::try_from(start).map_err(|_| {
                TensorError::invalid_shape("flip", "flipped view starts before the buffer", &self.shape)
            })?;
        }
        flipped.strides[axis] = self.strides[axis]
            .checked_neg()
            .ok_or_else(|| self.overflow("flip"))?;
        Ok(flipped)
    }

    /// Restrict one axis to `range`, taking every `step`-th element
    pub fn slice_axis(&self, axis: usize, range: Range<usize>, step: usize) -> Result<Self> {
        if axis >= self.shape.len() {
            return Err(TensorError::invalid_axis(
                "slice_axis",
                axis as isize,
                self.shape.len(),
            ));
        }
        if step == 0 {
            return Err(TensorError::invalid_argument_op(
                "slice_axis",
                "slice step cannot be zero",
            ));
        }
        let end = range.end.min(self.shape[axis]);
        let start = range.start.min(end);
        let mut sliced = self.clone();
        sliced.shape[axis] = (end - start).div_ceil(step);
        // A single remaining element never moves along the axis.
        if sliced.shape[axis] > 1 {
            sliced.strides[axis] =
                scaled(step, self.strides[axis]).ok_or_else(|| self.overflow("slice_axis"))?;
        }
        let new_offset = scaled(start, self.strides[axis])
            .and_then(|shift| self.base_offset("slice_axis").ok()?.checked_add(shift))
            .ok_or_else(|| self.overflow("slice_axis"))?;
        sliced.offset = usize::try_from(new_offset).map_err(|_| {
            TensorError::invalid_shape("slice_axis", "slice resulted in negative offset", &self.shape)
        })?;
        Ok(sliced)
    }

    /// Broadcast to a new shape (zero strides on expanded axes)
    pub fn broadcast_to(&self, target_shape: &[usize]) -> Result<Self> {
        if target_shape.len() < self.shape.len() {
            return Err(TensorError::invalid_shape(
                "broadcast_to",
                format!("cannot broadcast to lower rank {}", target_shape.len()),
                &self.shape,
            ));
        }

        if checked_numel(target_shape).is_none() {
            return Err(TensorError::invalid_shape(
                "broadcast_to",
                format!("target shape {target_shape:?} has more elements than fit in usize"),
                &self.shape,
            ));
        }

        let lead = target_shape.len() - self.shape.len();
        let mut new_strides = vec![0; target_shape.len()];

        for i in 0..self.shape.len() {
            let target_dim = target_shape[i + lead];
            let self_dim = self.shape[i];

            if self_dim != 1 && self_dim != target_dim {
                return Err(TensorError::invalid_shape(
                    "broadcast_to",
                    format!("cannot broadcast dimension {self_dim} to {target_dim} at axis {i}"),
                    &self.shape,
                ));
            }

            new_strides[i + lead] = if self_dim == 1 { 0 } else { self.strides[i] };
        }

        Ok(Self {
            shape: target_shape.to_vec(),
            strides: new_strides,
            offset: self.offset,
        })
    }

    /// Insert size-1 axes so that they land at `positions` of the result.
    ///
    /// `positions` must be ascending and index into the expanded rank.
    pub fn insert_unit_axes(&self, positions: &[usize]) -> Result<Self> {
        let new_rank = self.shape.len() + positions.len();
        let mut shape = Vec::with_capacity(new_rank);
        let mut strides = Vec::with_capacity(new_rank);
        let mut source = self.shape.iter().zip(&self.strides);
        for i in 0..new_rank {
            if positions.contains(&i) {
                shape.push(1);
                strides.push(0);
            } else {
                let (&dim, &stride) = source.next().ok_or_else(|| {
                    TensorError::invalid_argument_op(
                        "insert_unit_axes",
                        format!("positions {positions:?} exceed rank {new_rank}"),
                    )
                })?;
                shape.push(dim);
                strides.push(stride);
            }
        }
        if source.next().is_some() {
            return Err(TensorError::invalid_argument_op(
                "insert_unit_axes",
                format!("positions {positions:?} are not ascending and unique"),
            ));
        }
        Ok(Self {
            shape,
            strides,
            offset: self.offset,
        })
    }

    /// Iterate buffer offsets of every element in logical C order
    pub fn offsets(&self) -> impl Iterator<Item = usize> {
        let base = self.offset as isize;
        StrideWalker::new(self.shape.clone(), self.strides.clone()).map(move |rel| (base + rel) as usize)
    }
}

/// `dim` steps of `stride`, `None` on overflow
fn scaled(dim: usize, stride: isize) -> Option<isize> {
    isize::try_from(dim).ok()?.checked_mul(stride)
}

/// Next dense stride after an axis of extent `dim`, saturating.
///
/// Saturation only happens for shapes with a zero dimension, whose strides
/// never address memory.
fn dense_step(stride: isize, dim: usize) -> isize {
    stride.saturating_mul(isize::try_from(dim.max(1)).unwrap_or(isize::MAX))
}

/// Odometer over a grid of `dims`, yielding offsets relative to its origin.
///
/// The last axis turns fastest, so offsets come out in C order of `dims`.
/// Every offset produced lies inside the span of the grid, so walking a
/// layout that passed [`StridedLayout::check_bounds`] cannot overflow.
pub(crate) struct StrideWalker {
    dims: Vec<usize>,
    strides: Vec<isize>,
    counters: Vec<usize>,
    offset: isize,
    done: bool,
}

impl StrideWalker {
    pub(crate) fn new(dims: Vec<usize>, strides: Vec<isize>) -> Self {
        let done = dims.contains(&0);
        let counters = vec![0; dims.len()];
        Self {
            dims,
            strides,
            counters,
            offset: 0,
            done,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.counters.iter_mut().for_each(|c| *c = 0);
        self.offset = 0;
        self.done = self.dims.contains(&0);
    }
}

impl Iterator for StrideWalker {
    type Item = isize;

    fn next(&mut self) -> Option<isize> {
        if self.done {
            return None;
        }
        let current = self.offset;

        // A scalar has exactly one offset.
        self.done = true;
        for axis in (0..self.dims.len()).rev() {
            if self.counters[axis] + 1 < self.dims[axis] {
                self.counters[axis] += 1;
                self.offset += self.strides[axis];
                self.done = false;
                break;
            }
            self.offset -= self.strides[axis] * self.counters[axis] as isize;
            self.counters[axis] = 0;
        }

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strided_layout_basic() {
        let layout = StridedLayout::new(vec![2, 3, 4]);
        assert_eq!(layout.strides(), &[12, 4, 1]);
        assert_eq!(layout.numel(), 24);
        assert_eq!(layout.memory_order(), Some(MemoryOrder::C));

        let scalar = StridedLayout::new(vec![]);
        assert_eq!(scalar.numel(), 1);
        assert!(scalar.is_c_contiguous());
    }

    #[test]
    fn test_fortran_layout() {
        let layout = StridedLayout::fortran(vec![2, 3, 4]);
        assert_eq!(layout.strides(), &[1, 2, 6]);
        assert!(!layout.is_c_contiguous());
        assert_eq!(layout.memory_order(), Some(MemoryOrder::F));
    }

    #[test]
    fn test_unit_axes_ignored_for_contiguity() {
        let layout = StridedLayout::with_strides(vec![1, 3], vec![99, 1], 0).unwrap();
        assert!(layout.is_c_contiguous());
        assert!(layout.is_fortran_contiguous());
    }

    #[test]
    fn test_linear_index() {
        let layout = StridedLayout::new(vec![2, 3]);
        assert_eq!(layout.linear_index(&[1, 2]).unwrap(), 5);
        assert!(layout.linear_index(&[2, 0]).is_err());
    }

    #[test]
    fn test_flip_and_bounds() {
        let layout = StridedLayout::new(vec![2, 3]).flip(1).unwrap();
        assert_eq!(layout.strides(), &[3, -1]);
        assert_eq!(layout.offset(), 2);
        assert_eq!(layout.offset_span().unwrap(), Some((0, 5)));
        assert!(layout.check_bounds(6).is_ok());
        assert!(layout.check_bounds(5).is_err());
        assert_eq!(layout.memory_order(), None);
    }

    #[test]
    fn test_slice_axis() {
        let layout = StridedLayout::new(vec![4, 5]);
        let sliced = layout.slice_axis(1, 1..5, 2).unwrap();
        assert_eq!(sliced.shape(), &[4, 2]);
        assert_eq!(sliced.strides(), &[5, 2]);
        assert_eq!(sliced.offset(), 1);
    }

    #[test]
    fn test_transpose() {
        let layout = StridedLayout::new(vec![2, 3, 4]);
        let t = layout.transpose(None).unwrap();
        assert_eq!(t.shape(), &[4, 3, 2]);
        assert_eq!(t.strides(), &[1, 4, 12]);
        assert!(layout.transpose(Some(&[0, 0, 1])).is_err());
    }

    #[test]
    fn test_broadcast() {
        let layout = StridedLayout::new(vec![3]);
        let b = layout.broadcast_to(&[2, 3]).unwrap();
        assert_eq!(b.shape(), &[2, 3]);
        assert_eq!(b.strides(), &[0, 1]);
        assert!(layout.broadcast_to(&[2, 4]).is_err());
    }

    #[test]
    fn test_insert_unit_axes() {
        let layout = StridedLayout::new(vec![2, 4]);
        let expanded = layout.insert_unit_axes(&[1, 3]).unwrap();
        assert_eq!(expanded.shape(), &[2, 1, 4, 1]);
        assert_eq!(expanded.strides(), &[4, 0, 1, 0]);
    }

    #[test]
    fn test_walker_offsets() {
        let walker = StrideWalker::new(vec![2, 3], vec![3, 1]);
        assert_eq!(walker.collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);
        let walker = StrideWalker::new(vec![2, 2], vec![-1, 4]);
        assert_eq!(walker.collect::<Vec<_>>(), vec![0, 4, -1, 3]);
        assert_eq!(StrideWalker::new(vec![], vec![]).count(), 1);
        assert_eq!(StrideWalker::new(vec![3, 0], vec![1, 1]).count(), 0);

        let mut walker = StrideWalker::new(vec![2], vec![7]);
        assert_eq!(walker.by_ref().count(), 2);
        walker.reset();
        assert_eq!(walker.collect::<Vec<_>>(), vec![0, 7]);
    }

    #[test]
    fn test_offsets_follow_strides() {
        let layout = StridedLayout::fortran(vec![2, 3]);
        let offsets: Vec<_> = layout.offsets().collect();
        assert_eq!(offsets, vec![0, 2, 4, 1, 3, 5]);
    }

    #[test]
    fn test_overflowing_layouts_are_rejected() {
        let huge = StridedLayout::with_strides(vec![3], vec![isize::MAX / 2 + 1], 0).unwrap();
        assert!(huge.offset_span().is_err());
        assert!(huge.check_bounds(4).is_err());

        let far = StridedLayout::with_strides(vec![2], vec![1], usize::MAX).unwrap();
        assert!(far.check_bounds(4).is_err());
        assert!(far.linear_index(&[1]).is_err());

        let wide = StridedLayout::with_strides(vec![usize::MAX, 2], vec![0, 0], 0).unwrap();
        assert_eq!(wide.checked_numel(), None);
        assert!(wide.check_bounds(1).is_err());
        assert!(StridedLayout::new(vec![1]).broadcast_to(&[usize::MAX, 2]).is_err());

        let layout = StridedLayout::new(vec![4]);
        assert!(layout.slice_axis(0, 0..4, usize::MAX).is_ok());
    }

    #[test]
    fn test_empty_layout_with_huge_dims() {
        let layout = StridedLayout::new(vec![usize::MAX, 2, 0]);
        assert_eq!(layout.numel(), 0);
        assert_eq!(layout.offset_span().unwrap(), None);
        assert!(layout.check_bounds(0).is_ok());
        assert_eq!(layout.offsets().count(), 0);
        assert!(layout.is_c_contiguous());
    }
}
