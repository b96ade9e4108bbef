use crate::strided::StridedLayout;
use crate::{DType, Element, Result, Shape, TensorError};
use std::sync::Arc;

/// Immutable N-dimensional view over a shared buffer.
///
/// Views created by [`Tensor::transpose`], [`Tensor::flip`],
/// [`Tensor::slice_axis`] or [`Tensor::broadcast_to`] share the buffer of
/// the tensor they were derived from.
#[derive(Debug, Clone)]
pub struct Tensor<T> {
    storage: Arc<Vec<T>>,
    layout: StridedLayout,
    shape: Shape,
}

impl<T: Copy> Tensor<T> {
    /// Create a C-ordered tensor from a flat vector
    pub fn from_vec(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        Self::check_len(data.len(), shape)?;
        Ok(Self::from_layout_unchecked(
            Arc::new(data),
            StridedLayout::new(shape.to_vec()),
        ))
    }

    /// Create a 0-d tensor
    pub fn from_scalar(value: T) -> Self {
        Self::from_layout_unchecked(Arc::new(vec![value]), StridedLayout::new(Vec::new()))
    }

    /// Create a view with an arbitrary layout over `storage`
    pub fn from_parts(storage: Arc<Vec<T>>, layout: StridedLayout) -> Result<Self> {
        layout.check_bounds(storage.len())?;
        Ok(Self::from_layout_unchecked(storage, layout))
    }

    fn from_layout_unchecked(storage: Arc<Vec<T>>, layout: StridedLayout) -> Self {
        let shape = Shape::from_slice(layout.shape());
        Self {
            storage,
            layout,
            shape,
        }
    }

    fn check_len(len: usize, shape: &[usize]) -> Result<()> {
        let expected = crate::shape::checked_numel(shape).ok_or_else(|| {
            TensorError::invalid_shape(
                "tensor_creation",
                format!("shape {shape:?} has more elements than fit in usize"),
                shape,
            )
        })?;
        if len != expected {
            return Err(TensorError::invalid_shape(
                "tensor_creation",
                format!("data length {len} does not match shape size {expected}"),
                shape,
            ));
        }
        Ok(())
    }

    fn with_layout(&self, layout: StridedLayout) -> Self {
        Self::from_layout_unchecked(Arc::clone(&self.storage), layout)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn layout(&self) -> &StridedLayout {
        &self.layout
    }

    pub fn ndim(&self) -> usize {
        self.shape.rank()
    }

    pub fn numel(&self) -> usize {
        self.shape.size()
    }

    pub fn is_empty(&self) -> bool {
        self.numel() == 0
    }

    /// The whole underlying buffer, including elements outside this view
    pub fn storage(&self) -> &[T] {
        &self.storage
    }

    /// The elements of this view as one slice, when they form a dense C-order
    /// block
    pub fn as_slice(&self) -> Option<&[T]> {
        if !self.layout.is_c_contiguous() {
            return None;
        }
        let start = self.layout.offset();
        self.storage.get(start..start + self.numel())
    }

    /// Element at a multi-dimensional index
    pub fn get(&self, index: &[usize]) -> Option<T> {
        let offset = self.layout.linear_index(index).ok()?;
        self.storage.get(offset).copied()
    }

    /// The single element of a one-element tensor
    pub fn item(&self) -> Option<T> {
        if self.numel() != 1 {
            return None;
        }
        self.iter().next()
    }

    /// Elements in logical C order
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.layout.offsets().map(move |offset| self.storage[offset])
    }

    /// Copy the elements out in logical C order
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// Materialize a C-contiguous copy
    pub fn to_contiguous(&self) -> Self {
        Self::from_layout_unchecked(
            Arc::new(self.to_vec()),
            StridedLayout::new(self.shape.to_vec()),
        )
    }

    /// Materialize a Fortran-contiguous copy
    pub fn to_fortran(&self) -> Self {
        let reversed = self
            .layout
            .transpose(None)
            .map(|layout| self.with_layout(layout).to_vec())
            .unwrap_or_default();
        Self::from_layout_unchecked(
            Arc::new(reversed),
            StridedLayout::fortran(self.shape.to_vec()),
        )
    }

    /// Permute axes; `None` reverses them
    pub fn transpose(&self, axes: Option<&[usize]>) -> Result<Self> {
        Ok(self.with_layout(self.layout.transpose(axes)?))
    }

    /// Reverse one axis
    pub fn flip(&self, axis: usize) -> Result<Self> {
        Ok(self.with_layout(self.layout.flip(axis)?))
    }

    /// Take every `step`-th element of `range` along `axis`
    pub fn slice_axis(&self, axis: usize, range: std::ops::Range<usize>, step: usize) -> Result<Self> {
        Ok(self.with_layout(self.layout.slice_axis(axis, range, step)?))
    }

    /// Broadcast to `shape` with zero strides
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<Self> {
        Ok(self.with_layout(self.layout.broadcast_to(shape)?))
    }

    /// Insert size-1 axes at `positions` of the result
    pub fn insert_unit_axes(&self, positions: &[usize]) -> Result<Self> {
        Ok(self.with_layout(self.layout.insert_unit_axes(positions)?))
    }
}

impl<T: Element> Tensor<T> {
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }
}

impl<T: Copy + PartialEq> PartialEq for Tensor<T> {
    /// Logical equality: same shape and same elements in C order.
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.iter().eq(other.iter())
    }
}
