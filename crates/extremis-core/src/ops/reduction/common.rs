//! Axis normalization shared by every reduction
//!
//! Pure functions over `(raw axis argument, rank)`; nothing here looks at
//! array data.

use crate::{Result, TensorError};

/// Raw axis argument of a reduction.
///
/// "Reduce every axis" is its own variant. An empty [`AxisSpec::Many`]
/// reduces no axis at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AxisSpec {
    /// Reduce every axis
    #[default]
    All,
    /// Reduce one axis; negative values count from the end
    Single(isize),
    /// Reduce each listed axis; order is irrelevant, duplicates are rejected
    Many(Vec<isize>),
}

impl AxisSpec {
    /// The raw axis values, for diagnostics
    pub fn raw(&self) -> Vec<isize> {
        match self {
            AxisSpec::All => Vec::new(),
            AxisSpec::Single(axis) => vec![*axis],
            AxisSpec::Many(axes) => axes.clone(),
        }
    }
}

impl From<isize> for AxisSpec {
    fn from(axis: isize) -> Self {
        AxisSpec::Single(axis)
    }
}

impl From<Vec<isize>> for AxisSpec {
    fn from(axes: Vec<isize>) -> Self {
        AxisSpec::Many(axes)
    }
}

impl From<&[isize]> for AxisSpec {
    fn from(axes: &[isize]) -> Self {
        AxisSpec::Many(axes.to_vec())
    }
}

impl<const N: usize> From<[isize; N]> for AxisSpec {
    fn from(axes: [isize; N]) -> Self {
        AxisSpec::Many(axes.to_vec())
    }
}

impl From<Option<isize>> for AxisSpec {
    fn from(axis: Option<isize>) -> Self {
        axis.map_or(AxisSpec::All, AxisSpec::Single)
    }
}

/// Canonical axis set produced by [`normalize_axes`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NormalizedAxes {
    /// Every axis of an array of the recorded rank
    All { rank: usize },
    /// Ascending, duplicate-free subset of `0..rank`
    Subset { axes: Vec<usize>, rank: usize },
}

impl NormalizedAxes {
    pub fn rank(&self) -> usize {
        match self {
            NormalizedAxes::All { rank } | NormalizedAxes::Subset { rank, .. } => *rank,
        }
    }

    /// The reduced axes as an ascending list
    pub fn to_vec(&self) -> Vec<usize> {
        match self {
            NormalizedAxes::All { rank } => (0..*rank).collect(),
            NormalizedAxes::Subset { axes, .. } => axes.clone(),
        }
    }

    /// True when every axis is reduced, whether or not it was spelled out
    pub fn covers_all(&self) -> bool {
        match self {
            NormalizedAxes::All { .. } => true,
            NormalizedAxes::Subset { axes, rank } => axes.len() == *rank,
        }
    }

    pub fn contains(&self, axis: usize) -> bool {
        match self {
            NormalizedAxes::All { rank } => axis < *rank,
            NormalizedAxes::Subset { axes, .. } => axes.binary_search(&axis).is_ok(),
        }
    }
}

/// Normalize a single, possibly negative, axis index
///
/// # Examples
/// ```
/// use extremis_core::ops::reduction::normalize_axis;
/// assert_eq!(normalize_axis(-1, 3).unwrap(), 2);
/// assert!(normalize_axis(3, 3).is_err());
/// ```
pub fn normalize_axis(axis: isize, rank: usize) -> Result<usize> {
    let signed_rank = rank as isize;
    let normalized = if axis < 0 { signed_rank + axis } else { axis };
    if normalized < 0 || normalized >= signed_rank {
        Err(TensorError::invalid_axis("normalize_axis", axis, rank))
    } else {
        Ok(normalized as usize)
    }
}

/// Validate an axis argument against `rank` and bring it into canonical form
///
/// Fails when an axis is outside `[-rank, rank)` or when two entries name the
/// same axis after normalization.
pub fn normalize_axes(spec: &AxisSpec, rank: usize) -> Result<NormalizedAxes> {
    let raw = match spec {
        AxisSpec::All => return Ok(NormalizedAxes::All { rank }),
        AxisSpec::Single(axis) => std::slice::from_ref(axis),
        AxisSpec::Many(axes) => axes.as_slice(),
    };

    let mut axes = raw
        .iter()
        .map(|&axis| normalize_axis(axis, rank))
        .collect::<Result<Vec<_>>>()?;
    axes.sort_unstable();
    if let Some(pair) = axes.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(TensorError::duplicate_axis("normalize_axes", pair[0]));
    }

    Ok(NormalizedAxes::Subset { axes, rank })
}
