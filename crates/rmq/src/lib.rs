#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![doc = include_str!("../README.md")]

pub mod prelude {
    //! Import of useful traits and types from the crate

    pub use crate::{
        Error, RangeMin, Result,
        engine::{Engine, EngineKind},
        naive::Naive,
        segment_tree::SegmentTree,
        sparse_table::SparseTable,
        srd::Srd,
    };
}

mod error;
pub use error::{Error, Result};

pub mod engine;
pub mod naive;
pub mod segment_tree;
pub mod sparse_table;
pub mod srd;

/// A trait shared by all range minimum query structures.
///
/// Every implementor owns a private copy of the values it was built from, so queries always
/// reflect the values as of the last build plus every successful [`RangeMin::update`] since.
/// Only the minimum *value* is part of the contract; which of several tied positions produced it
/// is not.
///
/// The trait is object safe, construction is left to the inherent `new` of each structure.
pub trait RangeMin<T> {
    /// Returns the number of elements indexed by the structure.
    fn len(&self) -> usize;

    /// Returns `true` if the structure indexes no element.
    ///
    /// All structures in this crate refuse to be built from empty input, so this is always `false`
    /// for them.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the minimum value in the closed range `[left, right]`.
    ///
    /// # Errors
    ///
    /// [`Error::Range`] if `left > right` or any of the two indices is out of bounds.
    fn query(&self, left: usize, right: usize) -> Result<T>;

    /// Sets the value at `index` to `value`.
    ///
    /// # Errors
    ///
    /// [`Error::Index`] if `index` is out of bounds, or [`Error::Unsupported`] if the structure
    /// can not be updated in place. A failed update never changes the structure.
    fn update(&mut self, index: usize, value: T) -> Result<()>;

    /// Whether [`RangeMin::update`] is supported at all.
    fn supports_update(&self) -> bool {
        true
    }

    /// Returns the number of heap bytes used by the structure.
    ///
    /// This counts the live elements of every internal array, but not unused capacity.
    fn heap_size(&self) -> usize;
}

/// Validate a closed query range against a structure of length `len`.
#[inline]
pub(crate) fn check_range(left: usize, right: usize, len: usize) -> Result<()> {
    if left > right || right >= len {
        Err(Error::Range { left, right, len })
    } else {
        Ok(())
    }
}

/// Validate an update position against a structure of length `len`.
#[inline]
pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(Error::Index { index, len })
    }
}
