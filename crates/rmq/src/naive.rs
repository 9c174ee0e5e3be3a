//! The naive RMQ "structure": a plain copy of the values, every query scans its range.
//!
//! It is the worst-case baseline for query time and the oracle the other structures are tested
//! against.

use std::mem::size_of;

use crate::{Error, RangeMin, Result, check_index, check_range};

/// Range minimum by linear scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naive<T> {
    values: Vec<T>,
}

impl<T: Copy + Ord> Naive<T> {
    /// Copy the values, no preprocessing beyond that.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyInput`] if `values` is empty.
    pub fn new(values: &[T]) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::EmptyInput);
        }
        Ok(Self {
            values: values.to_vec(),
        })
    }

    /// The current values.
    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T: Copy + Ord> RangeMin<T> for Naive<T> {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn query(&self, left: usize, right: usize) -> Result<T> {
        check_range(left, right, self.values.len())?;
        let mut min = self.values[left];
        for &v in &self.values[left + 1..=right] {
            if v < min {
                min = v;
            }
        }
        Ok(min)
    }

    fn update(&mut self, index: usize, value: T) -> Result<()> {
        check_index(index, self.values.len())?;
        self.values[index] = value;
        Ok(())
    }

    fn heap_size(&self) -> usize {
        self.values.len() * size_of::<T>()
    }
}
