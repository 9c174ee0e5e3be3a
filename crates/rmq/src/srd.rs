//! Square root decomposition.
//!
//! The values are split into contiguous blocks of `ceil(sqrt(N))` elements and the minimum of
//! every block is precomputed. A query uses the precomputed minimum of every block fully inside
//! the range and scans the (at most two) partially covered blocks at the borders, so it touches
//! `O(sqrt(N))` elements. An update rewrites the value and rescans its block.

use std::mem::size_of;

use crate::{Error, RangeMin, Result, check_index, check_range};

/// Range minimum by square root decomposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Srd<T> {
    values: Vec<T>,
    block_size: usize,
    block_mins: Vec<T>,
}

impl<T: Copy + Ord> Srd<T> {
    /// Build the block minima in `O(N)`.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyInput`] if `values` is empty.
    pub fn new(values: &[T]) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::EmptyInput);
        }

        let block_size = block_size_for(values.len());
        let block_mins = values
            .chunks(block_size)
            .map(min_of)
            .collect();

        Ok(Self {
            values: values.to_vec(),
            block_size,
            block_mins,
        })
    }

    #[cfg(test)]
    fn num_blocks(&self) -> usize {
        self.block_mins.len()
    }

    fn block(&self, block: usize) -> &[T] {
        let start = block * self.block_size;
        let end = (start + self.block_size).min(self.values.len());
        &self.values[start..end]
    }
}

/// `ceil(sqrt(len))`, computed on integers to stay exact for large inputs.
fn block_size_for(len: usize) -> usize {
    let root = len.isqrt();
    if root * root == len { root } else { root + 1 }
}

/// Minimum of a non-empty slice.
fn min_of<T: Copy + Ord>(values: &[T]) -> T {
    let mut min = values[0];
    for &v in &values[1..] {
        if v < min {
            min = v;
        }
    }
    min
}

impl<T: Copy + Ord> RangeMin<T> for Srd<T> {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn query(&self, left: usize, right: usize) -> Result<T> {
        check_range(left, right, self.values.len())?;

        let start_block = left / self.block_size;
        let end_block = right / self.block_size;

        if start_block == end_block {
            return Ok(min_of(&self.values[left..=right]));
        }

        // Partially covered border blocks are scanned
        let start_block_end = (start_block + 1) * self.block_size;
        let end_block_start = end_block * self.block_size;
        let mut min = min_of(&self.values[left..start_block_end]);
        let right_min = min_of(&self.values[end_block_start..=right]);
        if right_min < min {
            min = right_min;
        }

        // Blocks in between are fully covered
        for &block_min in &self.block_mins[start_block + 1..end_block] {
            if block_min < min {
                min = block_min;
            }
        }

        Ok(min)
    }

    fn update(&mut self, index: usize, value: T) -> Result<()> {
        check_index(index, self.values.len())?;
        self.values[index] = value;
        let block = index / self.block_size;
        self.block_mins[block] = min_of(self.block(block));
        Ok(())
    }

    fn heap_size(&self) -> usize {
        (self.values.len() + self.block_mins.len()) * size_of::<T>()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use rand::Rng;

    use super::*;
    use crate::testing::*;

    #[test]
    fn test_block_size() {
        assert_eq!(block_size_for(1), 1);
        assert_eq!(block_size_for(4), 2);
        assert_eq!(block_size_for(5), 3);
        assert_eq!(block_size_for(9), 3);
        assert_eq!(block_size_for(10), 4);
        assert_eq!(block_size_for(1_000_000), 1000);

        let rmq = Srd::new(&[0; 10]).unwrap();
        assert_eq!(rmq.block_size, 4);
        assert_eq!(rmq.num_blocks(), 3);
    }

    #[test]
    fn test_heap_size() {
        // 10 values in 3 blocks of 4, 4 and 2
        let rmq = Srd::new(&[0i64; 10]).unwrap();
        assert_eq!(rmq.heap_size(), (10 + 3) * 8);

        let rmq = Srd::new(&[0u16; 16]).unwrap();
        assert_eq!(rmq.heap_size(), (16 + 4) * 2);
    }

    #[test]
    fn test_single_element() {
        let mut rmq = Srd::new(&[42]).unwrap();
        assert_eq!(rmq.query(0, 0), Ok(42));
        rmq.update(0, 7).unwrap();
        assert_eq!(rmq.query(0, 0), Ok(7));
        assert!(rmq.query(0, 1).is_err());
    }

    #[test]
    fn test_small_array() {
        let rmq = Srd::new(&[9, 6, 10, 4, 0, 8, 3, 7, 1, 2, 5]).unwrap();
        assert_eq!(rmq.query(0, 0), Ok(9));
        assert_eq!(rmq.query(0, 2), Ok(6));
        assert_eq!(rmq.query(5, 8), Ok(1));
        assert_eq!(rmq.query(5, 10), Ok(1));
        assert_eq!(rmq.query(9, 10), Ok(2));
        assert_eq!(rmq.query(0, 10), Ok(0));
    }

    #[test]
    fn test_update_raises_block_minimum() {
        // Overwriting the minimum of a block with a larger value must rescan the block
        let mut rmq = Srd::new(&[5, 1, 6, 7, 8, 9, 4, 3, 2]).unwrap();
        assert_eq!(rmq.query(0, 8), Ok(1));
        rmq.update(1, 100).unwrap();
        assert_eq!(rmq.query(0, 2), Ok(5));
        assert_eq!(rmq.query(0, 8), Ok(2));
    }

    #[test]
    fn test_randomized_against_scan() {
        let mut rng = setup_rng();
        const L: usize = 97;
        let mut values = random_values(&mut rng, L);
        let mut rmq = Srd::new(&values).unwrap();

        for _ in 0..200 {
            let i = rng.random_range(0..L);
            let v = rng.random_range(-1000..1000);
            values[i] = v;
            rmq.update(i, v).unwrap();

            let a = rng.random_range(0..L);
            let b = rng.random_range(0..L);
            let (l, r) = (a.min(b), a.max(b));
            assert_eq!(rmq.query(l, r), Ok(scan_min(&values, l, r)), "l = {l}, r = {r}");
        }
    }
}
