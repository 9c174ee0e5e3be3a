//! Implementation of Sparse Table algorithm for RMQ

use std::mem::size_of;

use crate::{Error, RangeMin, Result, check_range};

/// Sparse table for RMQ
///
/// Level `k` stores the minimum of every window of `2^k` values, so level `0` is the input itself.
/// A query is answered by two overlapping windows of the largest power of two fitting into the
/// range. The table is static: changing a single value would invalidate `O(N)` windows across all
/// levels, so [`RangeMin::update`] always fails and callers rebuild instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseTable<T> {
    len: usize,
    tables: Vec<Vec<T>>,
}

impl<T: Copy + Ord> SparseTable<T> {
    /// Create a new sparse table with given values in `O(N log N)` time and space.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyInput`] if `values` is empty.
    pub fn new(values: &[T]) -> Result<Self> {
        let len = values.len();
        if len == 0 {
            return Err(Error::EmptyInput);
        }

        let n_tables = len.ilog2() as usize + 1;
        let mut tables = Vec::with_capacity(n_tables);
        tables.push(values.to_vec());

        // Calculate all higher powers of 2 from the level below
        for k in 1..n_tables {
            let half = 1 << (k - 1);
            let mins_k = &tables[k - 1];
            let len_k = len - (1 << k) + 1;
            let mut mins_kp1 = Vec::with_capacity(len_k);

            // Give compiler a hint that i and i + half are within bounds
            assert!(len_k + half <= mins_k.len());
            for i in 0..len_k {
                mins_kp1.push(std::cmp::min(mins_k[i], mins_k[i + half]));
            }
            tables.push(mins_kp1);
        }

        Self::check_shape(len, &tables);
        Ok(Self { len, tables })
    }

    /// Number of levels, `floor(log2(N)) + 1`.
    #[cfg(test)]
    fn levels(&self) -> usize {
        self.tables.len()
    }

    fn check_shape(len: usize, tables: &[Vec<T>]) {
        debug_assert!(
            tables
                .iter()
                .enumerate()
                .all(|(k, level)| level.len() == len - (1 << k) + 1),
            "Level `k` must hold `N - 2^k + 1` windows"
        );
    }
}

impl<T: Copy + Ord> RangeMin<T> for SparseTable<T> {
    fn len(&self) -> usize {
        self.len
    }

    fn query(&self, left: usize, right: usize) -> Result<T> {
        check_range(left, right, self.len)?;

        let k = (right - left + 1).ilog2() as usize;
        let level = &self.tables[k];

        // If length is a power of 2 both windows are the same one
        let left_min = level[left];
        let right_min = level[right + 1 - (1 << k)];
        Ok(std::cmp::min(left_min, right_min))
    }

    fn update(&mut self, _: usize, _: T) -> Result<()> {
        Err(Error::Unsupported {
            engine: "SparseTable",
        })
    }

    fn supports_update(&self) -> bool {
        false
    }

    fn heap_size(&self) -> usize {
        self.tables.iter().map(Vec::len).sum::<usize>() * size_of::<T>()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::testing::*;

    #[test]
    fn test_single_element() {
        let values = vec![42];
        let rmq = SparseTable::new(&values).unwrap();
        assert_eq!(rmq.levels(), 1);
        assert_eq!(rmq.query(0, 0), Ok(42));
    }

    #[test]
    fn test_window_levels() {
        // 13 values: levels of 13, 12, 10 and 6 windows
        let values = [12, -3, 8, 8, 0, 15, -7, 2, 2, 11, -3, 6, 9];
        let rmq = SparseTable::new(&values).unwrap();
        assert_eq!(rmq.levels(), 4);
        let widths = rmq.tables.iter().map(Vec::len).collect::<Vec<_>>();
        assert_eq!(widths, [13, 12, 10, 6]);

        // Exact windows of every level
        assert_eq!(rmq.query(3, 3), Ok(8));
        assert_eq!(rmq.query(2, 3), Ok(8));
        assert_eq!(rmq.query(7, 10), Ok(-3));
        assert_eq!(rmq.query(4, 11), Ok(-7));
        // Overlapping windows
        assert_eq!(rmq.query(0, 2), Ok(-3));
        assert_eq!(rmq.query(7, 9), Ok(2));
        assert_eq!(rmq.query(8, 12), Ok(-3));
        assert_eq!(rmq.query(0, 12), Ok(-7));
    }

    #[test]
    fn test_monotonic_inputs() {
        let rising = (0..33).map(|i| i * 3 - 40).collect::<Vec<i64>>();
        let falling = rising.iter().rev().copied().collect::<Vec<_>>();
        let up = SparseTable::new(&rising).unwrap();
        let down = SparseTable::new(&falling).unwrap();
        assert_eq!(up.levels(), 6);

        for (l, r) in [(0, 32), (5, 5), (10, 17), (16, 31), (31, 32)] {
            assert_eq!(up.query(l, r), Ok(rising[l]), "l = {l}, r = {r}");
            assert_eq!(down.query(l, r), Ok(falling[r]), "l = {l}, r = {r}");
        }
    }

    #[test]
    fn test_update_is_unsupported() {
        let values = vec![5, 2, 4, 1, 3];
        let mut rmq = SparseTable::new(&values).unwrap();
        let before = rmq.clone();

        assert!(!rmq.supports_update());
        for (i, v) in [(3, 10), (0, -5), (100, 0)] {
            assert_eq!(
                rmq.update(i, v),
                Err(Error::Unsupported {
                    engine: "SparseTable"
                })
            );
        }
        assert_eq!(rmq, before);
        assert_eq!(rmq.query(1, 3), Ok(1));
    }

    #[test]
    fn test_all_ranges() {
        let mut rng = setup_rng();
        // Around and at powers of two
        for len in [2, 7, 31, 32, 33, 100, 128] {
            let values = random_values(&mut rng, len);
            let rmq = SparseTable::new(&values).unwrap();
            for l in 0..len {
                for r in l..len {
                    assert_eq!(
                        rmq.query(l, r),
                        Ok(scan_min(&values, l, r)),
                        "len = {len}, l = {l}, r = {r}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_heap_size() {
        // 5 + 4 + 2 windows
        let rmq = SparseTable::new(&[0u32; 5]).unwrap();
        assert_eq!(rmq.heap_size(), 11 * 4);
    }
}
