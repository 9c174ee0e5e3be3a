//! Array backed segment tree.
//!
//! The tree is stored in a single vector of `2N` nodes. The leaves live at `N..2N` in input order
//! and the parent of node `i` is `i / 2`, so node `i` stores the minimum of its children `2i` and
//! `2i + 1`. Node `0` is unused. This layout works for any `N`, not only powers of two: a node may
//! then cover a range that wraps across the leaf level, but such nodes are never reached by a
//! query, which only climbs from the two range borders.

use std::mem::size_of;

use crate::{Error, RangeMin, Result, check_index, check_range};

/// Range minimum by segment tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentTree<T> {
    len: usize,
    nodes: Vec<T>,
}

impl<T: Copy + Ord> SegmentTree<T> {
    /// Build the tree bottom up in `O(N)`.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyInput`] if `values` is empty.
    pub fn new(values: &[T]) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::EmptyInput);
        }

        let len = values.len();
        // Internal nodes are overwritten below, node 0 keeps its placeholder
        let mut nodes = Vec::with_capacity(2 * len);
        nodes.resize(len, values[0]);
        nodes.extend_from_slice(values);

        for i in (1..len).rev() {
            nodes[i] = std::cmp::min(nodes[2 * i], nodes[2 * i + 1]);
        }

        Ok(Self { len, nodes })
    }

    /// The minimum of all values, stored at the root.
    #[cfg(test)]
    fn min(&self) -> T {
        self.nodes[1]
    }
}

impl<T: Copy + Ord> RangeMin<T> for SegmentTree<T> {
    fn len(&self) -> usize {
        self.len
    }

    fn query(&self, left: usize, right: usize) -> Result<T> {
        check_range(left, right, self.len)?;

        // Half open range over the leaves
        let mut lo = left + self.len;
        let mut hi = right + self.len + 1;
        let mut min = self.nodes[lo];

        while lo < hi {
            if lo & 1 == 1 {
                min = std::cmp::min(min, self.nodes[lo]);
                lo += 1;
            }
            if hi & 1 == 1 {
                hi -= 1;
                min = std::cmp::min(min, self.nodes[hi]);
            }
            lo >>= 1;
            hi >>= 1;
        }

        Ok(min)
    }

    fn update(&mut self, index: usize, value: T) -> Result<()> {
        check_index(index, self.len)?;

        let mut node = index + self.len;
        self.nodes[node] = value;
        // Leaf to root cascade
        while node > 1 {
            node >>= 1;
            self.nodes[node] = std::cmp::min(self.nodes[2 * node], self.nodes[2 * node + 1]);
        }

        Ok(())
    }

    fn heap_size(&self) -> usize {
        self.nodes.len() * size_of::<T>()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use rand::Rng;

    use super::*;
    use crate::testing::*;

    #[test]
    fn test_single_element() {
        let mut rmq = SegmentTree::new(&[42]).unwrap();
        assert_eq!(rmq.query(0, 0), Ok(42));
        rmq.update(0, -1).unwrap();
        assert_eq!(rmq.query(0, 0), Ok(-1));
        assert_eq!(rmq.min(), -1);
    }

    #[test]
    fn test_scenario() {
        let mut rmq = SegmentTree::new(&[5, 2, 4, 1, 3]).unwrap();
        assert_eq!(rmq.query(1, 3), Ok(1));
        rmq.update(3, 10).unwrap();
        assert_eq!(rmq.query(1, 3), Ok(2));
        assert_eq!(rmq.query(0, 4), Ok(2));
        assert_eq!(rmq.min(), 2);
    }

    #[test]
    fn test_all_ranges_of_odd_sizes() {
        let mut rng = setup_rng();
        for len in [1, 2, 3, 5, 7, 13, 31, 33] {
            let values = random_values(&mut rng, len);
            let rmq = SegmentTree::new(&values).unwrap();
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
    fn test_randomized_updates() {
        let mut rng = setup_rng();
        const L: usize = 100;
        let mut values = random_values(&mut rng, L);
        let mut rmq = SegmentTree::new(&values).unwrap();

        for _ in 0..500 {
            let i = rng.random_range(0..L);
            let v = rng.random_range(-1000..1000);
            values[i] = v;
            rmq.update(i, v).unwrap();

            let l = rng.random_range(0..L);
            let r = rng.random_range(l..L);
            assert_eq!(rmq.query(l, r), Ok(scan_min(&values, l, r)));
        }
        assert_eq!(rmq.min(), *values.iter().min().unwrap());
    }

    #[test]
    fn test_heap_size() {
        let rmq = SegmentTree::new(&[1u64; 10]).unwrap();
        assert_eq!(rmq.heap_size(), 20 * 8);
    }
}
