//! Tagged union over the four structures, for callers that pick one at runtime.

use std::{fmt, str::FromStr};

use crate::{
    RangeMin, Result, naive::Naive, segment_tree::SegmentTree, sparse_table::SparseTable,
    srd::Srd,
};

/// Which structure to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EngineKind {
    Naive,
    Srd,
    SegmentTree,
    SparseTable,
}

impl EngineKind {
    pub const ALL: [EngineKind; 4] = [
        EngineKind::Naive,
        EngineKind::Srd,
        EngineKind::SegmentTree,
        EngineKind::SparseTable,
    ];

    /// Name used in reports.
    pub const fn name(self) -> &'static str {
        match self {
            EngineKind::Naive => "Naive",
            EngineKind::Srd => "SRD",
            EngineKind::SegmentTree => "SegmentTree",
            EngineKind::SparseTable => "SparseTable",
        }
    }

    /// Build a structure of this kind over `values`.
    pub fn build<T: Copy + Ord>(self, values: &[T]) -> Result<Engine<T>> {
        Ok(match self {
            EngineKind::Naive => Engine::Naive(Naive::new(values)?),
            EngineKind::Srd => Engine::Srd(Srd::new(values)?),
            EngineKind::SegmentTree => Engine::SegmentTree(SegmentTree::new(values)?),
            EngineKind::SparseTable => Engine::SparseTable(SparseTable::new(values)?),
        })
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown engine `{0}`, expected one of naive, srd, segment-tree, sparse-table")]
pub struct ParseEngineKindError(String);

impl FromStr for EngineKind {
    type Err = ParseEngineKindError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "naive" => Ok(EngineKind::Naive),
            "srd" | "sqrt" => Ok(EngineKind::Srd),
            "segmenttree" | "segtree" => Ok(EngineKind::SegmentTree),
            "sparsetable" | "sparse" => Ok(EngineKind::SparseTable),
            _ => Err(ParseEngineKindError(s.to_owned())),
        }
    }
}

/// One of the four structures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Engine<T> {
    Naive(Naive<T>),
    Srd(Srd<T>),
    SegmentTree(SegmentTree<T>),
    SparseTable(SparseTable<T>),
}

impl<T> Engine<T> {
    pub fn kind(&self) -> EngineKind {
        match self {
            Engine::Naive(_) => EngineKind::Naive,
            Engine::Srd(_) => EngineKind::Srd,
            Engine::SegmentTree(_) => EngineKind::SegmentTree,
            Engine::SparseTable(_) => EngineKind::SparseTable,
        }
    }
}

macro_rules! dispatch {
    ($engine:expr, $inner:ident => $body:expr) => {
        match $engine {
            Engine::Naive($inner) => $body,
            Engine::Srd($inner) => $body,
            Engine::SegmentTree($inner) => $body,
            Engine::SparseTable($inner) => $body,
        }
    };
}

impl<T: Copy + Ord> RangeMin<T> for Engine<T> {
    fn len(&self) -> usize {
        dispatch!(self, e => e.len())
    }

    fn query(&self, left: usize, right: usize) -> Result<T> {
        dispatch!(self, e => e.query(left, right))
    }

    fn update(&mut self, index: usize, value: T) -> Result<()> {
        dispatch!(self, e => e.update(index, value))
    }

    fn supports_update(&self) -> bool {
        dispatch!(self, e => e.supports_update())
    }

    fn heap_size(&self) -> usize {
        dispatch!(self, e => e.heap_size())
    }
}
