//! Raw measurements produced by the driver.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Build,
    Query,
    Update,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Build, Metric::Query, Metric::Update];

    pub const fn name(self) -> &'static str {
        match self {
            Metric::Build => "build",
            Metric::Query => "query",
            Metric::Update => "update",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a sample has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissingReason {
    /// The run exceeded its deadline
    TimedOut,
    /// The engine returned an error or the worker panicked
    Failed,
    /// Not attempted, because of an earlier timeout or failure
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Measured {
        seconds: f64,
        /// Only present for [`Metric::Build`]
        memory_bytes: Option<usize>,
    },
    Missing(MissingReason),
    /// The engine refuses this operation
    NotApplicable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub metric: Metric,
    pub n: usize,
    pub engine: String,
    pub trial: usize,
    pub outcome: Outcome,
}

impl Sample {
    pub fn seconds(&self) -> Option<f64> {
        match self.outcome {
            Outcome::Measured { seconds, .. } => Some(seconds),
            _ => None,
        }
    }
}
