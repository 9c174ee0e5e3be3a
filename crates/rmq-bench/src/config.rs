//! Explicit configuration handed to the [`Driver`](crate::driver::Driver) at construction.

use std::{path::PathBuf, time::Duration};

use rmq::engine::EngineKind;

use crate::{Error, Result};

/// Where the build memory sample comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MemorySource {
    /// [`rmq::RangeMin::heap_size`] of the instance right after build
    #[default]
    Footprint,
    /// Peak bytes allocated during build, needs [`TrackingAllocator`](crate::alloc::TrackingAllocator)
    /// as global allocator and falls back to the footprint without it
    Peak,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// Trials per dataset and engine
    pub num_runs: usize,
    /// Random queries per trial
    pub num_queries: usize,
    /// Random updates per trial
    pub num_updates: usize,
    pub dataset_dir: PathBuf,
    pub export_csv: bool,
    pub output: PathBuf,
    /// Deadline for a single build, query batch or update batch
    pub timeout: Duration,
    pub engines: Vec<EngineKind>,
    /// Seed for query and update generation, OS entropy if absent
    pub seed: Option<u64>,
    pub memory: MemorySource,
    /// After a timeout, also skip the same engine and metric for all datasets at least as large
    pub skip_larger_after_timeout: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            num_runs: 5,
            num_queries: 500,
            num_updates: 500,
            dataset_dir: PathBuf::from("datasets"),
            export_csv: true,
            output: PathBuf::from("results/benchmark_results.csv"),
            timeout: Duration::from_secs(120),
            engines: EngineKind::ALL.to_vec(),
            seed: None,
            memory: MemorySource::default(),
            skip_larger_after_timeout: true,
        }
    }
}

impl BenchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_runs == 0 {
            return Err(Error::Config("at least one run is required".into()));
        }
        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be positive".into()));
        }
        if self.engines.is_empty() {
            return Err(Error::Config("no engine selected".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BenchConfig::default();
        assert_eq!(config.num_runs, 5);
        assert_eq!(config.num_queries, 500);
        assert_eq!(config.num_updates, 500);
        assert!(config.export_csv);
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.engines.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let config = BenchConfig {
            num_runs: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = BenchConfig {
            timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = BenchConfig {
            engines: vec![],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
