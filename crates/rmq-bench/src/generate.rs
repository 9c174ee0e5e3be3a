//! Synthetic dataset generation.
//!
//! Every distribution is written once per size as `{distribution}_{size}.json`, in a format
//! [`crate::dataset::load_dir`] reads back.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use log::info;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use rayon::prelude::*;

use crate::Result;

pub const DEFAULT_SIZES: [usize; 4] = [1_000, 10_000, 100_000, 1_000_000];

pub const DEFAULT_SEED: u64 = 42;

const MIN_VALUE: i64 = -1000;
const MAX_VALUE: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Distribution {
    /// Uniform in `[-1000, 1000)`
    RandomInt,
    /// Linear ramp from -1000 to 1000
    SortedAscending,
    /// Linear ramp from 1000 to -1000
    SortedDescending,
    /// Uniform among `1..=5`
    RepeatedValues,
}

impl Distribution {
    pub const ALL: [Distribution; 4] = [
        Distribution::RandomInt,
        Distribution::SortedAscending,
        Distribution::SortedDescending,
        Distribution::RepeatedValues,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Distribution::RandomInt => "random_int",
            Distribution::SortedAscending => "sorted_ascending",
            Distribution::SortedDescending => "sorted_descending",
            Distribution::RepeatedValues => "repeated_values",
        }
    }

    /// Generate `len` values, deterministic for a given `seed`.
    pub fn generate(self, len: usize, seed: u64) -> Vec<i64> {
        let mut rng = SmallRng::seed_from_u64(seed ^ ((self as u64) << 56) ^ len as u64);
        match self {
            Distribution::RandomInt => (0..len)
                .map(|_| rng.random_range(MIN_VALUE..MAX_VALUE))
                .collect(),
            Distribution::SortedAscending => (0..len).map(|i| ramp(i, len)).collect(),
            Distribution::SortedDescending => (0..len).rev().map(|i| ramp(i, len)).collect(),
            Distribution::RepeatedValues => (0..len).map(|_| rng.random_range(1..=5)).collect(),
        }
    }
}

/// The `i`th of `len` evenly spaced integers from `MIN_VALUE` to `MAX_VALUE`.
fn ramp(i: usize, len: usize) -> i64 {
    if len < 2 {
        return MIN_VALUE;
    }
    let span = (MAX_VALUE - MIN_VALUE) as i128;
    MIN_VALUE + (span * i as i128 / (len - 1) as i128) as i64
}

/// Write one file per distribution and size into `dir`, returns the written paths.
pub fn write_datasets(
    dir: impl AsRef<Path>,
    distributions: &[Distribution],
    sizes: &[usize],
    seed: u64,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let jobs = distributions
        .iter()
        .flat_map(|&dist| sizes.iter().map(move |&size| (dist, size)))
        .collect::<Vec<_>>();

    jobs.par_iter()
        .map(|&(dist, size)| -> Result<PathBuf> {
            let path = dir.join(format!("{}_{size}.json", dist.name()));
            let values = dist.generate(size, seed);
            let mut writer = BufWriter::new(File::create(&path)?);
            serde_json::to_writer(&mut writer, &values).map_err(std::io::Error::from)?;
            writer.flush()?;
            info!("Generated {}", path.display());
            Ok(path)
        })
        .collect()
}
