//! Reduction of raw samples to one record per (metric, N, engine).

use std::collections::BTreeMap;

use crate::sample::{Metric, Outcome, Sample};

const BYTES_PER_MB: f64 = (1 << 20) as f64;

#[derive(Debug, Clone, PartialEq)]
pub enum Summary {
    Measured {
        mean: f64,
        std_dev: f64,
        /// Number of successful samples
        count: usize,
        /// Mean build memory, only for [`Metric::Build`]
        memory_mb: Option<f64>,
    },
    /// Every attempt timed out, failed or was skipped
    Missing,
    NotApplicable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRecord {
    pub metric: Metric,
    pub n: usize,
    pub engine: String,
    pub summary: Summary,
}

#[derive(Debug, Default)]
struct Accumulator {
    seconds: Vec<f64>,
    memory: Vec<f64>,
    missing: usize,
}

/// Arithmetic mean, `None` for no values.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (with Bessel's correction), `0` for a single value.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    if values.len() == 1 {
        return Some(0.0);
    }
    let squares = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    Some((squares / (values.len() - 1) as f64).sqrt())
}

/// Group samples by (metric, N, engine) and summarize every group.
///
/// Only measured samples enter the statistics. A group without any measured sample is
/// [`Summary::Missing`] if an attempt was missing and [`Summary::NotApplicable`] otherwise.
/// Records are ordered by metric, then N, then engine name.
pub fn aggregate(samples: &[Sample]) -> Vec<AggregateRecord> {
    let mut groups = BTreeMap::<(Metric, usize, &str), Accumulator>::new();
    for sample in samples {
        let acc = groups
            .entry((sample.metric, sample.n, sample.engine.as_str()))
            .or_default();
        match sample.outcome {
            Outcome::Measured {
                seconds,
                memory_bytes,
            } => {
                acc.seconds.push(seconds);
                if let Some(bytes) = memory_bytes {
                    acc.memory.push(bytes as f64 / BYTES_PER_MB);
                }
            }
            Outcome::Missing(_) => acc.missing += 1,
            Outcome::NotApplicable => {}
        }
    }

    groups
        .into_iter()
        .map(|((metric, n, engine), acc)| {
            let summary = match (mean(&acc.seconds), sample_std_dev(&acc.seconds)) {
                (Some(mean), Some(std_dev)) => Summary::Measured {
                    mean,
                    std_dev,
                    count: acc.seconds.len(),
                    memory_mb: match metric {
                        Metric::Build => self::mean(&acc.memory),
                        _ => None,
                    },
                },
                _ if acc.missing > 0 => Summary::Missing,
                _ => Summary::NotApplicable,
            };
            AggregateRecord {
                metric,
                n,
                engine: engine.to_owned(),
                summary,
            }
        })
        .collect()
}

/// One line per engine and dataset, in the units people read: seconds for builds and
/// microseconds for single queries and updates.
pub fn summary_line(engine: &str, records: &[AggregateRecord]) -> String {
    let find = |metric| {
        records
            .iter()
            .find(|r| r.metric == metric && r.engine == engine)
            .map(|r| &r.summary)
    };

    let (build, memory) = match find(Metric::Build) {
        Some(Summary::Measured {
            mean, memory_mb, ..
        }) => (
            format!("{mean:9.6}"),
            memory_mb.map_or_else(|| "N/A".to_owned(), |mb| format!("{mb:7.2}")),
        ),
        _ => ("N/A".to_owned(), "N/A".to_owned()),
    };
    let micros = |metric| match find(metric) {
        Some(Summary::Measured { mean, .. }) => format!("{:9.2}", mean * 1e6),
        _ => "N/A".to_owned(),
    };

    format!(
        "{engine:<15} | Build: {build} s | Mem: {memory} MB | Query: {} µs | Update: {} µs",
        micros(Metric::Query),
        micros(Metric::Update)
    )
}
