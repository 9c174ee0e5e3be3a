//! CSV export of aggregated records.
//!
//! Columns are `Metric,N,Algorithm,Mean,StdDev,Memory_MB`. Times are seconds in scientific
//! notation. Missing combinations keep their row with `NaN` statistics, so they can not be
//! mistaken for a zero duration; combinations an engine does not support are left out.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use log::info;

use crate::{
    Result,
    aggregate::{AggregateRecord, Summary},
};

pub const HEADER: [&str; 6] = ["Metric", "N", "Algorithm", "Mean", "StdDev", "Memory_MB"];

/// Write all records as CSV, header included.
pub fn write_csv<W: Write>(mut writer: W, records: &[AggregateRecord]) -> Result<()> {
    writeln!(writer, "{}", HEADER.join(","))?;
    for record in records {
        let (mean, std_dev, memory) = match &record.summary {
            Summary::Measured {
                mean,
                std_dev,
                memory_mb,
                ..
            } => (
                format!("{mean:.6e}"),
                format!("{std_dev:.6e}"),
                memory_mb.map(|mb| format!("{mb:.6}")).unwrap_or_default(),
            ),
            Summary::Missing => ("NaN".to_owned(), "NaN".to_owned(), String::new()),
            Summary::NotApplicable => continue,
        };
        writeln!(
            writer,
            "{},{},{},{mean},{std_dev},{memory}",
            record.metric,
            record.n,
            escape(&record.engine)
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Write all records to `path`, creating its parent directory if needed.
pub fn export_csv(path: impl AsRef<Path>, records: &[AggregateRecord]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    write_csv(BufWriter::new(File::create(path)?), records)?;
    info!("Results saved to {}", path.display());
    Ok(())
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::sample::Metric;

    fn record(metric: Metric, engine: &str, summary: Summary) -> AggregateRecord {
        AggregateRecord {
            metric,
            n: 1000,
            engine: engine.to_owned(),
            summary,
        }
    }

    fn to_string(records: &[AggregateRecord]) -> String {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, records).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_rows() {
        let records = [
            record(
                Metric::Build,
                "SegmentTree",
                Summary::Measured {
                    mean: 0.00125,
                    std_dev: 0.0,
                    count: 5,
                    memory_mb: Some(0.5),
                },
            ),
            record(
                Metric::Query,
                "SRD",
                Summary::Measured {
                    mean: 2.5e-7,
                    std_dev: 1e-8,
                    count: 2500,
                    memory_mb: None,
                },
            ),
            record(Metric::Query, "Naive", Summary::Missing),
            record(Metric::Update, "SparseTable", Summary::NotApplicable),
        ];

        let csv = to_string(&records);
        let lines = csv.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            [
                "Metric,N,Algorithm,Mean,StdDev,Memory_MB",
                "build,1000,SegmentTree,1.250000e-3,0.000000e0,0.500000",
                "query,1000,SRD,2.500000e-7,1.000000e-8,",
                "query,1000,Naive,NaN,NaN,",
            ]
        );
    }

    #[test]
    fn test_missing_differs_from_zero() {
        let zero = record(
            Metric::Update,
            "A",
            Summary::Measured {
                mean: 0.0,
                std_dev: 0.0,
                count: 1,
                memory_mb: None,
            },
        );
        let missing = record(Metric::Update, "A", Summary::Missing);
        assert_ne!(to_string(&[zero]), to_string(&[missing]));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("Naive"), "Naive");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_export_creates_parent() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("results").join("benchmark_results.csv");
        export_csv(&path, &[record(Metric::Build, "Naive", Summary::Missing)])?;
        let text = fs::read_to_string(&path)?;
        assert!(text.starts_with("Metric,N,Algorithm"));
        assert_eq!(text.lines().count(), 2);
        Ok(())
    }
}
