//! Reading datasets from a directory.
//!
//! A dataset file is either a JSON array of integers (`*.json`) or whitespace separated integers
//! (`*.txt`). Its size is the length of the sequence and its label the file stem.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, info};
use rayon::prelude::*;

use crate::{Error, Result};

/// An immutable sequence of values, shared by every instance built from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    label: String,
    values: Arc<[i64]>,
}

impl Dataset {
    pub fn new(label: impl Into<String>, values: impl Into<Arc<[i64]>>) -> Self {
        Self {
            label: label.into(),
            values: values.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn values(&self) -> &Arc<[i64]> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Text,
}

impl Format {
    fn of(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(Format::Json),
            "txt" => Some(Format::Text),
            _ => None,
        }
    }
}

/// Load every dataset file in `dir`, sorted by size and then label.
///
/// Files with other extensions are ignored. Files are parsed in parallel.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<Vec<Dataset>> {
    let dir = dir.as_ref();
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && Format::of(&path).is_some() {
            paths.push(path);
        } else {
            debug!("Ignoring {}", path.display());
        }
    }

    let mut datasets = paths
        .par_iter()
        .map(load_file)
        .collect::<Result<Vec<_>>>()?;
    datasets.sort_by(|a, b| (a.len(), &a.label).cmp(&(b.len(), &b.label)));

    info!("Loaded {} datasets from {}", datasets.len(), dir.display());
    Ok(datasets)
}

/// Load a single dataset file.
pub fn load_file(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let format = Format::of(path).ok_or_else(|| malformed(path, "unknown file extension"))?;
    let text = fs::read_to_string(path)?;
    let values = match format {
        Format::Json => serde_json::from_str::<Vec<i64>>(&text)
            .map_err(|e| malformed(path, e.to_string()))?,
        Format::Text => parse_text(path, &text)?,
    };

    let label = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    debug!("Loaded {label} with {} values", values.len());
    Ok(Dataset::new(label, values))
}

fn parse_text(path: &Path, text: &str) -> Result<Vec<i64>> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse()
                .map_err(|_| malformed(path, format!("`{token}` is not an integer")))
        })
        .collect()
}

fn malformed(path: &Path, reason: impl Into<String>) -> Error {
    Error::Dataset {
        path: PathBuf::from(path),
        reason: reason.into(),
    }
}
