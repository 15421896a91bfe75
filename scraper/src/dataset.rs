use std::collections::HashSet;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::dates::NormalizedRecord;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Created { path: PathBuf, rows: usize },
    Updated { path: PathBuf, added: i64 },
}

impl MergeOutcome {
    pub fn path(&self) -> &Path {
        match self {
            MergeOutcome::Created { path, .. } | MergeOutcome::Updated { path, .. } => path,
        }
    }
}

impl fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeOutcome::Created { path, .. } => write!(f, "{} was created!", path.display()),
            MergeOutcome::Updated { path, added } => {
                write!(f, "{} NEW POSTS were added to the {}", added, path.display())
            }
        }
    }
}

/// `<out_dir>/<ticker>.csv`, ticker lowercased.
pub fn dataset_path(out_dir: &Path, ticker: &str) -> PathBuf {
    out_dir.join(format!("{}.csv", ticker.trim().to_lowercase()))
}

/// Writes `rows` to the dataset at `path`, creating it or merging into it.
///
/// Merging appends the new rows, reloads the whole file and drops exact
/// duplicate rows, keeping the first occurrence. The reported count is the
/// change in row count, so rows already on disk are not counted again.
pub fn merge_into(path: &Path, rows: &[NormalizedRecord]) -> Result<MergeOutcome, DatasetError> {
    if !has_data(path)? {
        write_rows(path, rows)?;
        return Ok(MergeOutcome::Created {
            path: path.to_path_buf(),
            rows: rows.len(),
        });
    }

    let old_total = read_rows(path)?.len();
    append_rows(path, rows)?;

    let combined = read_rows(path)?;
    let deduped = dedup_rows(combined);
    write_rows(path, &deduped)?;

    let added = deduped.len() as i64 - old_total as i64;
    debug!(
        "{}: {} rows before, {} after merge",
        path.display(),
        old_total,
        deduped.len()
    );
    Ok(MergeOutcome::Updated {
        path: path.to_path_buf(),
        added,
    })
}

/// Drops rows equal to an earlier row.
pub fn dedup_rows(rows: Vec<NormalizedRecord>) -> Vec<NormalizedRecord> {
    let mut seen = HashSet::with_capacity(rows.len());
    rows.into_iter()
        .filter(|row| seen.insert(row.clone()))
        .collect()
}

pub fn read_rows(path: &Path) -> Result<Vec<NormalizedRecord>, DatasetError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| csv_err(path, source))?;
    reader
        .deserialize()
        .collect::<Result<Vec<NormalizedRecord>, _>>()
        .map_err(|source| csv_err(path, source))
}

/// Replaces the file at `path` with a header plus `rows`.
///
/// Rows go to a temporary file next to the target first, so a failed write
/// leaves the old dataset in place.
pub fn write_rows(path: &Path, rows: &[NormalizedRecord]) -> Result<(), DatasetError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|source| io_err(dir, source))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|source| io_err(dir, source))?;
    {
        let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
        for row in rows {
            writer.serialize(row).map_err(|source| csv_err(path, source))?;
        }
        if rows.is_empty() {
            writer
                .write_record(["posts", "date", "time", "ticker"])
                .map_err(|source| csv_err(path, source))?;
        }
        writer.flush().map_err(|source| io_err(path, source))?;
    }

    tmp.persist(path).map_err(|source| DatasetError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn append_rows(path: &Path, rows: &[NormalizedRecord]) -> Result<(), DatasetError> {
    let file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|source| io_err(path, source))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    for row in rows {
        writer.serialize(row).map_err(|source| csv_err(path, source))?;
    }
    writer.flush().map_err(|source| io_err(path, source))
}

fn has_data(path: &Path) -> Result<bool, DatasetError> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.is_file() && meta.len() > 0),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(io_err(path, source)),
    }
}

fn io_err(path: &Path, source: std::io::Error) -> DatasetError {
    DatasetError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn csv_err(path: &Path, source: csv::Error) -> DatasetError {
    DatasetError::Csv {
        path: path.to_path_buf(),
        source,
    }
}
