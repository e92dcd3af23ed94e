use crate::analysis::AnomalySubset;
use crate::data::Signal;
use crate::error::PersistenceError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Writes anomaly subsets as CSV artifacts, one file per signal
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
    patient_id: String,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>, patient_id: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            patient_id: patient_id.into(),
        }
    }

    /// e.g. `<output_dir>/hr_anomaly_P0015.csv`
    pub fn artifact_path(&self, signal: Signal) -> PathBuf {
        self.output_dir.join(format!(
            "{}_anomaly_{}.csv",
            signal.artifact_prefix(),
            self.patient_id
        ))
    }

    /// Write a single subset directly to its final location
    pub fn persist(&self, subset: &AnomalySubset) -> Result<PathBuf, PersistenceError> {
        self.ensure_output_dir()?;
        let path = self.artifact_path(subset.signal);
        write_subset(&path, subset)?;
        info!(signal = %subset.signal, rows = subset.len(), path = %path.display(), "Anomaly artifact written");
        Ok(path)
    }

    /// Write every subset or none of them.
    ///
    /// Each subset is staged to a `.tmp` sibling first; the staged files
    /// are renamed into place only after all of them were written. Artifacts
    /// left by an earlier run are set aside as `.bak` while committing. If a
    /// rename fails, the files already moved in are removed and the earlier
    /// artifacts are put back.
    pub fn persist_all(&self, subsets: &[AnomalySubset]) -> Result<Vec<PathBuf>, PersistenceError> {
        self.ensure_output_dir()?;

        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(subsets.len());
        for subset in subsets {
            let target = self.artifact_path(subset.signal);
            let tmp = target.with_extension("csv.tmp");

            if let Err(e) = write_subset(&tmp, subset) {
                discard(&tmp);
                discard_staged(&staged);
                return Err(e);
            }
            staged.push((tmp, target));
        }

        let mut committed: Vec<Commit> = Vec::with_capacity(staged.len());
        for (i, (tmp, target)) in staged.iter().enumerate() {
            match commit(tmp, target) {
                Ok(done) => committed.push(done),
                Err(e) => {
                    rollback(&committed);
                    discard_staged(&staged[i..]);
                    return Err(e);
                }
            }
        }

        for done in &committed {
            if let Some(backup) = &done.backup {
                discard(backup);
            }
        }

        let written: Vec<PathBuf> = committed.into_iter().map(|c| c.target).collect();
        for (subset, path) in subsets.iter().zip(&written) {
            info!(signal = %subset.signal, rows = subset.len(), path = %path.display(), "Anomaly artifact written");
        }

        Ok(written)
    }

    fn ensure_output_dir(&self) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| PersistenceError::Io {
            path: self.output_dir.clone(),
            source,
        })
    }
}

/// Leading unnamed index column, original columns, then the indicator
fn write_subset(path: &Path, subset: &AnomalySubset) -> Result<(), PersistenceError> {
    let csv_err = |source: csv::Error| PersistenceError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;

    let indicator = subset.signal.indicator_column();
    let mut header: Vec<&str> = Vec::with_capacity(subset.headers.len() + 2);
    header.push("");
    header.extend(subset.headers.iter().map(String::as_str));
    header.push(&indicator);
    writer.write_record(&header).map_err(csv_err)?;

    for row in &subset.rows {
        let index = row.index.to_string();
        let mut record: Vec<&str> = Vec::with_capacity(row.values.len() + 2);
        record.push(&index);
        record.extend(row.values.iter().map(String::as_str));
        record.push("1");
        writer.write_record(&record).map_err(csv_err)?;
    }

    writer.flush().map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// A staged file moved into place, plus where the artifact it replaced went
struct Commit {
    target: PathBuf,
    backup: Option<PathBuf>,
}

fn commit(tmp: &Path, target: &Path) -> Result<Commit, PersistenceError> {
    let io_err = |source: std::io::Error| PersistenceError::Io {
        path: target.to_path_buf(),
        source,
    };

    let backup = if target.is_file() {
        let backup = target.with_extension("csv.bak");
        fs::rename(target, &backup).map_err(io_err)?;
        Some(backup)
    } else {
        None
    };

    if let Err(source) = fs::rename(tmp, target) {
        if let Some(backup) = &backup {
            restore(backup, target);
        }
        return Err(io_err(source));
    }

    Ok(Commit {
        target: target.to_path_buf(),
        backup,
    })
}

fn rollback(committed: &[Commit]) {
    for done in committed.iter().rev() {
        discard(&done.target);
        if let Some(backup) = &done.backup {
            restore(backup, &done.target);
        }
    }
}

fn restore(backup: &Path, target: &Path) {
    if let Err(e) = fs::rename(backup, target) {
        warn!(path = %target.display(), "Failed to restore previous artifact: {}", e);
    }
}

fn discard(path: &Path) {
    if path.exists() {
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), "Failed to remove staged artifact: {}", e);
        }
    }
}

fn discard_staged(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        discard(tmp);
    }
}
