//! Artifact packaging service
//!
//! Only knows how to turn a completed job's rows into a CSV file on
//! disk; does not care how the rows were collected.

use crate::error::{AppError, AppResult};
use crate::models::ResultRow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Packages collected rows into `<dir>/<job_id>.csv`.
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write the artifact for a job. Row order is preserved verbatim.
    pub fn write(&self, job_id: &str, rows: &[ResultRow]) -> AppResult<PathBuf> {
        let path = self.dir.join(format!("{}.csv", job_id));

        fs::create_dir_all(&self.dir)
            .map_err(|e| AppError::packaging(self.dir.display().to_string(), e))?;

        let mut content = String::with_capacity(rows.len() * 64);
        content.push_str(ResultRow::CSV_HEADER);
        content.push('\n');
        for row in rows {
            content.push_str(&row.csv_record());
            content.push('\n');
        }

        fs::write(&path, content)
            .map_err(|e| AppError::packaging(path.display().to_string(), e))?;

        info!("[job {}] artifact packaged: {}", job_id, path.display());
        Ok(path)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
