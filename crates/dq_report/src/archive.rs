//! Report archival.

use dq_core::ArchivalError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the archived text report.
pub const TEXT_REPORT_FILE: &str = "dq_report.txt";

/// File name of the archived JSON verdict.
pub const JSON_REPORT_FILE: &str = "dq_verdict.json";

/// Persists rendered reports.
pub trait ArchiveSink {
    /// Stores the text and JSON renderings, returning where they went.
    fn archive(&self, text: &str, json: &str) -> Result<Vec<PathBuf>, ArchivalError>;
}

/// Writes reports into a directory, creating it if needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileArchive {
    dir: PathBuf,
}

impl FileArchive {
    /// Creates an archive rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, name: &str, content: &str) -> Result<PathBuf, ArchivalError> {
        let path = self.dir.join(name);
        fs::write(&path, content).map_err(|source| ArchivalError {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

impl ArchiveSink for FileArchive {
    fn archive(&self, text: &str, json: &str) -> Result<Vec<PathBuf>, ArchivalError> {
        fs::create_dir_all(&self.dir).map_err(|source| ArchivalError {
            path: self.dir.clone(),
            source,
        })?;

        let written = vec![
            self.write(TEXT_REPORT_FILE, text)?,
            self.write(JSON_REPORT_FILE, json)?,
        ];
        info!("Report archived to {}", self.dir.display());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_archive_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FileArchive::new(dir.path().join("reports/nightly"));

        let written = archive.archive("report", "{}").unwrap();

        assert_eq!(
            written,
            vec![
                dir.path().join("reports/nightly").join(TEXT_REPORT_FILE),
                dir.path().join("reports/nightly").join(JSON_REPORT_FILE),
            ]
        );
        assert_eq!(fs::read_to_string(&written[0]).unwrap(), "report");
        assert_eq!(fs::read_to_string(&written[1]).unwrap(), "{}");
    }

    #[test]
    fn test_archive_into_a_file_fails() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let archive = FileArchive::new(file.path());

        let err = archive.archive("report", "{}").unwrap_err();
        assert_eq!(err.path, file.path());
    }
}
