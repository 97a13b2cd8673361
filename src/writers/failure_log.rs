use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::error::{ProcessingError, Result};
use crate::models::FailureRecord;

/// Append-only CSV log of points that produced no data: `lat,lon,reason`.
pub struct FailureLog {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl FailureLog {
    /// Create (or truncate) the log and write its header.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ProcessingError::persistence(parent, e))?;
        }

        let file = File::create(path).map_err(|e| ProcessingError::persistence(path, e))?;
        let mut log = Self {
            path: path.to_path_buf(),
            writer: csv::Writer::from_writer(file),
        };
        log.write_row(&["lat", "lon", "reason"])?;

        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record and flush, so an interrupted run keeps every row written so far.
    pub fn append(&mut self, record: &FailureRecord) -> Result<()> {
        let lat = format!("{:.1}", record.point.lat);
        let lon = format!("{:.1}", record.point.lon);
        self.write_row(&[lat.as_str(), lon.as_str(), record.reason.as_str()])
    }

    fn write_row(&mut self, row: &[&str]) -> Result<()> {
        self.writer
            .write_record(row)
            .map_err(|source| ProcessingError::FailureLog {
                path: self.path.clone(),
                source,
            })?;
        self.writer
            .flush()
            .map_err(|e| ProcessingError::persistence(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GridPoint;
    use tempfile::TempDir;

    #[test]
    fn test_header_and_rows() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("logs").join("failures.csv");

        let mut log = FailureLog::create(&path)?;
        log.append(&FailureRecord {
            point: GridPoint::new(35.0, 139.0),
            reason: "no_months".to_string(),
        })?;
        log.append(&FailureRecord {
            point: GridPoint::new(36.0, 140.5),
            reason: "error:Timeout".to_string(),
        })?;

        let contents = fs::read_to_string(&path)?;
        assert_eq!(
            contents,
            "lat,lon,reason\n35.0,139.0,no_months\n36.0,140.5,error:Timeout\n"
        );
        Ok(())
    }

    #[test]
    fn test_create_truncates_previous_log() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("failures.csv");
        fs::write(&path, "stale,rows,here\n1,2,3\n")?;

        let log = FailureLog::create(&path)?;
        assert_eq!(log.path(), path.as_path());
        assert_eq!(fs::read_to_string(&path)?, "lat,lon,reason\n");
        Ok(())
    }
}
