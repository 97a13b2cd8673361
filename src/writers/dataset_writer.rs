use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{ProcessingError, Result};
use crate::models::Dataset;

/// Writes the finished dataset as a single JSON document.
pub struct DatasetWriter {
    pretty: bool,
}

impl DatasetWriter {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Create the parent directory of `path` so a bad location fails before any work is done.
    pub fn prepare(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ProcessingError::persistence(parent, e))?;
        }
        Ok(())
    }

    /// Write `dataset` to `path`, replacing any existing file. Returns the size in bytes.
    pub fn write(&self, dataset: &Dataset, path: &Path) -> Result<u64> {
        self.prepare(path)?;

        let file = File::create(path).map_err(|e| ProcessingError::persistence(path, e))?;
        let mut writer = BufWriter::new(file);
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, dataset)?;
        } else {
            serde_json::to_writer(&mut writer, dataset)?;
        }
        writer
            .flush()
            .map_err(|e| ProcessingError::persistence(path, e))?;

        let size = fs::metadata(path)
            .map_err(|e| ProcessingError::persistence(path, e))?
            .len();
        Ok(size)
    }

    pub fn read(&self, path: &Path) -> Result<Dataset> {
        let file = File::open(path)?;
        let dataset = serde_json::from_reader(BufReader::new(file))?;
        Ok(dataset)
    }
}

impl Default for DatasetWriter {
    fn default() -> Self {
        Self::new()
    }
}
