use serde_json::Value;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{ProcessingError, Result};
use crate::models::GridPoint;

/// On-disk cache of raw remote responses, one JSON file per (point, year range).
///
/// Entries are never invalidated. A file that cannot be read or parsed is a miss.
pub struct PointCache {
    dir: PathBuf,
    parameter: String,
}

impl PointCache {
    /// Open the cache, creating the directory if needed.
    pub fn open(dir: &Path, parameter: &str) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| ProcessingError::persistence(dir, e))?;

        Ok(Self {
            dir: dir.to_path_buf(),
            parameter: parameter.to_string(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, point: GridPoint, start_year: i32, end_year: i32) -> PathBuf {
        self.dir.join(format!(
            "{}_{}_{}_{}.json",
            self.parameter,
            point.key(),
            start_year,
            end_year
        ))
    }

    pub fn get(&self, point: GridPoint, start_year: i32, end_year: i32) -> Option<Value> {
        let path = self.entry_path(point, start_year, end_year);

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!("Cache miss for {} ({})", point, e);
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(payload) => {
                info!("CACHE HIT {}", point);
                Some(payload)
            }
            Err(e) => {
                warn!(
                    "Ignoring corrupt cache entry {:?} for {}: {}",
                    path, point, e
                );
                None
            }
        }
    }

    /// Store a payload, replacing any previous entry atomically.
    pub fn put(
        &self,
        point: GridPoint,
        start_year: i32,
        end_year: i32,
        payload: &Value,
    ) -> Result<()> {
        let path = self.entry_path(point, start_year, end_year);

        let temp = NamedTempFile::new_in(&self.dir)
            .map_err(|e| ProcessingError::persistence(&self.dir, e))?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer(&mut writer, payload)?;
            writer
                .flush()
                .map_err(|e| ProcessingError::persistence(&path, e))?;
        }
        temp.persist(&path)
            .map_err(|e| ProcessingError::persistence(&path, e.error))?;

        debug!("Cached response for {} at {:?}", point, path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn payload() -> Value {
        json!({"properties": {"parameter": {"T2M": {"202201": 4.5, "202202": null}}}})
    }

    #[test]
    fn test_round_trip() -> Result<()> {
        let dir = TempDir::new()?;
        let cache = PointCache::open(dir.path(), "T2M")?;
        let point = GridPoint::new(35.0, 139.0);

        assert!(cache.get(point, 2000, 2020).is_none());
        cache.put(point, 2000, 2020, &payload())?;
        assert_eq!(cache.get(point, 2000, 2020), Some(payload()));

        // Different year range is a different key
        assert!(cache.get(point, 2000, 2021).is_none());
        Ok(())
    }

    #[test]
    fn test_entry_naming() -> Result<()> {
        let dir = TempDir::new()?;
        let cache = PointCache::open(dir.path(), "T2M")?;
        let path = cache.entry_path(GridPoint::new(35.04, 139.0), 1992, 2024);

        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("T2M_35.0_139.0_1992_2024.json")
        );
        Ok(())
    }

    #[test]
    fn test_corrupt_entry_is_a_miss_and_can_be_overwritten() -> Result<()> {
        let dir = TempDir::new()?;
        let cache = PointCache::open(dir.path(), "T2M")?;
        let point = GridPoint::new(36.0, 140.0);

        fs::write(cache.entry_path(point, 2022, 2024), "{\"properties\": tru")?;
        assert!(cache.get(point, 2022, 2024).is_none());

        cache.put(point, 2022, 2024, &payload())?;
        assert_eq!(cache.get(point, 2022, 2024), Some(payload()));
        Ok(())
    }

    #[test]
    fn test_open_creates_nested_directory() -> Result<()> {
        let dir = TempDir::new()?;
        let nested = dir.path().join("cache").join("power_T2M");
        let cache = PointCache::open(&nested, "T2M")?;

        assert!(nested.is_dir());
        assert_eq!(cache.dir(), nested.as_path());
        Ok(())
    }

    #[test]
    fn test_open_fails_when_path_is_a_file() -> Result<()> {
        let dir = TempDir::new()?;
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "x")?;

        let result = PointCache::open(&blocker.join("cache"), "T2M");
        assert!(matches!(result, Err(ProcessingError::Persistence { .. })));
        Ok(())
    }
}
