use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use log::{debug, info};

use super::clean::clean;
use super::loader::{DataLoadError, load_file};
use super::model::Dataset;

#[derive(Debug)]
struct CacheEntry {
    modified: SystemTime,
    dataset: Arc<Dataset>,
}

/// Load-once store of cleaned datasets, keyed by canonical path.
///
/// An entry is reused while the file's modification time is unchanged.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, CacheEntry>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cleaned dataset for `path`, loading it on first use or
    /// after the file changed on disk.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Dataset>, DataLoadError> {
        let io_error = |source: std::io::Error| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let key = path.canonicalize().map_err(io_error)?;
        let modified = std::fs::metadata(&key)
            .and_then(|m| m.modified())
            .map_err(io_error)?;

        if let Some(entry) = self.entries.get(&key) {
            if entry.modified == modified {
                debug!("cache hit for {}", key.display());
                return Ok(Arc::clone(&entry.dataset));
            }
            info!("{} changed on disk, reloading", key.display());
        }

        let dataset = Arc::new(clean(load_file(path)?));
        self.entries.insert(
            key,
            CacheEntry {
                modified,
                dataset: Arc::clone(&dataset),
            },
        );
        Ok(dataset)
    }

    /// Number of cached files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;
    use std::time::{Duration, UNIX_EPOCH};

    use tempfile::TempDir;

    use super::*;

    const HEADER: &str = "title,abstract,journal,publish_time,source\n";

    fn write_with_mtime(path: &Path, body: &str, secs: u64) {
        let mut file = File::create(path).unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file.set_modified(UNIX_EPOCH + Duration::from_secs(secs)).unwrap();
    }

    #[test]
    fn second_load_is_served_from_cache() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.csv");
        write_with_mtime(&path, "A,x,J,2020,PMC\n", 1_000);

        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(&path).unwrap();
        let second = cache.get_or_load(&path).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn changed_mtime_invalidates_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.csv");
        write_with_mtime(&path, "A,x,J,2020,PMC\n", 1_000);

        let mut cache = DatasetCache::new();
        let before = cache.get_or_load(&path).unwrap();
        assert_eq!(before.len(), 1);

        write_with_mtime(&path, "A,x,J,2020,PMC\nB,y,K,2021,WHO\n", 2_000);
        let after = cache.get_or_load(&path).unwrap();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.len(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = TempDir::new().unwrap();
        let mut cache = DatasetCache::new();
        let err = cache.get_or_load(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::Io { .. }));
        assert!(cache.is_empty());
    }
}
