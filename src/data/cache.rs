use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::LoadError;
use super::loader::load_file;
use super::model::ContractTable;

/// Memoises loaded base tables by `(path, sheet)`.
///
/// Tables are shared read-only through `Arc`; a second request for the same
/// source never touches the filesystem.
#[derive(Debug, Default)]
pub struct DatasetCache {
    tables: HashMap<(PathBuf, String), Arc<ContractTable>>,
}

impl DatasetCache {
    /// Return the cached table for this source, loading it on first use.
    pub fn get_or_load(&mut self, path: &Path, sheet: &str) -> Result<Arc<ContractTable>, LoadError> {
        let key = (path.to_path_buf(), sheet.to_string());
        if let Some(table) = self.tables.get(&key) {
            log::debug!("Cache hit for {} [{sheet}]", path.display());
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(load_file(path, sheet)?);
        self.tables.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Number of cached sources.
    pub fn len(&self) -> usize {
        self.tables.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::tests::scratch_dir;

    #[test]
    fn second_load_is_served_from_cache() {
        let dir = scratch_dir("cache_hit");
        let path = dir.join("contracts.csv");
        std::fs::write(&path, "Provider,OrgType,Category,Contract Value\nA,X,Y,10\n").unwrap();

        let mut cache = DatasetCache::default();
        let first = cache.get_or_load(&path, "merged_data").unwrap();

        // Removing the file proves the second call does not re-read it.
        std::fs::remove_file(&path).unwrap();
        let second = cache.get_or_load(&path, "merged_data").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let dir = scratch_dir("cache_miss");
        let path = dir.join("absent.csv");
        let mut cache = DatasetCache::default();
        assert!(matches!(
            cache.get_or_load(&path, "merged_data"),
            Err(LoadError::NotFound(_))
        ));
        assert_eq!(cache.len(), 0);
    }
}
