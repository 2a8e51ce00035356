//! Process-lifetime memoization of loaded datasets, keyed by source path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::dataset::Dataset;
use crate::loader::source::{FileSource, TableSource};
use crate::models::Result;

/// Owns every dataset loaded so far.
///
/// Each distinct path is parsed once; later loads hand back the same
/// `Arc<Dataset>`. Failed loads are not remembered, so a file that appears
/// later can still be picked up.
pub struct DatasetCache<S: TableSource = FileSource> {
    source: S,
    entries: HashMap<PathBuf, Arc<Dataset>>,
}

impl DatasetCache<FileSource> {
    pub fn new() -> Self {
        Self::with_source(FileSource)
    }
}

impl Default for DatasetCache<FileSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TableSource> DatasetCache<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            entries: HashMap::new(),
        }
    }

    /// Return the cached dataset for `path`, loading it on first access
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<Arc<Dataset>> {
        let path = path.as_ref();
        if let Some(dataset) = self.entries.get(path) {
            log::debug!("Dataset cache hit for {}", path.display());
            return Ok(dataset.clone());
        }

        log::debug!("Dataset cache miss for {}", path.display());
        let dataset = Arc::new(super::load(&self.source, path)?);
        self.entries.insert(path.to_path_buf(), dataset.clone());
        log::debug!("{} dataset(s) cached", self.len());
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
