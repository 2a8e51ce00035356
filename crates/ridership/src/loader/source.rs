//! Pluggable access to the raw table bytes.
//!
//! The loader only needs to know whether a source exists and how to read it,
//! so tests and embedders can swap the filesystem for something else.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::models::Result;

/// Read raw table bytes from a path-like location
pub trait TableSource: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn open<'a>(&'a self, path: &'a Path) -> Result<Box<dyn Read + 'a>>;
}

/// Reads tables straight from the local filesystem
#[derive(Clone, Copy, Debug, Default)]
pub struct FileSource;

impl TableSource for FileSource {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn open<'a>(&'a self, path: &'a Path) -> Result<Box<dyn Read + 'a>> {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}
