//! Sources of program code.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

/// Supplies the raw source of a program given its location.
pub trait Loader {
    fn load(&self, location: &str) -> io::Result<Vec<u8>>;
}

impl<T: Loader + ?Sized> Loader for &T {
    fn load(&self, location: &str) -> io::Result<Vec<u8>> {
        (**self).load(location)
    }
}

/// Loads programs from the filesystem.
///
/// Relative locations are read relative to `base_dir`.
#[derive(Clone, Debug)]
pub struct FsLoader {
    base_dir: PathBuf,
}

impl FsLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn path(&self, location: &str) -> PathBuf {
        let path = Path::new(location);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl Loader for FsLoader {
    fn load(&self, location: &str) -> io::Result<Vec<u8>> {
        let path = self.path(location);
        tracing::trace!("loading {}", path.display());
        fs::read(path)
    }
}

/// Serves programs from memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryLoader {
    sources: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, location: impl Into<String>, code: impl Into<Vec<u8>>) {
        self.sources.insert(location.into(), code.into());
    }

    pub fn with(mut self, location: impl Into<String>, code: impl Into<Vec<u8>>) -> Self {
        self.insert(location, code);
        self
    }
}

impl Loader for MemoryLoader {
    fn load(&self, location: &str) -> io::Result<Vec<u8>> {
        self.sources.get(location).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no source for `{location}`"),
            )
        })
    }
}
