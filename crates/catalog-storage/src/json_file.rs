//! Flat-file backend storing the catalog as a JSON array.
//!
//! Writes are crash-consistent: the new collection goes to a sibling
//! `<name>.tmp` file which is flushed to disk and then renamed over the
//! target, after which the containing directory is synced so the rename
//! itself survives a crash. Readers (and a restarted process) see either
//! the previous file or the new one in full.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use catalog_core::Product;

use crate::error::StorageError;
use crate::traits::ProductStore;

/// JSON file persistence for the product collection.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "products.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    #[cfg(unix)]
    fn sync_parent(&self) -> Result<(), StorageError> {
        let dir = self.parent_dir().unwrap_or_else(|| Path::new("."));
        File::open(dir)
            .and_then(|d| d.sync_all())
            .map_err(|e| StorageError::io(dir, e))
    }

    #[cfg(not(unix))]
    fn sync_parent(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

impl ProductStore for JsonFileStore {
    fn read_all(&self) -> Result<Vec<Product>, StorageError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StorageError::io(&self.path, err)),
        };
        Ok(serde_json::from_str(&data)?)
    }

    fn write_all(&mut self, products: &[Product]) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(products)?;

        if let Some(parent) = self.parent_dir() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let tmp = self.temp_path();
        let written = File::create(&tmp).and_then(|mut file| {
            file.write_all(json.as_bytes())?;
            file.sync_all()
        });
        if let Err(err) = written {
            let _ = fs::remove_file(&tmp);
            return Err(StorageError::io(&tmp, err));
        }

        if let Err(err) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(StorageError::io(&self.path, err));
        }
        self.sync_parent()?;

        tracing::debug!("wrote {} product(s) to {}", products.len(), self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
