//! Component model loading.
//!
//! Model files are opaque to the compositor: a loader turns a path into
//! bytes plus optional per-part colors, and [`ModelCache`] memoizes the
//! successful loads for the lifetime of the cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Color;
use crate::error::ModelError;

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    pub path: PathBuf,
    pub data: Arc<[u8]>,
    /// One color per model part, when the loader knows them.
    pub colors: Vec<Color>,
}

pub trait ModelLoader {
    fn load(&self, path: &Path) -> Result<LoadedModel, ModelError>;
}

/// Reads model files from disk as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsModelLoader;

impl ModelLoader for FsModelLoader {
    fn load(&self, path: &Path) -> Result<LoadedModel, ModelError> {
        if !path.is_file() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }
        let data = std::fs::read(path).map_err(|source| ModelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(LoadedModel {
            path: path.to_path_buf(),
            data: data.into(),
            colors: Vec::new(),
        })
    }
}

/// Path-keyed memo of loaded models. Failed loads are not remembered, so a
/// model that appears later is picked up on the next request.
#[derive(Debug, Default)]
pub struct ModelCache<L = FsModelLoader> {
    loader: L,
    entries: HashMap<PathBuf, LoadedModel>,
}

impl ModelCache<FsModelLoader> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_loader(FsModelLoader)
    }
}

impl<L: ModelLoader> ModelCache<L> {
    pub fn with_loader(loader: L) -> Self {
        Self {
            loader,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, path: &Path) -> Result<LoadedModel, ModelError> {
        if let Some(hit) = self.entries.get(path) {
            return Ok(hit.clone());
        }
        let model = self.loader.load(path)?;
        self.entries.insert(path.to_path_buf(), model.clone());
        Ok(model)
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn evict(&mut self, path: &Path) -> Option<LoadedModel> {
        self.entries.remove(path)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn loader(&self) -> &L {
        &self.loader
    }
}
