//! Shared parse cache
//!
//! Registry documents are large and several profiles usually read the same
//! one. [`BindCache`] memoizes parsed registries per document and API
//! selection, and parsed type tables per file. Cached values are immutable
//! and handed out as [`Arc`]s.
//!
//! Lookups take the read lock. A miss parses outside any lock and then
//! inserts; if another thread got there first, its value is kept and
//! returned, so every caller of the same key sees the same instance.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::reader::{ApiSelection, RegistryReader};
use crate::registry::Registry;
use crate::typemap::TypeMap;

type RegistryKey = (PathBuf, ApiSelection);

/// Concurrent cache of parsed registries and type tables
#[derive(Debug, Default)]
pub struct BindCache {
    registries: RwLock<HashMap<RegistryKey, Arc<Registry>>>,
    typemaps: RwLock<HashMap<PathBuf, Arc<TypeMap>>>,
}

impl BindCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry for `path` read with `selection`, parsing it on first use
    pub fn registry(&self, path: &Path, selection: &ApiSelection) -> Result<Arc<Registry>> {
        let key = (path.to_path_buf(), selection.clone());

        if let Some(registry) = self.registries.read().get(&key) {
            debug!(path = %path.display(), api = %selection.api, "Registry cache hit");
            return Ok(Arc::clone(registry));
        }

        let parsed = Arc::new(RegistryReader::new(selection.clone()).read_path(path)?);

        let mut registries = self.registries.write();
        let stored = registries.entry(key).or_insert(parsed);
        Ok(Arc::clone(stored))
    }

    /// Type table at `path`, parsing it on first use
    pub fn typemap(&self, path: &Path) -> Result<Arc<TypeMap>> {
        if let Some(map) = self.typemaps.read().get(path) {
            debug!(path = %path.display(), "Typemap cache hit");
            return Ok(Arc::clone(map));
        }

        let parsed = Arc::new(TypeMap::read_path(path)?);

        let mut typemaps = self.typemaps.write();
        let stored = typemaps.entry(path.to_path_buf()).or_insert(parsed);
        Ok(Arc::clone(stored))
    }

    /// Bake the listed type tables in order into a single table.
    ///
    /// An empty list yields an empty table, which maps nothing.
    pub fn typemap_chain(&self, paths: &[PathBuf]) -> Result<TypeMap> {
        let mut iter = paths.iter();
        let Some(first) = iter.next() else {
            return Ok(TypeMap::default());
        };

        let mut baked = TypeMap::clone(&*self.typemap(first)?);
        for path in iter {
            baked = baked.bake(&*self.typemap(path)?);
        }
        Ok(baked)
    }

    pub fn cached_registries(&self) -> usize {
        self.registries.read().len()
    }

    pub fn cached_typemaps(&self) -> usize {
        self.typemaps.read().len()
    }

    /// Drop every cached value
    pub fn clear(&self) {
        self.registries.write().clear();
        self.typemaps.write().clear();
    }
}
