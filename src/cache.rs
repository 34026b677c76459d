//! Build-once, publish-once cache of loaded datasets, keyed by source path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::catalog::{Catalog, Result};
use crate::unnest::{Unnested, unnest_all};

/// A normalized catalog plus its four long tables. Immutable once built.
#[derive(Debug)]
pub struct Dataset {
    pub source: PathBuf,
    pub catalog: Catalog,
    pub unnested: Unnested,
}

impl Dataset {
    /// Load, normalize, and unnest the file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let catalog = Catalog::load(path)?;
        Ok(Self::from_catalog(path, catalog))
    }

    pub fn from_catalog(source: &Path, catalog: Catalog) -> Self {
        let unnested = unnest_all(&catalog);
        Self {
            source: source.to_path_buf(),
            catalog,
            unnested,
        }
    }
}

type Slot = Arc<Mutex<Option<Arc<Dataset>>>>;

/// Per-path dataset cache.
///
/// The map lock is held only long enough to find a path's slot; the slot
/// lock is held for the build, so concurrent first readers of one path
/// wait for a single build while other paths proceed.
#[derive(Debug, Default)]
pub struct DatasetCache {
    slots: Mutex<HashMap<PathBuf, Slot>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached dataset for `path`, building it on first access.
    /// A failed build publishes nothing, so the next call tries again.
    pub fn get(&self, path: &Path) -> Result<Arc<Dataset>> {
        let slot = self.slot(path);
        let mut guard = lock(&slot);
        if let Some(ds) = guard.as_ref() {
            log::debug!("Cache hit for {}", path.display());
            return Ok(Arc::clone(ds));
        }
        let ds = Arc::new(Dataset::load(path)?);
        *guard = Some(Arc::clone(&ds));
        Ok(ds)
    }

    /// Rebuild the dataset for `path` and replace the published one.
    /// Readers holding the old `Arc` keep a consistent snapshot. On failure
    /// the previously published dataset stays in place.
    pub fn refresh(&self, path: &Path) -> Result<Arc<Dataset>> {
        log::info!("Refreshing {}", path.display());
        let slot = self.slot(path);
        let mut guard = lock(&slot);
        let ds = Arc::new(Dataset::load(path)?);
        *guard = Some(Arc::clone(&ds));
        Ok(ds)
    }

    /// Whether a dataset for `path` has been published.
    pub fn contains(&self, path: &Path) -> bool {
        let slot = lock(&self.slots).get(path).cloned();
        slot.is_some_and(|s| lock(&s).is_some())
    }

    fn slot(&self, path: &Path) -> Slot {
        let mut slots = lock(&self.slots);
        Arc::clone(slots.entry(path.to_path_buf()).or_default())
    }
}

/// Published values are never left half-written, so a poisoned lock is still usable.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
