/// Settings collaborator: where the last-used root and criteria come from.
///
/// The core only speaks [`FilterCriteria`] and paths through this trait; it
/// never reads or writes a settings file itself. Front ends provide the
/// persistent implementation.
use crate::error::ConfigError;
use crate::model::FilterCriteria;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

pub trait ConfigStore: Send + Sync {
    /// Criteria from the last run, or defaults if none were stored.
    fn load_criteria(&self) -> Result<FilterCriteria, ConfigError>;

    /// Root directory from the last run, if any.
    fn load_root_dir(&self) -> Result<Option<PathBuf>, ConfigError>;

    /// Remember `criteria` and `root_dir` for the next run.
    fn store_criteria(&self, criteria: &FilterCriteria, root_dir: &Path)
        -> Result<(), ConfigError>;
}

#[derive(Debug, Default, Clone)]
struct Stored {
    criteria: FilterCriteria,
    root_dir: Option<PathBuf>,
}

/// Volatile store for headless callers and tests.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    inner: Mutex<Stored>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with a previous run's values.
    pub fn with_values(criteria: FilterCriteria, root_dir: Option<PathBuf>) -> Self {
        Self {
            inner: Mutex::new(Stored { criteria, root_dir }),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load_criteria(&self) -> Result<FilterCriteria, ConfigError> {
        Ok(self.inner.lock().criteria.clone())
    }

    fn load_root_dir(&self) -> Result<Option<PathBuf>, ConfigError> {
        Ok(self.inner.lock().root_dir.clone())
    }

    fn store_criteria(
        &self,
        criteria: &FilterCriteria,
        root_dir: &Path,
    ) -> Result<(), ConfigError> {
        let mut inner = self.inner.lock();
        inner.criteria = criteria.clone();
        inner.root_dir = Some(root_dir.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AgeSelector;

    #[test]
    fn empty_store_yields_defaults() {
        let store = MemoryConfigStore::new();
        let criteria = store.load_criteria().unwrap();
        assert!(criteria.extensions().is_empty());
        assert_eq!(criteria.age(), AgeSelector::Today);
        assert_eq!(store.load_root_dir().unwrap(), None);
    }

    #[test]
    fn stored_values_round_trip() {
        let store = MemoryConfigStore::new();
        let criteria = FilterCriteria::new(["log", "csv"], AgeSelector::ThreeYears);
        store.store_criteria(&criteria, Path::new("/var/app")).unwrap();

        assert_eq!(store.load_criteria().unwrap(), criteria);
        assert_eq!(
            store.load_root_dir().unwrap(),
            Some(PathBuf::from("/var/app"))
        );
    }

    #[test]
    fn store_is_usable_as_trait_object() {
        let store: Box<dyn ConfigStore> = Box::new(MemoryConfigStore::with_values(
            FilterCriteria::new(["txt"], AgeSelector::OneYear),
            None,
        ));
        assert_eq!(store.load_criteria().unwrap().extension_list(), "txt");
    }
}
