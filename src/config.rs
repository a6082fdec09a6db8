use crate::application::coordinator::{DEFAULT_LOCK_TIMEOUT, TransactionCoordinator};
use crate::domain::catalog::{AreaCatalog, ClassCatalog};
use crate::infrastructure::catalog_file::load_catalog;
use crate::infrastructure::json_file::{ledger_store, ownership_store};
use std::path::PathBuf;
use std::time::Duration;

pub const OWNERSHIP_FILE: &str = "Player_database.json";
pub const LEDGER_FILE: &str = "Player_accounts.json";
pub const CATALOG_FILE: &str = "Asset_database.json";
pub const CLASS_CATALOG_FILE: &str = "Commercial_properties.json";

/// Where the engine keeps its documents and how long it waits for locks.
///
/// File names are relative to `data_dir` unless absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    pub ownership_file: PathBuf,
    pub ledger_file: PathBuf,
    pub catalog_file: PathBuf,
    pub class_catalog_file: PathBuf,
    pub lock_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            ownership_file: PathBuf::from(OWNERSHIP_FILE),
            ledger_file: PathBuf::from(LEDGER_FILE),
            catalog_file: PathBuf::from(CATALOG_FILE),
            class_catalog_file: PathBuf::from(CLASS_CATALOG_FILE),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }
}

impl EngineConfig {
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn ownership_path(&self) -> PathBuf {
        self.data_dir.join(&self.ownership_file)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(&self.ledger_file)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(&self.catalog_file)
    }

    pub fn class_catalog_path(&self) -> PathBuf {
        self.data_dir.join(&self.class_catalog_file)
    }

    /// Wires JSON file stores and fail-open catalogs into a coordinator.
    pub fn build_coordinator(&self) -> TransactionCoordinator {
        let areas: Option<AreaCatalog> = load_catalog(&self.catalog_path());
        let classes: Option<ClassCatalog> = load_catalog(&self.class_catalog_path());

        TransactionCoordinator::new(Box::new(ownership_store(self.ownership_path())))
            .with_ledger(Box::new(ledger_store(self.ledger_path())))
            .with_area_catalog(areas)
            .with_class_catalog(classes)
            .with_lock_timeout(self.lock_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_file_names() {
        let config = EngineConfig::in_dir("/data");
        assert_eq!(
            config.ownership_path(),
            PathBuf::from("/data/Player_database.json")
        );
        assert_eq!(
            config.ledger_path(),
            PathBuf::from("/data/Player_accounts.json")
        );
        assert_eq!(config.lock_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_absolute_file_overrides_data_dir() {
        let config = EngineConfig {
            ledger_file: PathBuf::from("/elsewhere/ledger.json"),
            ..EngineConfig::in_dir("/data")
        };
        assert_eq!(config.ledger_path(), PathBuf::from("/elsewhere/ledger.json"));
    }

    #[tokio::test]
    async fn test_built_coordinator_persists_to_data_dir() {
        let dir = tempdir().unwrap();
        let config = EngineConfig::in_dir(dir.path());
        let coordinator = config.build_coordinator();

        coordinator.transfer_rent("Ann", "Bob", 25).await.unwrap();

        assert!(config.ownership_path().exists());
        let accounts = std::fs::read_to_string(config.ledger_path()).unwrap();
        assert!(accounts.contains("\"payment amount\": -25"));
    }
}
