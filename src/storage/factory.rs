use std::sync::Arc;

use crate::model::StorageResult;
use crate::storage::config::StorageConfig;
use crate::storage::filesystem::FilesystemStorage;
use crate::storage::object::ObjectStorage;
use crate::storage::provider::Storage;
use crate::storage::telemetry::TracedStorage;

/// Factory for creating storage backends.
pub struct StorageFactory;

impl StorageFactory {
    /// Create the backend a configuration selects.
    ///
    /// Exactly one backend is constructed: a filesystem configuration
    /// yields a [`FilesystemStorage`], an object configuration an
    /// [`ObjectStorage`].
    pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn Storage>> {
        match config {
            StorageConfig::Filesystem(filesystem) => Ok(Arc::new(
                FilesystemStorage::new(&filesystem.root_directory).await?,
            )),
            StorageConfig::Object(object) => Ok(Arc::new(ObjectStorage::new(object)?)),
        }
    }

    /// Same as [`Self::from_config`], wrapped in the tracing decorator.
    pub async fn from_config_traced(config: &StorageConfig) -> StorageResult<Arc<dyn Storage>> {
        let storage = Self::from_config(config).await?;
        Ok(Arc::new(TracedStorage::new(storage)))
    }
}
