//! Browser `localStorage` backend for WebAssembly.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::project::Project;

/// Projects stored as JSON strings in `window.localStorage`, one item per key.
///
/// Keys are namespaced with a prefix except for the main session key, which
/// is stored verbatim so older saves stay readable.
pub struct LocalStorage {
    prefix: String,
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStorage {
    pub fn new() -> Self {
        Self {
            prefix: "photocheckr:".to_string(),
        }
    }

    fn item_key(&self, key: &str) -> String {
        if key == super::PROJECT_KEY {
            key.to_string()
        } else {
            format!("{}{}", self.prefix, key)
        }
    }

    fn storage() -> StorageResult<web_sys::Storage> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Other("No window object".to_string()))?;
        window
            .local_storage()
            .map_err(|e| StorageError::Other(format!("localStorage error: {:?}", e)))?
            .ok_or_else(|| StorageError::Other("localStorage not available".to_string()))
    }
}

impl Storage for LocalStorage {
    fn save(&self, key: &str, project: &Project) -> BoxFuture<'_, StorageResult<()>> {
        let item = self.item_key(key);
        let json = project.to_json();
        Box::pin(async move {
            let json = json.map_err(|e| StorageError::Serialization(e.to_string()))?;
            Self::storage()?
                .set_item(&item, &json)
                .map_err(|e| StorageError::Io(format!("Failed to write {}: {:?}", item, e)))
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Project>> {
        let item = self.item_key(key);
        let key = key.to_string();
        Box::pin(async move {
            let json = Self::storage()?
                .get_item(&item)
                .map_err(|e| StorageError::Io(format!("Failed to read {}: {:?}", item, e)))?
                .ok_or(StorageError::NotFound(key))?;
            Project::from_json(&json).map_err(|e| StorageError::Serialization(e.to_string()))
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let item = self.item_key(key);
        Box::pin(async move {
            Self::storage()?
                .remove_item(&item)
                .map_err(|e| StorageError::Io(format!("Failed to delete {}: {:?}", item, e)))
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let prefix = self.prefix.clone();
        Box::pin(async move {
            let storage = Self::storage()?;
            let len = storage
                .length()
                .map_err(|e| StorageError::Other(format!("localStorage error: {:?}", e)))?;
            let mut keys = Vec::new();
            for i in 0..len {
                let Ok(Some(name)) = storage.key(i) else {
                    continue;
                };
                if name == super::PROJECT_KEY {
                    keys.push(name);
                } else if let Some(key) = name.strip_prefix(&prefix) {
                    keys.push(key.to_string());
                }
            }
            Ok(keys)
        })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let item = self.item_key(key);
        Box::pin(async move {
            let value = Self::storage()?
                .get_item(&item)
                .map_err(|e| StorageError::Io(format!("Failed to read {}: {:?}", item, e)))?;
            Ok(value.is_some())
        })
    }
}
