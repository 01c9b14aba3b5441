//! Storage abstraction for saved projects.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod local;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

use crate::project::Project;
use crate::workspace::Workspace;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Key the session is saved under.
pub const PROJECT_KEY: &str = "photocheckr_project";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Project not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Trait for project storage backends.
///
/// On native platforms implementations must be Send + Sync. On WASM these
/// bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Save a project.
    fn save(&self, key: &str, project: &Project) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a project.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Project>>;

    /// Delete a project.
    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all saved keys.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a project exists.
    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Trait for project storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    /// Save a project.
    fn save(&self, key: &str, project: &Project) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a project.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Project>>;

    /// Delete a project.
    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all saved keys.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a project exists.
    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Capture the session (active tab first) and save it under `key`.
pub async fn save_workspace<S: Storage + ?Sized>(
    storage: &S,
    key: &str,
    workspace: &mut Workspace,
) -> StorageResult<()> {
    let project = Project::from_workspace(workspace);
    storage.save(key, &project).await?;
    log::info!("Saved project '{}' with {} tab(s)", key, project.tabs.len());
    Ok(())
}

/// Load the session saved under `key`. `Ok(None)` when nothing was saved.
pub async fn load_workspace<S: Storage + ?Sized>(
    storage: &S,
    key: &str,
) -> StorageResult<Option<Workspace>> {
    match storage.load(key).await {
        Ok(project) => Ok(Some(project.into_workspace())),
        Err(StorageError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
