use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{ConfigDocument, ConfigUpdate};

mod file;
mod memory;

pub use file::TomlStore;
pub use memory::MemoryStore;

/// Persisted-configuration collaborator.
///
/// `save` must raise on failure; the mutation coordinator relies on the
/// raise to trigger rollback via a fresh `load`.
#[async_trait]
pub trait ConfigStore: Send + Sync {
	async fn load(&self) -> Result<ConfigDocument, StoreError>;
	async fn save(&self, update: ConfigUpdate) -> Result<(), StoreError>;
}
