use async_trait::async_trait;
use parking_lot::Mutex;

use super::ConfigStore;
use crate::error::StoreError;
use crate::types::{ConfigDocument, ConfigUpdate};

/// In-memory store with failure injection, for tests and embedding.
#[derive(Default)]
pub struct MemoryStore {
	inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
	doc: ConfigDocument,
	fail_next_load: Option<StoreError>,
	fail_next_save: Option<StoreError>,
	loads: u64,
	saves: u64,
}

impl MemoryStore {
	pub fn new(doc: ConfigDocument) -> Self {
		Self {
			inner: Mutex::new(MemoryInner {
				doc,
				..Default::default()
			}),
		}
	}

	/// Makes the next `load` raise `err` instead of resolving.
	pub fn fail_next_load(&self, err: StoreError) {
		self.inner.lock().fail_next_load = Some(err);
	}

	/// Makes the next `save` raise `err` without applying its update.
	pub fn fail_next_save(&self, err: StoreError) {
		self.inner.lock().fail_next_save = Some(err);
	}

	/// Current persisted document.
	pub fn document(&self) -> ConfigDocument {
		self.inner.lock().doc.clone()
	}

	pub fn load_count(&self) -> u64 {
		self.inner.lock().loads
	}

	pub fn save_count(&self) -> u64 {
		self.inner.lock().saves
	}
}

#[async_trait]
impl ConfigStore for MemoryStore {
	async fn load(&self) -> Result<ConfigDocument, StoreError> {
		let mut inner = self.inner.lock();
		inner.loads += 1;
		if let Some(err) = inner.fail_next_load.take() {
			return Err(err);
		}
		Ok(inner.doc.clone())
	}

	async fn save(&self, update: ConfigUpdate) -> Result<(), StoreError> {
		let mut inner = self.inner.lock();
		inner.saves += 1;
		if let Some(err) = inner.fail_next_save.take() {
			return Err(err);
		}
		inner.doc.apply(&update);
		Ok(())
	}
}
