use std::sync::Arc;
use std::time::Duration;

use valet_task::{DEFAULT_DEBOUNCE, Lifecycle};

use crate::channel::ValidationChannel;
use crate::error::StoreError;
use crate::mutation;
use crate::rules::RuleList;
use crate::store::ConfigStore;
use crate::types::{ConfigDocument, ConfigUpdate};
use crate::validate::Validator;

/// One mounted settings surface: a shared lifecycle, independent
/// validation channels, and the remote-backed rule list.
///
/// Channels allocated here share only the alive flag; each has its own
/// debounce timer and generation clock, so superseding one never touches a
/// sibling's in-flight state. [`SettingsSession::shutdown`] tears the
/// whole surface down: pending timers die, in-flight results are discarded
/// on settlement rather than awaited.
pub struct SettingsSession {
	lifecycle: Lifecycle,
	store: Arc<dyn ConfigStore>,
	debounce: Duration,
}

impl SettingsSession {
	pub fn new(store: Arc<dyn ConfigStore>) -> Self {
		Self::with_debounce(store, DEFAULT_DEBOUNCE)
	}

	pub fn with_debounce(store: Arc<dyn ConfigStore>, debounce: Duration) -> Self {
		Self {
			lifecycle: Lifecycle::new(),
			store,
			debounce,
		}
	}

	/// Allocates an independent validation channel for one field.
	pub fn channel(&self, validator: Arc<dyn Validator>) -> ValidationChannel {
		ValidationChannel::new(validator, self.lifecycle.guard(), self.debounce)
	}

	/// Rule list backed by this session's store.
	pub fn rules(&self) -> RuleList {
		RuleList::new(Arc::clone(&self.store), self.lifecycle.guard())
	}

	pub fn store(&self) -> &Arc<dyn ConfigStore> {
		&self.store
	}

	pub fn is_alive(&self) -> bool {
		self.lifecycle.is_alive()
	}

	/// Destroys the surface. Idempotent.
	pub fn shutdown(&self) {
		self.lifecycle.destroy();
	}

	/// Persists a field update optimistically.
	///
	/// `apply` runs synchronously before the save; on failure the store is
	/// re-read and `resync` receives its authoritative document (lifecycle
	/// permitting) before the error propagates.
	pub async fn persist<A, R>(&self, update: ConfigUpdate, apply: A, resync: R) -> Result<(), StoreError>
	where
		A: FnOnce(),
		R: FnOnce(ConfigDocument),
	{
		let guard = self.lifecycle.guard();
		let store = Arc::clone(&self.store);
		mutation::optimistic(apply, self.store.save(update), async move {
			match store.load().await {
				Ok(doc) => {
					guard.deliver(|| resync(doc));
				}
				Err(err) => tracing::warn!(%err, "session.rollback_reload_failed"),
			}
		})
		.await
	}
}
