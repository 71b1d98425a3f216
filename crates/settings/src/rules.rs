use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use valet_task::LifecycleGuard;

use crate::error::StoreError;
use crate::mutation;
use crate::store::ConfigStore;
use crate::types::{ConfigUpdate, RuleSetting, Severity};

/// Remote-backed rule list with optimistic severity/enablement mutations.
///
/// The visible list is published through a watch channel. Mutations apply
/// to it before the store confirms; a failed save reloads the store's
/// authoritative contents before the error propagates, so the list never
/// keeps an unpersisted value past one resynchronization round-trip.
pub struct RuleList {
	store: Arc<dyn ConfigStore>,
	guard: LifecycleGuard,
	inner: Arc<Mutex<RulesInner>>,
	rx: watch::Receiver<Vec<RuleSetting>>,
}

struct RulesInner {
	// Bumped by refreshes and tentative applies alike, so a slow load can
	// never clobber a newer visible list.
	generation: u64,
	tx: watch::Sender<Vec<RuleSetting>>,
}

impl RuleList {
	pub(crate) fn new(store: Arc<dyn ConfigStore>, guard: LifecycleGuard) -> Self {
		let (tx, rx) = watch::channel(Vec::new());
		Self {
			store,
			guard,
			inner: Arc::new(Mutex::new(RulesInner { generation: 0, tx })),
			rx,
		}
	}

	pub fn rules(&self) -> Vec<RuleSetting> {
		self.rx.borrow().clone()
	}

	/// Receiver observing every published list change.
	pub fn subscribe(&self) -> watch::Receiver<Vec<RuleSetting>> {
		self.rx.clone()
	}

	/// Replaces the visible list with the store's authoritative contents.
	///
	/// A refresh that was superseded while its load was in flight is
	/// silently discarded.
	pub async fn refresh(&self) -> Result<(), StoreError> {
		let generation = {
			let mut inner = self.inner.lock();
			inner.generation = inner.generation.wrapping_add(1);
			inner.generation
		};

		let doc = self.store.load().await?;

		let inner = self.inner.lock();
		if inner.generation != generation {
			tracing::trace!(generation, "rules.discard_stale_refresh");
			return Ok(());
		}
		self.guard.deliver(|| {
			inner.tx.send_replace(doc.rules);
		});
		Ok(())
	}

	/// Optimistically updates one rule's severity, rolling back on failure.
	pub async fn set_severity(&self, id: &str, severity: Severity) -> Result<(), StoreError> {
		self.mutate(ConfigUpdate::RuleSeverity {
			id: id.to_owned(),
			severity,
		})
		.await
	}

	/// Optimistically toggles one rule, rolling back on failure.
	pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<(), StoreError> {
		self.mutate(ConfigUpdate::RuleEnabled {
			id: id.to_owned(),
			enabled,
		})
		.await
	}

	async fn mutate(&self, update: ConfigUpdate) -> Result<(), StoreError> {
		let res = mutation::optimistic(
			|| self.apply_visible(&update),
			self.store.save(update.clone()),
			self.resync(),
		)
		.await;
		if let Err(err) = &res {
			tracing::warn!(%err, ?update, "rules.mutation_rolled_back");
		}
		res
	}

	/// Tentative apply. An update naming an absent rule leaves the list
	/// untouched; the save carrying it is still issued.
	fn apply_visible(&self, update: &ConfigUpdate) {
		let mut inner = self.inner.lock();
		inner.generation = inner.generation.wrapping_add(1);
		self.guard.deliver(|| {
			inner.tx.send_modify(|rules| apply_to_rules(rules, update));
		});
	}

	async fn resync(&self) {
		if let Err(err) = self.refresh().await {
			tracing::warn!(%err, "rules.rollback_reload_failed");
		}
	}
}

fn apply_to_rules(rules: &mut [RuleSetting], update: &ConfigUpdate) {
	match update {
		ConfigUpdate::RuleSeverity { id, severity } => {
			if let Some(rule) = rules.iter_mut().find(|rule| &rule.id == id) {
				rule.severity = *severity;
			}
		}
		ConfigUpdate::RuleEnabled { id, enabled } => {
			if let Some(rule) = rules.iter_mut().find(|rule| &rule.id == id) {
				rule.enabled = *enabled;
			}
		}
		ConfigUpdate::CheckerPath(_) | ConfigUpdate::ConfigPath(_) => {}
	}
}
