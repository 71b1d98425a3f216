use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

/// Alive flag plus teardown token for one logical consumer.
///
/// Created when the consumer mounts. [`Lifecycle::destroy`] flips the flag
/// exactly once and cancels the teardown token; the flag never resets.
/// Primitives owned by the consumer share the flag through cloned
/// [`LifecycleGuard`]s and check it immediately before any externally
/// visible state change.
#[derive(Debug)]
pub struct Lifecycle {
	alive: Arc<AtomicBool>,
	teardown: CancellationToken,
}

impl Lifecycle {
	pub fn new() -> Self {
		Self {
			alive: Arc::new(AtomicBool::new(true)),
			teardown: CancellationToken::new(),
		}
	}

	/// Cloneable guard sharing this consumer's alive flag and teardown token.
	pub fn guard(&self) -> LifecycleGuard {
		LifecycleGuard {
			alive: Arc::clone(&self.alive),
			teardown: self.teardown.clone(),
		}
	}

	pub fn is_alive(&self) -> bool {
		self.alive.load(Ordering::Acquire)
	}

	/// Marks the consumer destroyed: pending timers die, in-flight results
	/// are discarded on settlement rather than awaited. Idempotent.
	pub fn destroy(&self) {
		if self.alive.swap(false, Ordering::AcqRel) {
			self.teardown.cancel();
			tracing::trace!("lifecycle.destroy");
		}
	}
}

impl Default for Lifecycle {
	fn default() -> Self {
		Self::new()
	}
}

/// Shared view of a consumer's liveness, held by every delivery path.
#[derive(Debug, Clone)]
pub struct LifecycleGuard {
	alive: Arc<AtomicBool>,
	teardown: CancellationToken,
}

impl LifecycleGuard {
	pub fn is_alive(&self) -> bool {
		self.alive.load(Ordering::Acquire)
	}

	/// Runs `deliver` iff the owning consumer is still alive.
	///
	/// Returns whether delivery happened.
	pub fn deliver(&self, deliver: impl FnOnce()) -> bool {
		if self.is_alive() {
			deliver();
			true
		} else {
			false
		}
	}

	/// Token cancelled exactly once, at consumer destruction.
	pub fn teardown_token(&self) -> &CancellationToken {
		&self.teardown
	}
}
