use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::lifecycle::LifecycleGuard;

/// Default quiet period before a settled trigger fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Converts a stream of change signals into one settled trigger per quiet
/// period.
///
/// Each [`Debouncer::schedule`] call replaces any pending trigger, so a
/// burst of k calls fires exactly once, with the state captured by the last
/// call. A zero interval still routes through the timer path so its
/// cancellation behaves like every other schedule.
#[derive(Debug)]
pub struct Debouncer {
	interval: Duration,
	guard: LifecycleGuard,
	pending: Option<JoinHandle<()>>,
}

impl Debouncer {
	pub fn new(interval: Duration, guard: LifecycleGuard) -> Self {
		Self {
			interval,
			guard,
			pending: None,
		}
	}

	pub fn interval(&self) -> Duration {
		self.interval
	}

	/// Schedules `trigger` after the quiet interval, replacing any pending
	/// not-yet-fired trigger. The timer dies with the owning lifecycle.
	pub fn schedule<F>(&mut self, trigger: F)
	where
		F: Future<Output = ()> + Send + 'static,
	{
		self.cancel();
		let interval = self.interval;
		let teardown = self.guard.teardown_token().clone();
		self.pending = Some(tokio::spawn(async move {
			tokio::select! {
				_ = teardown.cancelled() => {}
				_ = tokio::time::sleep(interval) => trigger.await,
			}
		}));
	}

	/// Drops the pending trigger without firing it.
	pub fn cancel(&mut self) {
		if let Some(handle) = self.pending.take() {
			handle.abort();
		}
	}
}

impl Drop for Debouncer {
	fn drop(&mut self) {
		self.cancel();
	}
}
