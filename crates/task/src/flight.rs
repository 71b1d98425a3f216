use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::lifecycle::LifecycleGuard;

/// Monotonic generation clock for one channel.
#[derive(Debug, Default, Clone)]
pub struct GenerationClock {
	next: Arc<AtomicU64>,
}

impl GenerationClock {
	pub fn new() -> Self {
		Self::default()
	}

	/// Advances to and returns the next generation.
	pub fn advance(&self) -> u64 {
		self.next.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
	}

	/// Returns the current generation without advancing it.
	pub fn current(&self) -> u64 {
		self.next.load(Ordering::Acquire)
	}
}

/// Generation-scoped cancellation token handed to a dispatched operation.
///
/// The token is advisory: operations that ignore it still run to
/// completion, and their result is discarded by the generation gate
/// instead.
#[derive(Debug, Clone)]
pub struct TaskToken {
	generation: u64,
	cancel: CancellationToken,
}

impl TaskToken {
	pub(crate) fn new(generation: u64, cancel: CancellationToken) -> Self {
		Self { generation, cancel }
	}

	pub const fn generation(&self) -> u64 {
		self.generation
	}

	/// True once this run has been superseded or the consumer torn down.
	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Resolves when cancellation is requested.
	pub async fn cancelled(&self) {
		self.cancel.cancelled().await;
	}
}

/// Single-flight task slot with generation-gated delivery.
///
/// Dispatching supersedes any prior unfinished run: the previous token is
/// cancelled and the generation advances, so when the old run eventually
/// settles its result is compared against the *current* generation and
/// dropped before any externally visible write. At most one result is
/// delivered per generation, regardless of completion order.
#[derive(Debug)]
pub struct FlightDeck {
	clock: GenerationClock,
	guard: LifecycleGuard,
	active: Option<CancellationToken>,
}

impl FlightDeck {
	pub fn new(guard: LifecycleGuard) -> Self {
		Self {
			clock: GenerationClock::new(),
			guard,
			active: None,
		}
	}

	pub fn guard(&self) -> &LifecycleGuard {
		&self.guard
	}

	/// True when `generation` is still the current generation.
	///
	/// Delivery callbacks that serialize through their own channel lock
	/// re-check with this before writing, closing the gap between the
	/// spawned task's gate and the write.
	pub fn is_current(&self, generation: u64) -> bool {
		self.clock.current() == generation
	}

	/// Advances the generation without dispatching, discarding whatever is
	/// in flight. Used by input-clear, reset, and teardown paths.
	pub fn supersede(&mut self) -> u64 {
		if let Some(prev) = self.active.take() {
			prev.cancel();
		}
		self.clock.advance()
	}

	/// Dispatches `op`, superseding any prior run.
	///
	/// `deliver` is invoked with the run's generation and output iff the run
	/// is still current and the consumer is alive when it settles; otherwise
	/// the output is dropped without side effects.
	pub fn dispatch<T, F, Fut, D>(&mut self, op: F, deliver: D) -> JoinHandle<()>
	where
		T: Send + 'static,
		F: FnOnce(TaskToken) -> Fut,
		Fut: Future<Output = T> + Send + 'static,
		D: FnOnce(u64, T) + Send + 'static,
	{
		let generation = self.supersede();
		let cancel = self.guard.teardown_token().child_token();
		self.active = Some(cancel.clone());
		let fut = op(TaskToken::new(generation, cancel));

		let clock = self.clock.clone();
		let guard = self.guard.clone();
		tracing::trace!(generation, "flight.dispatch");
		tokio::spawn(async move {
			let out = fut.await;
			if clock.current() != generation {
				tracing::trace!(generation, current = clock.current(), "flight.discard_superseded");
				return;
			}
			if !guard.deliver(|| deliver(generation, out)) {
				tracing::trace!(generation, "flight.discard_after_teardown");
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use parking_lot::Mutex;
	use tokio::sync::oneshot;

	use super::*;
	use crate::lifecycle::Lifecycle;

	fn deck() -> (Lifecycle, FlightDeck) {
		let lifecycle = Lifecycle::new();
		let deck = FlightDeck::new(lifecycle.guard());
		(lifecycle, deck)
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn late_stale_completion_is_discarded() {
		let (_lifecycle, mut deck) = deck();
		let delivered = Arc::new(Mutex::new(Vec::new()));

		let (gate_a_tx, gate_a_rx) = oneshot::channel::<&str>();
		let (gate_b_tx, gate_b_rx) = oneshot::channel::<&str>();

		let sink = Arc::clone(&delivered);
		deck.dispatch(
			move |_token| async move { gate_a_rx.await.unwrap() },
			move |_generation, out| sink.lock().push(out),
		);
		let sink = Arc::clone(&delivered);
		deck.dispatch(
			move |_token| async move { gate_b_rx.await.unwrap() },
			move |_generation, out| sink.lock().push(out),
		);

		// B settles first, then the superseded A.
		gate_b_tx.send("b").unwrap();
		tokio::time::sleep(Duration::from_millis(1)).await;
		gate_a_tx.send("a").unwrap();
		tokio::time::sleep(Duration::from_millis(1)).await;

		assert_eq!(*delivered.lock(), vec!["b"]);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn supersede_cancels_and_silences_inflight_run() {
		let (_lifecycle, mut deck) = deck();
		let delivered = Arc::new(Mutex::new(Vec::new()));

		let sink = Arc::clone(&delivered);
		deck.dispatch(
			move |token| async move {
				token.cancelled().await;
				"cancelled"
			},
			move |_generation, out| sink.lock().push(out),
		);
		deck.supersede();
		tokio::time::sleep(Duration::from_millis(1)).await;

		assert!(delivered.lock().is_empty());
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn settlement_after_teardown_delivers_nothing() {
		let (lifecycle, mut deck) = deck();
		let delivered = Arc::new(Mutex::new(Vec::new()));

		let (gate_tx, gate_rx) = oneshot::channel::<u32>();
		let sink = Arc::clone(&delivered);
		deck.dispatch(
			move |_token| async move { gate_rx.await.unwrap() },
			move |_generation, out| sink.lock().push(out),
		);

		lifecycle.destroy();
		gate_tx.send(7).unwrap();
		tokio::time::sleep(Duration::from_millis(1)).await;

		assert!(delivered.lock().is_empty());
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn generations_are_strictly_increasing_per_dispatch() {
		let (_lifecycle, mut deck) = deck();
		let seen = Arc::new(Mutex::new(Vec::new()));

		for _ in 0..3 {
			let sink = Arc::clone(&seen);
			deck.dispatch(
				move |token| async move { token.generation() },
				move |generation, out| {
					assert_eq!(generation, out);
					sink.lock().push(out);
				},
			);
			tokio::time::sleep(Duration::from_millis(1)).await;
		}

		assert_eq!(*seen.lock(), vec![1, 2, 3]);
	}
}
