use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::TaskError;
use crate::flight::{FlightDeck, TaskToken};
use crate::lifecycle::{Lifecycle, LifecycleGuard};

/// Snapshot of one asynchronous operation's observable state.
///
/// `loading` excludes both settled outcomes: while a run is in flight no
/// stale verdict is carried (`error` is cleared on every execute).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncOperationState<T> {
	pub loading: bool,
	pub data: Option<T>,
	pub error: Option<String>,
}

impl<T> AsyncOperationState<T> {
	pub fn idle() -> Self {
		Self {
			loading: false,
			data: None,
			error: None,
		}
	}

	/// Settled with a real value: not loading, no error, data present.
	pub fn is_success(&self) -> bool {
		!self.loading && self.error.is_none() && self.data.is_some()
	}

	/// Settled with a failure: not loading, error present.
	pub fn is_error(&self) -> bool {
		!self.loading && self.error.is_some()
	}
}

impl<T> Default for AsyncOperationState<T> {
	fn default() -> Self {
		Self::idle()
	}
}

/// Single-flight execute/reset wrapper over an async operation.
///
/// `execute` supersedes any still-running previous call; only the newest
/// call's result ever lands in [`AsyncOperationState::data`]. `reset`
/// clears back to idle and silences whatever is in flight.
pub struct AsyncTask<T> {
	inner: Arc<Mutex<TaskInner<T>>>,
	rx: watch::Receiver<AsyncOperationState<T>>,
}

struct TaskInner<T> {
	flight: FlightDeck,
	tx: watch::Sender<AsyncOperationState<T>>,
}

impl<T> AsyncTask<T>
where
	T: Clone + Send + Sync + 'static,
{
	pub fn new(guard: LifecycleGuard) -> Self {
		let (tx, rx) = watch::channel(AsyncOperationState::idle());
		Self {
			inner: Arc::new(Mutex::new(TaskInner {
				flight: FlightDeck::new(guard),
				tx,
			})),
			rx,
		}
	}

	/// Wrapper owning its own lifecycle, for standalone use outside any
	/// consumer. It is never torn down.
	pub fn detached() -> Self {
		Self::new(Lifecycle::new().guard())
	}

	pub fn state(&self) -> AsyncOperationState<T> {
		self.rx.borrow().clone()
	}

	/// Receiver observing every published state transition.
	pub fn subscribe(&self) -> watch::Receiver<AsyncOperationState<T>> {
		self.rx.clone()
	}

	/// Starts `op`, superseding any still-running execution.
	///
	/// Previous data stays visible while the new run is loading; the stale
	/// verdict does not (`error` is cleared immediately).
	pub fn execute<F, Fut>(&self, op: F) -> JoinHandle<()>
	where
		F: FnOnce(TaskToken) -> Fut,
		Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
	{
		let mut inner = self.inner.lock();
		let data = inner.tx.borrow().data.clone();
		inner.tx.send_replace(AsyncOperationState {
			loading: true,
			data,
			error: None,
		});

		let shared = Arc::clone(&self.inner);
		inner.flight.dispatch(op, move |generation, out| {
			let inner = shared.lock();
			if !inner.flight.is_current(generation) {
				return;
			}
			let state = match out {
				Ok(data) => AsyncOperationState {
					loading: false,
					data: Some(data),
					error: None,
				},
				Err(err) => AsyncOperationState {
					loading: false,
					data: None,
					error: Some(err.message()),
				},
			};
			tracing::debug!(generation, success = state.is_success(), "task.settled");
			inner.tx.send_replace(state);
		})
	}

	/// Clears to the initial idle state, superseding any in-flight call
	/// without recording its eventual result.
	pub fn reset(&self) {
		let mut inner = self.inner.lock();
		inner.flight.supersede();
		inner.tx.send_replace(AsyncOperationState::idle());
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use tokio::sync::oneshot;

	use super::*;

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn settles_through_loading_to_success() {
		let task = AsyncTask::<u32>::detached();
		let mut rx = task.subscribe();

		task.execute(|_token| async { Ok(41) });
		assert!(task.state().loading);

		rx.changed().await.unwrap();
		tokio::time::sleep(Duration::from_millis(1)).await;

		let state = task.state();
		assert!(state.is_success());
		assert_eq!(state.data, Some(41));
		assert_eq!(state.error, None);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn second_execute_wins_when_first_never_resolves() {
		let task = AsyncTask::<u32>::detached();

		task.execute(|_token| std::future::pending::<Result<u32, TaskError>>());
		task.execute(|_token| async { Ok(2) });
		tokio::time::sleep(Duration::from_millis(1)).await;

		let state = task.state();
		assert!(state.is_success());
		assert_eq!(state.data, Some(2));
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn failure_surfaces_normalized_message() {
		let task = AsyncTask::<u32>::detached();

		task.execute(|_token| async { Err(TaskError::from_display("boom")) });
		tokio::time::sleep(Duration::from_millis(1)).await;
		let state = task.state();
		assert!(state.is_error());
		assert_eq!(state.error.as_deref(), Some("boom"));

		task.execute(|_token| async { Err(TaskError::from_display("")) });
		tokio::time::sleep(Duration::from_millis(1)).await;
		assert_eq!(task.state().error.as_deref(), Some("Unknown error"));
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn reset_supersedes_and_returns_to_idle() {
		let task = AsyncTask::<u32>::detached();
		let (gate_tx, gate_rx) = oneshot::channel::<u32>();

		task.execute(move |_token| async move { Ok(gate_rx.await.unwrap()) });
		assert!(task.state().loading);

		task.reset();
		gate_tx.send(9).unwrap();
		tokio::time::sleep(Duration::from_millis(1)).await;

		let state = task.state();
		assert!(!state.loading);
		assert_eq!(state.data, None);
		assert_eq!(state.error, None);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn previous_data_stays_visible_while_reloading() {
		let task = AsyncTask::<u32>::detached();

		task.execute(|_token| async { Ok(1) });
		tokio::time::sleep(Duration::from_millis(1)).await;
		assert_eq!(task.state().data, Some(1));

		task.execute(|_token| std::future::pending::<Result<u32, TaskError>>());
		let state = task.state();
		assert!(state.loading);
		assert_eq!(state.data, Some(1));
		assert!(!state.is_success());
	}
}
