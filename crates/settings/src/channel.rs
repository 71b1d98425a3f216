use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use valet_task::{Debouncer, FlightDeck, LifecycleGuard, TaskError};

use crate::validate::Validator;

/// Externally observable state of one validated field.
///
/// Exactly one of idle, validating, settled-valid, settled-invalid holds;
/// the validating interim carries no verdict and no stale error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationState {
	pub validating: bool,
	pub valid: bool,
	pub error: Option<String>,
}

impl ValidationState {
	/// No input, no verdict.
	pub fn idle() -> Self {
		Self::default()
	}

	pub fn validating() -> Self {
		Self {
			validating: true,
			valid: false,
			error: None,
		}
	}

	pub fn settled_valid() -> Self {
		Self {
			validating: false,
			valid: true,
			error: None,
		}
	}

	pub fn settled_invalid(reason: Option<String>) -> Self {
		Self {
			validating: false,
			valid: false,
			error: reason,
		}
	}
}

/// One independently debounced, cancelable validation stream for a field.
///
/// Input changes restart the quiet period and supersede whatever is in
/// flight; empty-or-whitespace input resets straight to idle without ever
/// consulting the validator. Settlement passes the generation gate and the
/// lifecycle guard before anything observable changes.
pub struct ValidationChannel {
	inner: Arc<Mutex<ChannelInner>>,
	validator: Arc<dyn Validator>,
	rx: watch::Receiver<ValidationState>,
}

struct ChannelInner {
	input: String,
	debounce: Debouncer,
	flight: FlightDeck,
	tx: watch::Sender<ValidationState>,
}

impl ValidationChannel {
	pub(crate) fn new(validator: Arc<dyn Validator>, guard: LifecycleGuard, interval: Duration) -> Self {
		let (tx, rx) = watch::channel(ValidationState::idle());
		Self {
			inner: Arc::new(Mutex::new(ChannelInner {
				input: String::new(),
				debounce: Debouncer::new(interval, guard.clone()),
				flight: FlightDeck::new(guard),
				tx,
			})),
			validator,
			rx,
		}
	}

	/// Latest raw input, however unsettled.
	pub fn input(&self) -> String {
		self.inner.lock().input.clone()
	}

	pub fn state(&self) -> ValidationState {
		self.rx.borrow().clone()
	}

	/// Receiver observing every published state transition.
	pub fn subscribe(&self) -> watch::Receiver<ValidationState> {
		self.rx.clone()
	}

	/// Records an input change.
	///
	/// Blank input short-circuits to idle. Anything else publishes the
	/// validating interim immediately and dispatches the check once the
	/// quiet period elapses.
	pub fn set_input(&self, value: impl Into<String>) {
		let value = value.into();
		let mut inner = self.inner.lock();
		inner.input = value.clone();

		if value.trim().is_empty() {
			inner.debounce.cancel();
			inner.flight.supersede();
			inner.tx.send_replace(ValidationState::idle());
			return;
		}

		inner.flight.supersede();
		inner.tx.send_replace(ValidationState::validating());

		let shared = Arc::clone(&self.inner);
		let validator = Arc::clone(&self.validator);
		inner.debounce.schedule(async move {
			dispatch_check(&shared, validator, value);
		});
	}

	/// Re-runs validation of the current input on a fresh generation.
	pub fn revalidate(&self) {
		let input = self.inner.lock().input.clone();
		self.set_input(input);
	}
}

fn dispatch_check(shared: &Arc<Mutex<ChannelInner>>, validator: Arc<dyn Validator>, value: String) {
	let deliver = Arc::clone(shared);
	let mut inner = shared.lock();
	inner.flight.dispatch(
		move |token| async move {
			tokio::select! {
				_ = token.cancelled() => None,
				verdict = validator.check(&value) => Some(verdict),
			}
		},
		move |generation, out| {
			let inner = deliver.lock();
			if !inner.flight.is_current(generation) {
				tracing::trace!(generation, "channel.discard_superseded");
				return;
			}
			let Some(verdict) = out else { return };
			let state = match verdict {
				Ok(v) if v.valid => ValidationState::settled_valid(),
				Ok(v) => ValidationState::settled_invalid(v.reason),
				Err(err) => ValidationState::settled_invalid(Some(TaskError::from_display(err).message())),
			};
			tracing::debug!(generation, valid = state.valid, "channel.settled");
			inner.tx.send_replace(state);
		},
	);
}
