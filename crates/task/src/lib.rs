//! Debounced, cancelable asynchronous task coordination.
//!
//! Goals:
//! - debounce (coalesce a burst of change signals into one settled trigger)
//! - single-flight per channel (a new dispatch supersedes the previous one)
//! - generation gating (a superseded completion is never delivered)
//! - lifecycle teardown (nothing is delivered after the owner is destroyed)
//!
//! Cancellation here is compare-then-discard: it suppresses the *effect* of
//! a stale result. The underlying work is only stopped early when the
//! operation honors its [`TaskToken`].

mod debounce;
mod error;
mod flight;
mod lifecycle;
mod task;

pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use error::TaskError;
pub use flight::{FlightDeck, GenerationClock, TaskToken};
pub use lifecycle::{Lifecycle, LifecycleGuard};
pub use task::{AsyncOperationState, AsyncTask};
