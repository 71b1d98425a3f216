//! Two-phase optimistic mutation: tentative apply, persist, rollback.

use std::future::Future;

/// Applies a mutation optimistically and rolls back on persist failure.
///
/// `apply` runs synchronously before any await, so visible state reflects
/// the change immediately. On persist failure `resync` re-reads the
/// authoritative state *before* the error is returned, so callers can
/// surface the failure without worrying about visible-state consistency.
pub async fn optimistic<E, P, R>(apply: impl FnOnce(), persist: P, resync: R) -> Result<(), E>
where
	P: Future<Output = Result<(), E>>,
	R: Future<Output = ()>,
{
	apply();
	match persist.await {
		Ok(()) => Ok(()),
		Err(err) => {
			resync.await;
			Err(err)
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;

	use super::*;

	#[tokio::test]
	async fn apply_precedes_persist_and_success_skips_resync() {
		let events = RefCell::new(Vec::new());
		let out: Result<(), &str> = optimistic(
			|| events.borrow_mut().push("apply"),
			async {
				events.borrow_mut().push("persist");
				Ok(())
			},
			async {
				events.borrow_mut().push("resync");
			},
		)
		.await;

		assert!(out.is_ok());
		assert_eq!(*events.borrow(), vec!["apply", "persist"]);
	}

	#[tokio::test]
	async fn failure_resyncs_before_propagating() {
		let events = RefCell::new(Vec::new());
		let out: Result<(), &str> = optimistic(
			|| events.borrow_mut().push("apply"),
			async { Err("nope") },
			async {
				events.borrow_mut().push("resync");
			},
		)
		.await;

		assert_eq!(out, Err("nope"));
		assert_eq!(*events.borrow(), vec!["apply", "resync"]);
	}
}
