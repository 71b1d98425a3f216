use thiserror::Error;

/// Failure reported by a dispatched operation.
///
/// Consumers surface the message verbatim; failures that render blank are
/// substituted with the literal `Unknown error` so the surfaced text is
/// never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
	#[error("{0}")]
	Message(String),
	#[error("Unknown error")]
	Unknown,
}

impl TaskError {
	/// Normalizes any displayable failure into a surfaceable error.
	pub fn from_display(err: impl std::fmt::Display) -> Self {
		let message = err.to_string();
		if message.trim().is_empty() {
			Self::Unknown
		} else {
			Self::Message(message)
		}
	}

	/// Message surfaced to the consumer.
	pub fn message(&self) -> String {
		self.to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn displayable_failures_keep_their_message() {
		let err = TaskError::from_display("disk on fire");
		assert_eq!(err.message(), "disk on fire");
	}

	#[test]
	fn blank_failures_become_unknown_error() {
		assert_eq!(TaskError::from_display("").message(), "Unknown error");
		assert_eq!(TaskError::from_display("   ").message(), "Unknown error");
	}
}
