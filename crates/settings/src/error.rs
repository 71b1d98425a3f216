use thiserror::Error;

/// Failure raised by a [`crate::Validator`] collaborator.
///
/// Raised failures and explicit invalid verdicts surface identically as
/// the channel's error text; no retry policy distinguishes them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidateError {
	#[error("{0}")]
	Failed(String),
	#[error("validator unavailable: {0}")]
	Unavailable(String),
}

/// Failure raised by a [`crate::ConfigStore`] collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
	#[error("failed to read config: {0}")]
	Read(String),
	#[error("failed to write config: {0}")]
	Write(String),
	#[error("malformed config: {0}")]
	Malformed(String),
}
