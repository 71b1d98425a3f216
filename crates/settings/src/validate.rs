use async_trait::async_trait;

use crate::error::ValidateError;

/// Outcome of a validation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
	pub valid: bool,
	pub reason: Option<String>,
}

impl Verdict {
	pub fn ok() -> Self {
		Self {
			valid: true,
			reason: None,
		}
	}

	pub fn rejected(reason: impl Into<String>) -> Self {
		Self {
			valid: false,
			reason: Some(reason.into()),
		}
	}
}

/// External checker deciding whether a field value is acceptable.
///
/// Must tolerate repeated and concurrent calls: the kernel issues one call
/// per generation and discards superseded verdicts itself. Failure is
/// communicated either as a `valid: false` verdict or by raising a
/// [`ValidateError`]; both settle the channel invalid.
#[async_trait]
pub trait Validator: Send + Sync {
	async fn check(&self, value: &str) -> Result<Verdict, ValidateError>;
}

/// Validates the checker binary field: a bare program name resolves
/// through `PATH`, an explicit path must point at a regular file.
pub struct CheckerBinaryValidator;

#[async_trait]
impl Validator for CheckerBinaryValidator {
	async fn check(&self, value: &str) -> Result<Verdict, ValidateError> {
		let value = value.trim().to_owned();
		if value.contains('/') || value.contains(std::path::MAIN_SEPARATOR) {
			return Ok(check_file(&value).await);
		}

		// PATH lookup hits the filesystem per directory; keep it off the
		// async workers.
		let name = value.clone();
		let resolved = tokio::task::spawn_blocking(move || which::which(&name).is_ok())
			.await
			.map_err(|err| ValidateError::Unavailable(err.to_string()))?;
		if resolved {
			Ok(Verdict::ok())
		} else {
			Ok(Verdict::rejected(format!("{value} was not found on PATH")))
		}
	}
}

/// Validates the config file field: the path must exist and be a file.
pub struct ConfigFileValidator;

#[async_trait]
impl Validator for ConfigFileValidator {
	async fn check(&self, value: &str) -> Result<Verdict, ValidateError> {
		Ok(check_file(value.trim()).await)
	}
}

async fn check_file(path: &str) -> Verdict {
	match tokio::fs::metadata(path).await {
		Ok(meta) if meta.is_file() => Verdict::ok(),
		Ok(_) => Verdict::rejected(format!("{path} is not a file")),
		Err(_) => Verdict::rejected(format!("{path} does not exist")),
	}
}
