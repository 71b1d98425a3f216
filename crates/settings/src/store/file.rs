use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use super::ConfigStore;
use crate::error::StoreError;
use crate::types::{ConfigDocument, ConfigUpdate};

/// TOML-backed store at a fixed path.
///
/// A missing file loads as the default document; parent directories are
/// created on first save.
pub struct TomlStore {
	path: PathBuf,
}

impl TomlStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &std::path::Path {
		&self.path
	}
}

#[async_trait]
impl ConfigStore for TomlStore {
	async fn load(&self) -> Result<ConfigDocument, StoreError> {
		match tokio::fs::read_to_string(&self.path).await {
			Ok(text) => toml::from_str(&text).map_err(|err| StoreError::Malformed(err.to_string())),
			Err(err) if err.kind() == ErrorKind::NotFound => Ok(ConfigDocument::default()),
			Err(err) => Err(StoreError::Read(err.to_string())),
		}
	}

	async fn save(&self, update: ConfigUpdate) -> Result<(), StoreError> {
		let mut doc = self.load().await?;
		doc.apply(&update);

		if let Some(parent) = self.path.parent() {
			tokio::fs::create_dir_all(parent)
				.await
				.map_err(|err| StoreError::Write(err.to_string()))?;
		}
		let text = toml::to_string(&doc).map_err(|err| StoreError::Write(err.to_string()))?;
		tokio::fs::write(&self.path, text)
			.await
			.map_err(|err| StoreError::Write(err.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::{RuleSetting, Severity};

	#[tokio::test]
	async fn missing_file_loads_default_document() {
		let dir = tempfile::tempdir().unwrap();
		let store = TomlStore::new(dir.path().join("valet.toml"));
		assert_eq!(store.load().await.unwrap(), ConfigDocument::default());
	}

	#[tokio::test]
	async fn save_then_load_round_trips_updates() {
		let dir = tempfile::tempdir().unwrap();
		let store = TomlStore::new(dir.path().join("nested").join("valet.toml"));

		store
			.save(ConfigUpdate::CheckerPath(Some("/usr/local/bin/vale".into())))
			.await
			.unwrap();

		let doc = store.load().await.unwrap();
		assert_eq!(doc.checker_path.as_deref(), Some(std::path::Path::new("/usr/local/bin/vale")));
	}

	#[tokio::test]
	async fn rule_updates_persist_through_existing_document() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("valet.toml");
		let seeded = ConfigDocument {
			rules: vec![RuleSetting::new("Vale.Terms", Severity::Suggestion)],
			..Default::default()
		};
		std::fs::write(&path, toml::to_string(&seeded).unwrap()).unwrap();

		let store = TomlStore::new(&path);
		store
			.save(ConfigUpdate::RuleSeverity {
				id: "Vale.Terms".into(),
				severity: Severity::Error,
			})
			.await
			.unwrap();

		let doc = store.load().await.unwrap();
		assert_eq!(doc.rule("Vale.Terms").unwrap().severity, Severity::Error);
	}

	#[tokio::test]
	async fn malformed_file_raises_malformed() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("valet.toml");
		std::fs::write(&path, "rules = \"not a list\"").unwrap();

		let store = TomlStore::new(&path);
		assert!(matches!(store.load().await, Err(StoreError::Malformed(_))));
	}
}
