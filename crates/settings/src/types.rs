use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Severity assigned to a checker rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	Suggestion,
	#[default]
	Warning,
	Error,
}

impl Severity {
	pub fn label(&self) -> &'static str {
		match self {
			Self::Suggestion => "Suggestion",
			Self::Warning => "Warning",
			Self::Error => "Error",
		}
	}

	pub const ALL: [Severity; 3] = [Self::Suggestion, Self::Warning, Self::Error];
}

/// Per-rule override persisted in the config document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetting {
	pub id: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub severity: Severity,
	#[serde(default = "enabled_default")]
	pub enabled: bool,
}

fn enabled_default() -> bool {
	true
}

impl RuleSetting {
	pub fn new(id: impl Into<String>, severity: Severity) -> Self {
		Self {
			id: id.into(),
			description: String::new(),
			severity,
			enabled: true,
		}
	}
}

/// Persisted settings document synchronized by the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigDocument {
	pub checker_path: Option<PathBuf>,
	pub config_path: Option<PathBuf>,
	pub rules: Vec<RuleSetting>,
}

impl ConfigDocument {
	pub fn rule(&self, id: &str) -> Option<&RuleSetting> {
		self.rules.iter().find(|rule| rule.id == id)
	}

	fn rule_mut(&mut self, id: &str) -> Option<&mut RuleSetting> {
		self.rules.iter_mut().find(|rule| rule.id == id)
	}

	/// Applies `update`, returning whether anything visibly changed.
	///
	/// Rule updates naming an id absent from the document are a no-op; the
	/// caller may still have issued the save that carried them.
	pub fn apply(&mut self, update: &ConfigUpdate) -> bool {
		match update {
			ConfigUpdate::CheckerPath(path) => {
				self.checker_path = path.clone();
				true
			}
			ConfigUpdate::ConfigPath(path) => {
				self.config_path = path.clone();
				true
			}
			ConfigUpdate::RuleSeverity { id, severity } => match self.rule_mut(id) {
				Some(rule) => {
					rule.severity = *severity;
					true
				}
				None => false,
			},
			ConfigUpdate::RuleEnabled { id, enabled } => match self.rule_mut(id) {
				Some(rule) => {
					rule.enabled = *enabled;
					true
				}
				None => false,
			},
		}
	}
}

/// One persisted mutation against the config document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigUpdate {
	CheckerPath(Option<PathBuf>),
	ConfigPath(Option<PathBuf>),
	RuleSeverity { id: String, severity: Severity },
	RuleEnabled { id: String, enabled: bool },
}
