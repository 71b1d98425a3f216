//! Settings synchronization for an external prose checker.
//!
//! User-editable path fields are debounced and validated through the
//! single-flight kernel in [`valet_task`]; the remote-backed rule list is
//! mutated optimistically against a [`ConfigStore`] with rollback to the
//! store's authoritative contents on failure. The crate decides nothing
//! about validity itself: [`Validator`] and [`ConfigStore`] are
//! collaborator contracts, and the implementations shipped here are
//! plug-ins for them, not kernel behavior.

mod channel;
mod error;
pub mod mutation;
mod rules;
mod session;
mod store;
mod types;
mod validate;

pub use channel::{ValidationChannel, ValidationState};
pub use error::{StoreError, ValidateError};
pub use rules::RuleList;
pub use session::SettingsSession;
pub use store::{ConfigStore, MemoryStore, TomlStore};
pub use types::{ConfigDocument, ConfigUpdate, RuleSetting, Severity};
pub use validate::{CheckerBinaryValidator, ConfigFileValidator, Validator, Verdict};
