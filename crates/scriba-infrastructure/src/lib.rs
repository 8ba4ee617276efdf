//! scriba-infrastructure - credential and summary storage.
//!
//! Implements the `scriba-core` collaborator seams: `CredentialStore`
//! backed by ~/.config/scriba/secret.json and `SummarySink` backed by
//! per-meeting JSON files.

pub mod paths;
pub mod secret_storage;
pub mod summary_sink;

pub use paths::{PathError, ScribaPaths};
pub use secret_storage::{ProviderSecret, SecretConfig, SecretStorage, SecretStorageError};
pub use summary_sink::JsonSummarySink;
