//! Alias directory - nickname to user-identifier mapping
//!
//! Operators address users by a human-chosen alias instead of a raw
//! platform identifier. This crate owns that mapping behind the
//! [`AliasDirectory`] trait:
//! - **JSON file** (`json_file`) - single-file store with atomic
//!   rename-on-write, the production default
//! - **In-memory** - for tests and wiring without persistence
//!
//! The core never mutates the directory; only privileged bind commands
//! write to it.

pub mod json_file;

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use ratebot_core::domain::quote::UserId;

pub use json_file::JsonFileDirectory;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("alias must not be empty")]
    InvalidAlias,
    #[error("user id must not be empty")]
    InvalidUserId,
    #[error("could not read directory file `{path}`: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("could not write directory file `{path}`: {source}")]
    Write { path: String, source: std::io::Error },
    #[error("directory file `{path}` is not a valid alias map: {source}")]
    Decode { path: String, source: serde_json::Error },
}

/// Key-value directory of alias -> opaque user identifier.
///
/// `bind` overwrites an existing alias; writes are at-least-once
/// consistent, so a crashed write never leaves a half-updated map behind.
#[async_trait]
pub trait AliasDirectory: Send + Sync {
    async fn lookup(&self, alias: &str) -> Result<Option<UserId>, DirectoryError>;
    async fn bind(&self, alias: &str, user_id: UserId) -> Result<(), DirectoryError>;
    async fn list(&self) -> Result<Vec<(String, UserId)>, DirectoryError>;
}

pub(crate) fn normalize_alias(alias: &str) -> Result<&str, DirectoryError> {
    let trimmed = alias.trim();
    if trimmed.is_empty() {
        return Err(DirectoryError::InvalidAlias);
    }
    Ok(trimmed)
}

pub(crate) fn validate_user_id(user_id: &UserId) -> Result<(), DirectoryError> {
    if user_id.0.trim().is_empty() {
        return Err(DirectoryError::InvalidUserId);
    }
    Ok(())
}

#[derive(Default)]
pub struct InMemoryDirectory {
    entries: Mutex<HashMap<String, UserId>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AliasDirectory for InMemoryDirectory {
    async fn lookup(&self, alias: &str) -> Result<Option<UserId>, DirectoryError> {
        let alias = normalize_alias(alias)?;
        Ok(self.entries.lock().await.get(alias).cloned())
    }

    async fn bind(&self, alias: &str, user_id: UserId) -> Result<(), DirectoryError> {
        let alias = normalize_alias(alias)?;
        validate_user_id(&user_id)?;
        self.entries.lock().await.insert(alias.to_owned(), user_id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<(String, UserId)>, DirectoryError> {
        let entries = self.entries.lock().await;
        let mut listing: Vec<_> =
            entries.iter().map(|(alias, id)| (alias.clone(), id.clone())).collect();
        listing.sort_by(|left, right| left.0.cmp(&right.0));
        Ok(listing)
    }
}
