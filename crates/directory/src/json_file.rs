use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;

use ratebot_core::domain::quote::UserId;

use crate::{normalize_alias, validate_user_id, AliasDirectory, DirectoryError};

/// Alias directory persisted as a single JSON object (`{alias: user_id}`).
///
/// Writes serialize the whole map to a sibling temp file and rename it over
/// the original, so readers never observe a torn file. The mutex serializes
/// writers within this process; cross-process writers are out of contract.
pub struct JsonFileDirectory {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<HashMap<String, UserId>, DirectoryError> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            // A store that has never been written to is an empty directory.
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(source) => {
                return Err(DirectoryError::Read {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        };

        let entries: HashMap<String, String> =
            serde_json::from_slice(&raw).map_err(|source| DirectoryError::Decode {
                path: self.path.display().to_string(),
                source,
            })?;

        Ok(entries.into_iter().map(|(alias, id)| (alias, UserId(id))).collect())
    }

    async fn store(&self, entries: &HashMap<String, UserId>) -> Result<(), DirectoryError> {
        let plain: HashMap<&str, &str> =
            entries.iter().map(|(alias, id)| (alias.as_str(), id.0.as_str())).collect();
        let encoded = serde_json::to_vec_pretty(&plain).map_err(|source| {
            DirectoryError::Decode { path: self.path.display().to_string(), source }
        })?;

        let tmp_path = self.path.with_extension("tmp");
        let write_error = |source| DirectoryError::Write {
            path: self.path.display().to_string(),
            source,
        };

        fs::write(&tmp_path, &encoded).await.map_err(write_error)?;
        fs::rename(&tmp_path, &self.path).await.map_err(write_error)?;

        tracing::debug!(
            event_name = "directory.store.written",
            path = %self.path.display(),
            entry_count = entries.len(),
            "alias directory persisted"
        );
        Ok(())
    }
}

#[async_trait]
impl AliasDirectory for JsonFileDirectory {
    async fn lookup(&self, alias: &str) -> Result<Option<UserId>, DirectoryError> {
        let alias = normalize_alias(alias)?;
        Ok(self.load().await?.remove(alias))
    }

    async fn bind(&self, alias: &str, user_id: UserId) -> Result<(), DirectoryError> {
        let alias = normalize_alias(alias)?;
        validate_user_id(&user_id)?;

        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(alias.to_owned(), user_id);
        self.store(&entries).await
    }

    async fn list(&self) -> Result<Vec<(String, UserId)>, DirectoryError> {
        let mut listing: Vec<_> = self.load().await?.into_iter().collect();
        listing.sort_by(|left, right| left.0.cmp(&right.0));
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use ratebot_core::domain::quote::UserId;
    use tempfile::TempDir;

    use super::JsonFileDirectory;
    use crate::{AliasDirectory, DirectoryError};

    fn user(id: &str) -> UserId {
        UserId(id.to_owned())
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty_directory() {
        let dir = TempDir::new().expect("tempdir");
        let directory = JsonFileDirectory::new(dir.path().join("aliases.json"));

        assert_eq!(directory.lookup("小美").await.expect("lookup"), None);
        assert!(directory.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn bind_persists_across_instances() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("aliases.json");

        let directory = JsonFileDirectory::new(&path);
        directory.bind("小美", user("U100")).await.expect("bind");
        drop(directory);

        let reopened = JsonFileDirectory::new(&path);
        assert_eq!(reopened.lookup("小美").await.expect("lookup"), Some(user("U100")));
    }

    #[tokio::test]
    async fn bind_leaves_no_temp_file_behind() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("aliases.json");

        let directory = JsonFileDirectory::new(&path);
        directory.bind("小美", user("U100")).await.expect("bind");

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn rebinding_updates_only_that_alias() {
        let dir = TempDir::new().expect("tempdir");
        let directory = JsonFileDirectory::new(dir.path().join("aliases.json"));

        directory.bind("小美", user("U100")).await.expect("bind");
        directory.bind("阿強", user("U200")).await.expect("bind");
        directory.bind("小美", user("U300")).await.expect("rebind");

        assert_eq!(directory.lookup("小美").await.expect("lookup"), Some(user("U300")));
        assert_eq!(directory.lookup("阿強").await.expect("lookup"), Some(user("U200")));
    }

    #[tokio::test]
    async fn corrupt_file_is_a_decode_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("aliases.json");
        std::fs::write(&path, b"not json").expect("write");

        let directory = JsonFileDirectory::new(&path);
        assert!(matches!(
            directory.lookup("小美").await,
            Err(DirectoryError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn concurrent_binds_all_land() {
        let dir = TempDir::new().expect("tempdir");
        let directory =
            std::sync::Arc::new(JsonFileDirectory::new(dir.path().join("aliases.json")));

        let mut handles = Vec::new();
        for index in 0..8 {
            let directory = directory.clone();
            handles.push(tokio::spawn(async move {
                directory.bind(&format!("alias-{index}"), user(&format!("U{index}"))).await
            }));
        }
        for handle in handles {
            handle.await.expect("join").expect("bind");
        }

        assert_eq!(directory.list().await.expect("list").len(), 8);
    }
}
