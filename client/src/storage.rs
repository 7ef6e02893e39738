//! Persisted client state
//!
//! Holds what must survive between runs outside the backend: the last week
//! number each user was seen in (drives rollover) and the current session.

use crate::auth::PersistedSession;
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

#[async_trait]
pub trait StateStore: Send + Sync {
    async fn last_seen_week(&self, user_id: &str) -> ClientResult<Option<u32>>;

    async fn set_last_seen_week(&self, user_id: &str, week: u32) -> ClientResult<()>;

    async fn load_session(&self) -> ClientResult<Option<PersistedSession>>;

    async fn save_session(&self, session: &PersistedSession) -> ClientResult<()>;

    async fn clear_session(&self) -> ClientResult<()>;
}

/// Everything the client persists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<PersistedSession>,
    /// User id -> last seen week number
    #[serde(default)]
    pub last_seen_weeks: BTreeMap<String, u32>,
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoredState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: StoredState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    pub async fn snapshot(&self) -> StoredState {
        self.state.lock().await.clone()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn last_seen_week(&self, user_id: &str) -> ClientResult<Option<u32>> {
        Ok(self.state.lock().await.last_seen_weeks.get(user_id).copied())
    }

    async fn set_last_seen_week(&self, user_id: &str, week: u32) -> ClientResult<()> {
        self.state
            .lock()
            .await
            .last_seen_weeks
            .insert(user_id.to_string(), week);
        Ok(())
    }

    async fn load_session(&self) -> ClientResult<Option<PersistedSession>> {
        Ok(self.state.lock().await.session.clone())
    }

    async fn save_session(&self, session: &PersistedSession) -> ClientResult<()> {
        self.state.lock().await.session = Some(session.clone());
        Ok(())
    }

    async fn clear_session(&self) -> ClientResult<()> {
        self.state.lock().await.session = None;
        Ok(())
    }
}

// ============================================================================
// JSON file store
// ============================================================================

/// Store backed by a single JSON file
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so a crash never leaves a half-written state file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> ClientResult<StoredState> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(StoredState::default()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                ClientError::Storage(format!("Corrupt state file {}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoredState::default()),
            Err(e) => Err(storage_error(&self.path, e)),
        }
    }

    async fn write(&self, state: &StoredState) -> ClientResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error(parent, e))?;
        }
        let content = serde_json::to_string_pretty(state)
            .map_err(|e| ClientError::Storage(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| storage_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| storage_error(&self.path, e))?;
        debug!(path = %self.path.display(), "State file written");
        Ok(())
    }

    /// Read, change and write back the state under the store lock
    async fn update(&self, change: impl FnOnce(&mut StoredState) + Send) -> ClientResult<()> {
        let _guard = self.lock.lock().await;
        let mut state = self.read().await?;
        change(&mut state);
        self.write(&state).await
    }
}

fn storage_error(path: &Path, err: std::io::Error) -> ClientError {
    ClientError::Storage(format!("{}: {}", path.display(), err))
}

#[async_trait]
impl StateStore for FileStore {
    async fn last_seen_week(&self, user_id: &str) -> ClientResult<Option<u32>> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.last_seen_weeks.get(user_id).copied())
    }

    async fn set_last_seen_week(&self, user_id: &str, week: u32) -> ClientResult<()> {
        let user_id = user_id.to_string();
        self.update(move |state| {
            state.last_seen_weeks.insert(user_id, week);
        })
        .await
    }

    async fn load_session(&self) -> ClientResult<Option<PersistedSession>> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.session)
    }

    async fn save_session(&self, session: &PersistedSession) -> ClientResult<()> {
        let session = session.clone();
        self.update(move |state| state.session = Some(session)).await
    }

    async fn clear_session(&self) -> ClientResult<()> {
        self.update(|state| state.session = None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fittrack_shared::{Role, User};
    use tempfile::TempDir;

    fn persisted() -> PersistedSession {
        PersistedSession {
            user: User {
                id: "u1".to_string(),
                email: "sam@example.com".to_string(),
                name: "Sam".to_string(),
                role: Role::User,
                created_at: None,
            },
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
        }
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("state.json"));

        assert_eq!(store.last_seen_week("u1").await.unwrap(), None);
        assert!(store.load_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let store = FileStore::new(&path);
        store.set_last_seen_week("u1", 9).await.unwrap();
        store.set_last_seen_week("u2", 4).await.unwrap();
        store.save_session(&persisted()).await.unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.last_seen_week("u1").await.unwrap(), Some(9));
        assert_eq!(reopened.last_seen_week("u2").await.unwrap(), Some(4));
        assert_eq!(reopened.load_session().await.unwrap(), Some(persisted()));

        reopened.clear_session().await.unwrap();
        assert!(reopened.load_session().await.unwrap().is_none());
        assert_eq!(reopened.last_seen_week("u1").await.unwrap(), Some(9));
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let err = FileStore::new(&path).last_seen_week("u1").await.unwrap_err();
        assert_eq!(err.code(), "STORAGE_ERROR");
    }

    #[tokio::test]
    async fn test_memory_store_keys_weeks_per_user() {
        let store = MemoryStore::new();
        store.set_last_seen_week("u1", 10).await.unwrap();

        assert_eq!(store.last_seen_week("u1").await.unwrap(), Some(10));
        assert_eq!(store.last_seen_week("u2").await.unwrap(), None);
    }
}
