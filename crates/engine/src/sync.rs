//! Persistence seam of the store.
//!
//! A [`SyncClient`] moves the whole collection at once: `load` reads the
//! stored blob, `save` overwrites it. There is no merge and no version token,
//! so concurrent saves resolve as last-write-wins.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{PersistenceError, Project, blob};

#[async_trait]
pub trait SyncClient: Send + Sync {
    /// Fetch the stored collection. Never fails: anything unreadable is an
    /// empty collection.
    async fn load(&self) -> Vec<Project>;

    /// Overwrite the stored collection with `projects`.
    async fn save(&self, projects: &[Project]) -> Result<(), PersistenceError>;
}

/// A `SyncClient` keeping the blob in memory.
#[derive(Debug, Default)]
pub struct MemorySync {
    blob: Mutex<Option<String>>,
    failure: Mutex<Option<PersistenceError>>,
    saves: Mutex<usize>,
}

impl MemorySync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already stored blob, valid or not.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
            ..Self::default()
        }
    }

    /// Current stored blob.
    pub async fn blob(&self) -> Option<String> {
        self.blob.lock().await.clone()
    }

    /// Make every following save fail with `error`, or succeed again with
    /// `None`.
    pub async fn fail_saves(&self, error: Option<PersistenceError>) {
        *self.failure.lock().await = error;
    }

    /// Number of successful saves.
    pub async fn save_count(&self) -> usize {
        *self.saves.lock().await
    }
}

#[async_trait]
impl SyncClient for MemorySync {
    async fn load(&self) -> Vec<Project> {
        blob::decode(self.blob.lock().await.as_deref())
    }

    async fn save(&self, projects: &[Project]) -> Result<(), PersistenceError> {
        if let Some(err) = self.failure.lock().await.clone() {
            return Err(err);
        }

        let encoded = blob::encode(projects)?;
        *self.blob.lock().await = Some(encoded);
        *self.saves.lock().await += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[tokio::test]
    async fn load_of_garbage_is_empty() {
        let sync = MemorySync::with_blob("not json");
        assert!(sync.load().await.is_empty());
    }

    #[tokio::test]
    async fn save_overwrites_the_whole_blob() {
        let sync = MemorySync::with_blob(r#"[{"id":9,"name":"old","deadline":"2020-01-01"}]"#);
        let projects = vec![Project {
            id: 1,
            name: "new".to_string(),
            deadline: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            is_important: false,
        }];

        sync.save(&projects).await.unwrap();

        assert_eq!(sync.load().await, projects);
        assert_eq!(sync.save_count().await, 1);
    }

    #[tokio::test]
    async fn failing_save_keeps_previous_blob() {
        let sync = MemorySync::with_blob("[]");
        sync.fail_saves(Some(PersistenceError::Server("disk full".to_string())))
            .await;

        let err = sync.save(&[]).await.unwrap_err();
        assert_eq!(err, PersistenceError::Server("disk full".to_string()));
        assert_eq!(sync.blob().await.as_deref(), Some("[]"));
        assert_eq!(sync.save_count().await, 0);
    }
}
