use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use course_core::model::{CourseId, LessonId};

/// Record name for the completed-lesson id list.
pub const COMPLETED_LESSONS_KEY: &str = "course_progress";

/// Record name for the enrolled-course id list.
pub const ENROLLED_COURSES_KEY: &str = "enrolled_courses";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for the two durable progress records.
///
/// Each record is a flat list of id strings, written whole on every
/// save. An absent record is `Ok(None)` (the cold-start case), while a
/// present-but-unparseable record is a `Serialization` error; the
/// service layer decides how to degrade.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Read the completed-lesson record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for a malformed record, or
    /// `StorageError::Connection` when the store cannot be reached.
    async fn load_completed_lessons(&self) -> Result<Option<Vec<LessonId>>, StorageError>;

    /// Replace the completed-lesson record with the given full set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be written.
    async fn save_completed_lessons(&self, ids: &[LessonId]) -> Result<(), StorageError>;

    /// Read the enrolled-course record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for a malformed record, or
    /// `StorageError::Connection` when the store cannot be reached.
    async fn load_enrolled_courses(&self) -> Result<Option<Vec<CourseId>>, StorageError>;

    /// Replace the enrolled-course record with the given full set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be written.
    async fn save_enrolled_courses(&self, ids: &[CourseId]) -> Result<(), StorageError>;
}

pub(crate) fn encode_ids<T: serde::Serialize>(ids: &[T]) -> Result<String, StorageError> {
    serde_json::to_string(ids).map_err(|e| StorageError::Serialization(e.to_string()))
}

pub(crate) fn decode_ids<T: serde::de::DeserializeOwned>(raw: &str) -> Result<Vec<T>, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Records are kept as raw JSON strings, so tests can inject malformed
/// payloads the same way a real store could hand them back.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    records: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Store a raw record payload, bypassing encoding. Test hook for
    /// malformed-record scenarios.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` when the lock is poisoned.
    pub fn put_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn save(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), value);
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_completed_lessons(&self) -> Result<Option<Vec<LessonId>>, StorageError> {
        self.load(COMPLETED_LESSONS_KEY)?
            .map(|raw| decode_ids(&raw))
            .transpose()
    }

    async fn save_completed_lessons(&self, ids: &[LessonId]) -> Result<(), StorageError> {
        self.save(COMPLETED_LESSONS_KEY, encode_ids(ids)?)
    }

    async fn load_enrolled_courses(&self) -> Result<Option<Vec<CourseId>>, StorageError> {
        self.load(ENROLLED_COURSES_KEY)?
            .map(|raw| decode_ids(&raw))
            .transpose()
    }

    async fn save_enrolled_courses(&self, ids: &[CourseId]) -> Result<(), StorageError> {
        self.save(ENROLLED_COURSES_KEY, encode_ids(ids)?)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            progress: Arc::new(InMemoryRepository::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_both_records() {
        let repo = InMemoryRepository::new();

        repo.save_completed_lessons(&[LessonId::new("l1"), LessonId::new("l2")])
            .await
            .unwrap();
        repo.save_enrolled_courses(&[CourseId::new("c1")]).await.unwrap();

        let lessons = repo.load_completed_lessons().await.unwrap().unwrap();
        assert_eq!(lessons, vec![LessonId::new("l1"), LessonId::new("l2")]);
        let courses = repo.load_enrolled_courses().await.unwrap().unwrap();
        assert_eq!(courses, vec![CourseId::new("c1")]);
    }

    #[tokio::test]
    async fn absent_records_read_as_none() {
        let repo = InMemoryRepository::new();
        assert!(repo.load_completed_lessons().await.unwrap().is_none());
        assert!(repo.load_enrolled_courses().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_record_is_a_serialization_error() {
        let repo = InMemoryRepository::new();
        repo.put_raw(COMPLETED_LESSONS_KEY, "{not json").unwrap();

        let err = repo.load_completed_lessons().await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[tokio::test]
    async fn save_replaces_the_whole_record() {
        let repo = InMemoryRepository::new();
        repo.save_enrolled_courses(&[CourseId::new("c1"), CourseId::new("c2")])
            .await
            .unwrap();
        repo.save_enrolled_courses(&[CourseId::new("c3")]).await.unwrap();

        let courses = repo.load_enrolled_courses().await.unwrap().unwrap();
        assert_eq!(courses, vec![CourseId::new("c3")]);
    }
}
