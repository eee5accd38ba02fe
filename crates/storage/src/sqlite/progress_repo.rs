use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use course_core::model::{CourseId, LessonId};

use super::SqliteRepository;
use crate::repository::{
    COMPLETED_LESSONS_KEY, ENROLLED_COURSES_KEY, ProgressRepository, StorageError, decode_ids,
    encode_ids,
};

impl SqliteRepository {
    async fn load_record(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT value
            FROM progress_records
            WHERE key = ?1
            ",
        )
        .bind(key)
        .fetch_optional(self.pool())
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        match row {
            Some(row) => {
                let value: String = row
                    .try_get("value")
                    .map_err(|err| StorageError::Serialization(err.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn save_record(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO progress_records (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(self.pool())
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_completed_lessons(&self) -> Result<Option<Vec<LessonId>>, StorageError> {
        self.load_record(COMPLETED_LESSONS_KEY)
            .await?
            .map(|raw| decode_ids(&raw))
            .transpose()
    }

    async fn save_completed_lessons(&self, ids: &[LessonId]) -> Result<(), StorageError> {
        self.save_record(COMPLETED_LESSONS_KEY, &encode_ids(ids)?).await
    }

    async fn load_enrolled_courses(&self) -> Result<Option<Vec<CourseId>>, StorageError> {
        self.load_record(ENROLLED_COURSES_KEY)
            .await?
            .map(|raw| decode_ids(&raw))
            .transpose()
    }

    async fn save_enrolled_courses(&self, ids: &[CourseId]) -> Result<(), StorageError> {
        self.save_record(ENROLLED_COURSES_KEY, &encode_ids(ids)?).await
    }
}
