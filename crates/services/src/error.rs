//! Shared error types for the services crate.

use thiserror::Error;

use course_core::model::{CourseId, LessonId};
use storage::sqlite::SqliteInitError;

/// Errors emitted by catalog providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("catalog data is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors emitted by `PlayerService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlayerError {
    #[error("course not found: {0}")]
    CourseNotFound(CourseId),
    #[error("lesson {0} does not belong to the requested course")]
    LessonNotFound(LessonId),
    #[error("lessons are locked until enrollment in course {0}")]
    LessonLocked(CourseId),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors emitted by `CertificateService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CertificateError {
    #[error("course not found: {0}")]
    CourseNotFound(CourseId),
    #[error("course {0} is not certificate-eligible; finish the course first")]
    NotEligible(CourseId),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
