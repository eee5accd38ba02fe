use std::sync::Arc;

use chrono::{DateTime, Utc};

use course_core::Clock;
use course_core::model::CourseId;
use course_core::projection::certificate_eligible;

use crate::catalog::CatalogProvider;
use crate::error::CertificateError;
use crate::progress_service::ProgressService;

/// An issued certificate, ready for the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub course_id: CourseId,
    pub course_name: String,
    /// Six-digit serial derived from the issue instant.
    pub serial: String,
    pub issued_at: DateTime<Utc>,
}

/// The certificate gate: issues a certificate only for an enrolled
/// course standing at exactly 100%; anything else sends the caller back
/// to the course.
#[derive(Clone)]
pub struct CertificateService {
    clock: Clock,
    catalog: Arc<dyn CatalogProvider>,
    progress: ProgressService,
}

impl CertificateService {
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<dyn CatalogProvider>, progress: ProgressService) -> Self {
        Self {
            clock,
            catalog,
            progress,
        }
    }

    /// Issue a certificate for a completed course.
    ///
    /// # Errors
    ///
    /// Returns `CertificateError::NotEligible` when the course is not
    /// enrolled or not at 100% (the caller should send the user back to
    /// the course), `CourseNotFound` for an unknown id, and
    /// `CertificateError::Catalog` when the catalog cannot be read.
    pub async fn issue(&self, course_id: &CourseId) -> Result<Certificate, CertificateError> {
        let course = self
            .catalog
            .get_course(course_id)
            .await?
            .ok_or_else(|| CertificateError::CourseNotFound(course_id.clone()))?;

        let state = self.progress.snapshot();
        if !certificate_eligible(&course, &state) {
            return Err(CertificateError::NotEligible(course_id.clone()));
        }

        let issued_at = self.clock.now();
        Ok(Certificate {
            course_id: course_id.clone(),
            course_name: course.name().to_string(),
            serial: serial_from_instant(issued_at),
            issued_at,
        })
    }
}

/// Last six digits of the unix-millisecond timestamp, zero-padded.
fn serial_from_instant(at: DateTime<Utc>) -> String {
    format!("{:06}", at.timestamp_millis().rem_euclid(1_000_000))
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use crate::catalog::StaticCatalog;
    use course_core::model::LessonId;
    use course_core::time::fixed_clock;

    fn service() -> CertificateService {
        CertificateService::new(
            fixed_clock(),
            Arc::new(StaticCatalog::sample()),
            ProgressService::in_memory(),
        )
    }

    #[tokio::test]
    async fn refuses_unknown_and_unfinished_courses() {
        let svc = service();

        let err = svc.issue(&CourseId::new("missing")).await.unwrap_err();
        assert!(matches!(err, CertificateError::CourseNotFound(_)));

        let id = CourseId::new("c-design-101");
        svc.progress.enroll_course(id.clone()).await;
        svc.progress
            .mark_lesson_completed(LessonId::new("design-l1"))
            .await;

        let err = svc.issue(&id).await.unwrap_err();
        assert!(matches!(err, CertificateError::NotEligible(_)));
    }

    #[tokio::test]
    async fn refuses_completion_without_enrollment() {
        let svc = service();
        let id = CourseId::new("c-design-101");
        for lesson in ["design-l1", "design-l2"] {
            svc.progress.mark_lesson_completed(LessonId::new(lesson)).await;
        }

        let err = svc.issue(&id).await.unwrap_err();
        assert!(matches!(err, CertificateError::NotEligible(_)));
    }

    #[tokio::test]
    async fn issues_with_deterministic_serial_and_instant() {
        let svc = service();
        let id = CourseId::new("c-design-101");
        svc.progress.enroll_course(id.clone()).await;
        for lesson in ["design-l1", "design-l2"] {
            svc.progress.mark_lesson_completed(LessonId::new(lesson)).await;
        }

        let cert = svc.issue(&id).await.unwrap();
        assert_eq!(cert.course_name, "Design Thinking Basics");
        assert_eq!(cert.issued_at, course_core::time::fixed_now());
        // 1_700_000_000_000 ms → last six digits.
        assert_eq!(cert.serial, "000000");
        assert_eq!(cert.serial.len(), 6);
    }
}
