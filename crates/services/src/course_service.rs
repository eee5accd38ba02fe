use std::sync::Arc;

use course_core::model::{Course, CourseId};
use course_core::projection::{self, CourseProgressView, LessonAccess};

use crate::catalog::CatalogProvider;
use crate::error::CatalogError;
use crate::progress_service::ProgressService;

/// Everything the course detail surface needs: the course record, its
/// derived progress, and the lock state of each lesson.
#[derive(Debug, Clone)]
pub struct CourseDetailView {
    pub course: Course,
    pub progress: CourseProgressView,
    pub lessons: Vec<LessonAccess>,
}

/// Course detail facade: read-only views plus the enroll action.
#[derive(Clone)]
pub struct CourseService {
    catalog: Arc<dyn CatalogProvider>,
    progress: ProgressService,
}

impl CourseService {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogProvider>, progress: ProgressService) -> Self {
        Self { catalog, progress }
    }

    /// Build the detail view for one course.
    ///
    /// Returns `Ok(None)` when the course does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` when the catalog cannot be read.
    pub async fn detail(&self, course_id: &CourseId) -> Result<Option<CourseDetailView>, CatalogError> {
        let Some(course) = self.catalog.get_course(course_id).await? else {
            return Ok(None);
        };
        let state = self.progress.snapshot();

        Ok(Some(CourseDetailView {
            progress: projection::project_course(&course, &state),
            lessons: projection::lesson_access(&course, &state),
            course,
        }))
    }

    /// Enroll in a course. Idempotent; unlocks every lesson.
    pub async fn enroll(&self, course_id: CourseId) {
        self.progress.enroll_course(course_id).await;
    }

    /// The single certificate gate for this course.
    ///
    /// Returns `Ok(None)` when the course does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` when the catalog cannot be read.
    pub async fn certificate_eligible(&self, course_id: &CourseId) -> Result<Option<bool>, CatalogError> {
        let Some(course) = self.catalog.get_course(course_id).await? else {
            return Ok(None);
        };
        let state = self.progress.snapshot();
        Ok(Some(projection::certificate_eligible(&course, &state)))
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use crate::catalog::StaticCatalog;
    use course_core::model::LessonId;

    fn service() -> CourseService {
        CourseService::new(Arc::new(StaticCatalog::sample()), ProgressService::in_memory())
    }

    #[tokio::test]
    async fn detail_reflects_enrollment_and_progress() {
        let svc = service();
        let id = CourseId::new("c-design-101");

        let before = svc.detail(&id).await.unwrap().unwrap();
        assert!(!before.progress.is_enrolled);
        assert!(before.lessons.iter().all(|l| l.locked));

        svc.enroll(id.clone()).await;
        svc.progress
            .mark_lesson_completed(LessonId::new("design-l1"))
            .await;

        let after = svc.detail(&id).await.unwrap().unwrap();
        assert!(after.progress.is_enrolled);
        assert_eq!(after.progress.percent, 50);
        assert!(after.lessons.iter().all(|l| !l.locked));
    }

    #[tokio::test]
    async fn unknown_course_yields_none() {
        let svc = service();
        assert!(svc.detail(&CourseId::new("missing")).await.unwrap().is_none());
        assert!(svc
            .certificate_eligible(&CourseId::new("missing"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn eligibility_needs_enrollment_and_full_completion() {
        let svc = service();
        let id = CourseId::new("c-design-101");

        svc.progress
            .mark_lesson_completed(LessonId::new("design-l1"))
            .await;
        svc.progress
            .mark_lesson_completed(LessonId::new("design-l2"))
            .await;
        assert_eq!(svc.certificate_eligible(&id).await.unwrap(), Some(false));

        svc.enroll(id.clone()).await;
        assert_eq!(svc.certificate_eligible(&id).await.unwrap(), Some(true));
    }
}
