use std::sync::Arc;

use course_core::model::{CourseId, Lesson, LessonId};
use course_core::projection::playback_counts_as_completed;

use crate::catalog::CatalogProvider;
use crate::error::PlayerError;
use crate::progress_service::ProgressService;

/// What the lesson player shows: the current lesson with its playlist
/// neighbors.
#[derive(Debug, Clone)]
pub struct LessonContext {
    pub course_id: CourseId,
    pub lesson: Lesson,
    /// One-based playlist number ("Lesson 2 of 4").
    pub number: usize,
    pub total_lessons: usize,
    pub previous: Option<LessonId>,
    pub next: Option<LessonId>,
    pub completed: bool,
}

/// Lesson playback facade: enforces the enrollment gate and applies the
/// playback completion policy.
#[derive(Clone)]
pub struct PlayerService {
    catalog: Arc<dyn CatalogProvider>,
    progress: ProgressService,
}

impl PlayerService {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogProvider>, progress: ProgressService) -> Self {
        Self { catalog, progress }
    }

    /// Open a lesson for playback.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::LessonLocked` when the course is not
    /// enrolled (the only gate; there is no sequential unlocking),
    /// `CourseNotFound`/`LessonNotFound` for bad ids, and
    /// `PlayerError::Catalog` when the catalog cannot be read.
    pub async fn start_lesson(
        &self,
        course_id: &CourseId,
        lesson_id: &LessonId,
    ) -> Result<LessonContext, PlayerError> {
        let course = self
            .catalog
            .get_course(course_id)
            .await?
            .ok_or_else(|| PlayerError::CourseNotFound(course_id.clone()))?;

        if !self.progress.is_course_enrolled(course_id) {
            return Err(PlayerError::LessonLocked(course_id.clone()));
        }

        let position = course
            .lesson_position(lesson_id)
            .ok_or_else(|| PlayerError::LessonNotFound(lesson_id.clone()))?;
        let lesson = course.lessons()[position].clone();

        Ok(LessonContext {
            course_id: course_id.clone(),
            number: position + 1,
            total_lessons: course.total_lessons(),
            previous: course.previous_lesson(lesson_id).map(|l| l.id().clone()),
            next: course.next_lesson(lesson_id).map(|l| l.id().clone()),
            completed: self.progress.is_lesson_completed(lesson_id),
            lesson,
        })
    }

    /// Feed an observed playback position to the completion policy.
    ///
    /// Marks the lesson completed once position reaches 90% of the
    /// duration; returns whether the lesson now counts as completed.
    /// Later crossings are no-ops thanks to the store's idempotence.
    ///
    /// # Errors
    ///
    /// Returns `CourseNotFound`/`LessonNotFound` for bad ids, and
    /// `PlayerError::Catalog` when the catalog cannot be read.
    pub async fn observe_playback(
        &self,
        course_id: &CourseId,
        lesson_id: &LessonId,
        position_secs: f64,
        duration_secs: f64,
    ) -> Result<bool, PlayerError> {
        let course = self
            .catalog
            .get_course(course_id)
            .await?
            .ok_or_else(|| PlayerError::CourseNotFound(course_id.clone()))?;
        if course.lesson(lesson_id).is_none() {
            return Err(PlayerError::LessonNotFound(lesson_id.clone()));
        }

        if playback_counts_as_completed(position_secs, duration_secs) {
            self.progress.mark_lesson_completed(lesson_id.clone()).await;
        }

        Ok(self.progress.is_lesson_completed(lesson_id))
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use crate::catalog::StaticCatalog;

    fn service() -> PlayerService {
        PlayerService::new(Arc::new(StaticCatalog::sample()), ProgressService::in_memory())
    }

    #[tokio::test]
    async fn unenrolled_courses_refuse_playback() {
        let svc = service();
        let err = svc
            .start_lesson(&CourseId::new("c-web-101"), &LessonId::new("web-l1"))
            .await
            .unwrap_err();
        assert!(matches!(err, PlayerError::LessonLocked(_)));
    }

    #[tokio::test]
    async fn enrollment_opens_every_lesson_with_siblings() {
        let svc = service();
        svc.progress.enroll_course(CourseId::new("c-web-101")).await;

        // Even a lesson after incomplete ones is playable.
        let ctx = svc
            .start_lesson(&CourseId::new("c-web-101"), &LessonId::new("web-l3"))
            .await
            .unwrap();
        assert_eq!(ctx.number, 3);
        assert_eq!(ctx.total_lessons, 4);
        assert_eq!(ctx.previous, Some(LessonId::new("web-l2")));
        assert_eq!(ctx.next, Some(LessonId::new("web-l4")));
        assert!(!ctx.completed);

        let first = svc
            .start_lesson(&CourseId::new("c-web-101"), &LessonId::new("web-l1"))
            .await
            .unwrap();
        assert_eq!(first.previous, None);
    }

    #[tokio::test]
    async fn playback_marks_completed_at_ninety_percent() {
        let svc = service();
        let course = CourseId::new("c-web-101");
        let lesson = LessonId::new("web-l1");
        svc.progress.enroll_course(course.clone()).await;

        let below = svc
            .observe_playback(&course, &lesson, 89.0, 100.0)
            .await
            .unwrap();
        assert!(!below);

        let crossed = svc
            .observe_playback(&course, &lesson, 90.0, 100.0)
            .await
            .unwrap();
        assert!(crossed);

        // Subsequent crossings stay completed and stay no-ops.
        let again = svc
            .observe_playback(&course, &lesson, 95.0, 100.0)
            .await
            .unwrap();
        assert!(again);
        assert_eq!(svc.progress.completed_lessons(), vec![lesson]);
    }

    #[tokio::test]
    async fn rejects_ids_that_do_not_match() {
        let svc = service();
        svc.progress.enroll_course(CourseId::new("c-web-101")).await;

        let err = svc
            .start_lesson(&CourseId::new("nope"), &LessonId::new("web-l1"))
            .await
            .unwrap_err();
        assert!(matches!(err, PlayerError::CourseNotFound(_)));

        // A lesson id from another course is not found here.
        let err = svc
            .start_lesson(&CourseId::new("c-web-101"), &LessonId::new("design-l1"))
            .await
            .unwrap_err();
        assert!(matches!(err, PlayerError::LessonNotFound(_)));
    }
}
