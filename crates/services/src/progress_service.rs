use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use course_core::model::{CourseId, LessonId, ProgressState};
use storage::repository::{InMemoryRepository, ProgressRepository};

#[derive(Default)]
struct Inner {
    state: ProgressState,
    loaded: bool,
}

/// The progress store: single source of truth for what the learner has
/// done, with crash-safe persistence and no derived computation.
///
/// Lifecycle: construct, call [`load`](Self::load) once per session
/// before trusting any query, then mutate through the two idempotent
/// operations. Every mutation persists the full updated record before
/// returning. Storage failures never reach the caller: a missing or
/// unreadable record cold-starts as empty state, and a failed write
/// leaves the in-memory state authoritative for the rest of the
/// session.
#[derive(Clone)]
pub struct ProgressService {
    progress: Arc<dyn ProgressRepository>,
    inner: Arc<Mutex<Inner>>,
}

impl ProgressService {
    #[must_use]
    pub fn new(progress: Arc<dyn ProgressRepository>) -> Self {
        Self {
            progress,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryRepository::new()))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock only means a panicking reader; the state
        // itself is always a consistent set.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the durable records into memory. Idempotent; safe to call
    /// again after the first completion.
    ///
    /// Absent records cold-start as empty state. Malformed records are
    /// logged and also treated as empty; a storage-format problem must
    /// not block the learner.
    pub async fn load(&self) {
        if self.is_loaded() {
            return;
        }

        let completed = match self.progress.load_completed_lessons().await {
            Ok(ids) => ids.unwrap_or_default(),
            Err(err) => {
                tracing::warn!("completed-lesson record unreadable, starting empty: {err}");
                Vec::new()
            }
        };
        let enrolled = match self.progress.load_enrolled_courses().await {
            Ok(ids) => ids.unwrap_or_default(),
            Err(err) => {
                tracing::warn!("enrolled-course record unreadable, starting empty: {err}");
                Vec::new()
            }
        };

        let mut inner = self.lock();
        if !inner.loaded {
            inner.state = ProgressState::from_parts(completed, enrolled);
            inner.loaded = true;
        }
    }

    /// True once [`load`](Self::load) has completed. Views computed
    /// before this is true are provisional and must be recomputed.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.lock().loaded
    }

    /// Record a lesson as completed and persist the full updated
    /// record. Idempotent: re-marking neither mutates nor rewrites.
    pub async fn mark_lesson_completed(&self, lesson_id: LessonId) {
        let snapshot = {
            let mut inner = self.lock();
            if !inner.state.mark_lesson_completed(lesson_id) {
                return;
            }
            sorted(inner.state.completed_lessons().iter().cloned())
        };

        if let Err(err) = self.progress.save_completed_lessons(&snapshot).await {
            tracing::warn!("failed to persist completed lessons: {err}");
        }
    }

    /// Record enrollment in a course and persist the full updated
    /// record. Idempotent: re-enrolling neither mutates nor rewrites.
    pub async fn enroll_course(&self, course_id: CourseId) {
        let snapshot = {
            let mut inner = self.lock();
            if !inner.state.enroll_course(course_id) {
                return;
            }
            sorted(inner.state.enrolled_courses().iter().cloned())
        };

        if let Err(err) = self.progress.save_enrolled_courses(&snapshot).await {
            tracing::warn!("failed to persist enrollments: {err}");
        }
    }

    #[must_use]
    pub fn is_lesson_completed(&self, lesson_id: &LessonId) -> bool {
        self.lock().state.is_lesson_completed(lesson_id)
    }

    #[must_use]
    pub fn is_course_enrolled(&self, course_id: &CourseId) -> bool {
        self.lock().state.is_course_enrolled(course_id)
    }

    /// Sorted snapshot of the completed-lesson ids.
    #[must_use]
    pub fn completed_lessons(&self) -> Vec<LessonId> {
        sorted(self.lock().state.completed_lessons().iter().cloned())
    }

    /// Sorted snapshot of the enrolled-course ids.
    #[must_use]
    pub fn enrolled_courses(&self) -> Vec<CourseId> {
        sorted(self.lock().state.enrolled_courses().iter().cloned())
    }

    /// Owned snapshot of the whole state, for the projection functions.
    #[must_use]
    pub fn snapshot(&self) -> ProgressState {
        self.lock().state.clone()
    }
}

fn sorted<T: Ord>(ids: impl Iterator<Item = T>) -> Vec<T> {
    let mut ids: Vec<T> = ids.collect();
    ids.sort();
    ids
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use storage::repository::{COMPLETED_LESSONS_KEY, StorageError};

    /// Counts writes so idempotence can be asserted at the persistence
    /// boundary, not just in memory.
    #[derive(Clone, Default)]
    struct CountingRepository {
        inner: InMemoryRepository,
        saves: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ProgressRepository for CountingRepository {
        async fn load_completed_lessons(&self) -> Result<Option<Vec<LessonId>>, StorageError> {
            self.inner.load_completed_lessons().await
        }

        async fn save_completed_lessons(&self, ids: &[LessonId]) -> Result<(), StorageError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.inner.save_completed_lessons(ids).await
        }

        async fn load_enrolled_courses(&self) -> Result<Option<Vec<CourseId>>, StorageError> {
            self.inner.load_enrolled_courses().await
        }

        async fn save_enrolled_courses(&self, ids: &[CourseId]) -> Result<(), StorageError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.inner.save_enrolled_courses(ids).await
        }
    }

    /// Repository whose writes always fail, for the swallow-and-continue
    /// policy.
    struct BrokenWrites;

    #[async_trait]
    impl ProgressRepository for BrokenWrites {
        async fn load_completed_lessons(&self) -> Result<Option<Vec<LessonId>>, StorageError> {
            Ok(None)
        }

        async fn save_completed_lessons(&self, _ids: &[LessonId]) -> Result<(), StorageError> {
            Err(StorageError::Connection("disk full".into()))
        }

        async fn load_enrolled_courses(&self) -> Result<Option<Vec<CourseId>>, StorageError> {
            Ok(None)
        }

        async fn save_enrolled_courses(&self, _ids: &[CourseId]) -> Result<(), StorageError> {
            Err(StorageError::Connection("disk full".into()))
        }
    }

    #[tokio::test]
    async fn load_is_idempotent_and_reports_loaded() {
        let service = ProgressService::in_memory();
        assert!(!service.is_loaded());

        service.load().await;
        assert!(service.is_loaded());

        service.mark_lesson_completed(LessonId::new("l1")).await;
        // A second load must not clobber in-memory state.
        service.load().await;
        assert!(service.is_lesson_completed(&LessonId::new("l1")));
    }

    #[tokio::test]
    async fn marking_twice_persists_once() {
        let repo = CountingRepository::default();
        let saves = Arc::clone(&repo.saves);
        let service = ProgressService::new(Arc::new(repo));
        service.load().await;

        service.mark_lesson_completed(LessonId::new("l1")).await;
        service.mark_lesson_completed(LessonId::new("l1")).await;

        assert_eq!(saves.load(Ordering::SeqCst), 1);
        assert_eq!(service.completed_lessons(), vec![LessonId::new("l1")]);
    }

    #[tokio::test]
    async fn enrolling_twice_persists_once() {
        let repo = CountingRepository::default();
        let saves = Arc::clone(&repo.saves);
        let service = ProgressService::new(Arc::new(repo));
        service.load().await;

        service.enroll_course(CourseId::new("c1")).await;
        service.enroll_course(CourseId::new("c1")).await;

        assert_eq!(saves.load(Ordering::SeqCst), 1);
        assert_eq!(service.enrolled_courses(), vec![CourseId::new("c1")]);
    }

    #[tokio::test]
    async fn state_survives_a_reload_through_the_repository() {
        let repo = Arc::new(InMemoryRepository::new());
        let first = ProgressService::new(Arc::clone(&repo) as Arc<dyn ProgressRepository>);
        first.load().await;
        first.enroll_course(CourseId::new("c1")).await;
        first.mark_lesson_completed(LessonId::new("l2")).await;
        first.mark_lesson_completed(LessonId::new("l1")).await;

        // A fresh session over the same store sees the same facts.
        let second = ProgressService::new(repo);
        second.load().await;
        assert!(second.is_course_enrolled(&CourseId::new("c1")));
        assert_eq!(
            second.completed_lessons(),
            vec![LessonId::new("l1"), LessonId::new("l2")]
        );
    }

    #[tokio::test]
    async fn malformed_record_cold_starts_empty() {
        let repo = InMemoryRepository::new();
        repo.put_raw(COMPLETED_LESSONS_KEY, "{corrupt").unwrap();

        let service = ProgressService::new(Arc::new(repo));
        service.load().await;

        assert!(service.is_loaded());
        assert!(service.completed_lessons().is_empty());
    }

    #[tokio::test]
    async fn write_failures_keep_in_memory_state_authoritative() {
        let service = ProgressService::new(Arc::new(BrokenWrites));
        service.load().await;

        service.mark_lesson_completed(LessonId::new("l1")).await;
        service.enroll_course(CourseId::new("c1")).await;

        assert!(service.is_lesson_completed(&LessonId::new("l1")));
        assert!(service.is_course_enrolled(&CourseId::new("c1")));
    }

    #[tokio::test]
    async fn queries_before_load_report_empty_provisional_state() {
        let repo = InMemoryRepository::new();
        repo.save_enrolled_courses(&[CourseId::new("c1")]).await.unwrap();

        let service = ProgressService::new(Arc::new(repo));
        assert!(!service.is_loaded());
        assert!(!service.is_course_enrolled(&CourseId::new("c1")));

        service.load().await;
        assert!(service.is_course_enrolled(&CourseId::new("c1")));
    }
}
