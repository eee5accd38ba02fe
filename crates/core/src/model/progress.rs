use std::collections::HashSet;

use crate::model::ids::{CourseId, LessonId};

/// The learner's raw progress record: which lessons have been completed
/// and which courses have been enrolled.
///
/// Both sets are append-only (there is no unenroll or un-complete
/// operation) and membership tests are O(1). Ownership lives with the
/// progress store; every other component works on snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressState {
    completed_lessons: HashSet<LessonId>,
    enrolled_courses: HashSet<CourseId>,
}

impl ProgressState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild state from persisted id lists, deduplicating as it goes.
    #[must_use]
    pub fn from_parts(
        completed_lessons: impl IntoIterator<Item = LessonId>,
        enrolled_courses: impl IntoIterator<Item = CourseId>,
    ) -> Self {
        Self {
            completed_lessons: completed_lessons.into_iter().collect(),
            enrolled_courses: enrolled_courses.into_iter().collect(),
        }
    }

    /// Record a lesson as completed.
    ///
    /// Returns `true` when the lesson was not already completed; marking
    /// an already-completed lesson is a no-op, not an error.
    pub fn mark_lesson_completed(&mut self, lesson_id: LessonId) -> bool {
        self.completed_lessons.insert(lesson_id)
    }

    /// Record enrollment in a course.
    ///
    /// Returns `true` when this is a new enrollment; re-enrolling is a
    /// no-op, not an error.
    pub fn enroll_course(&mut self, course_id: CourseId) -> bool {
        self.enrolled_courses.insert(course_id)
    }

    #[must_use]
    pub fn is_lesson_completed(&self, lesson_id: &LessonId) -> bool {
        self.completed_lessons.contains(lesson_id)
    }

    #[must_use]
    pub fn is_course_enrolled(&self, course_id: &CourseId) -> bool {
        self.enrolled_courses.contains(course_id)
    }

    #[must_use]
    pub fn completed_lessons(&self) -> &HashSet<LessonId> {
        &self.completed_lessons
    }

    #[must_use]
    pub fn enrolled_courses(&self) -> &HashSet<CourseId> {
        &self.enrolled_courses
    }

    /// Global completed-lesson count, independent of enrollment.
    #[must_use]
    pub fn total_lessons_completed(&self) -> usize {
        self.completed_lessons.len()
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marking_a_lesson_twice_keeps_one_entry() {
        let mut state = ProgressState::new();
        assert!(state.mark_lesson_completed(LessonId::new("l1")));
        assert!(!state.mark_lesson_completed(LessonId::new("l1")));
        assert_eq!(state.total_lessons_completed(), 1);
        assert!(state.is_lesson_completed(&LessonId::new("l1")));
    }

    #[test]
    fn enrolling_twice_keeps_one_entry() {
        let mut state = ProgressState::new();
        assert!(state.enroll_course(CourseId::new("c1")));
        assert!(!state.enroll_course(CourseId::new("c1")));
        assert_eq!(state.enrolled_courses().len(), 1);
        assert!(state.is_course_enrolled(&CourseId::new("c1")));
    }

    #[test]
    fn from_parts_deduplicates() {
        let state = ProgressState::from_parts(
            vec![LessonId::new("l1"), LessonId::new("l1"), LessonId::new("l2")],
            vec![CourseId::new("c1"), CourseId::new("c1")],
        );
        assert_eq!(state.total_lessons_completed(), 2);
        assert_eq!(state.enrolled_courses().len(), 1);
    }

    #[test]
    fn empty_state_answers_queries() {
        let state = ProgressState::new();
        assert!(!state.is_lesson_completed(&LessonId::new("l1")));
        assert!(!state.is_course_enrolled(&CourseId::new("c1")));
        assert_eq!(state.total_lessons_completed(), 0);
    }
}
