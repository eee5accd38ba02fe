//! Pure derivation from raw progress state plus catalog data.
//!
//! Everything here is stateless and side-effect free: the same
//! `(Course, ProgressState)` inputs always produce the same view, so
//! presentation surfaces can recompute on every read.

use crate::model::{Course, LessonId, ProgressState};

/// Fraction of a lesson's playback that must be observed before the
/// lesson counts as completed.
pub const PLAYBACK_COMPLETION_THRESHOLD: f64 = 0.9;

/// Playback completion policy: true once observed position reaches 90%
/// of the total duration. Non-positive durations never complete.
#[must_use]
pub fn playback_counts_as_completed(position_secs: f64, duration_secs: f64) -> bool {
    if duration_secs <= 0.0 {
        return false;
    }
    position_secs / duration_secs >= PLAYBACK_COMPLETION_THRESHOLD
}

/// Per-course completion view, recomputed on every read and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseProgressView {
    pub total_lessons: usize,
    pub completed_count: usize,
    /// Rounded completion percentage, 0–100. A course with no lessons
    /// reports 0.
    pub percent: u8,
    pub is_enrolled: bool,
    /// True exactly when `percent == 100`.
    pub is_complete: bool,
}

/// Share of the learner's enrolled courses belonging to one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryShare {
    pub category: String,
    pub percent: u8,
}

/// Aggregate statistics across the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateStats {
    /// Global completed-lesson count, independent of enrollment.
    pub total_lessons_completed: usize,
    pub enrolled_courses: usize,
    /// Enrolled courses standing at 100% completion.
    pub total_certificates: usize,
    /// Category shares of enrolled courses, in first-seen order. Empty
    /// when nothing is enrolled.
    pub category_distribution: Vec<CategoryShare>,
}

/// Lock state for one lesson of a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonAccess {
    pub lesson_id: LessonId,
    pub locked: bool,
}

fn rounded_percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = (part as f64 / whole as f64 * 100.0).round() as u8;
    percent
}

/// Derive the completion view for one course.
///
/// Only lessons belonging to this course are counted: each lesson id is
/// tested against the completed set, rather than intersecting the sets,
/// so a matching id in some other course can never inflate the count.
#[must_use]
pub fn project_course(course: &Course, state: &ProgressState) -> CourseProgressView {
    let total_lessons = course.total_lessons();
    let completed_count = course
        .lessons()
        .iter()
        .filter(|lesson| state.is_lesson_completed(lesson.id()))
        .count();
    let percent = rounded_percent(completed_count, total_lessons);

    CourseProgressView {
        total_lessons,
        completed_count,
        percent,
        is_enrolled: state.is_course_enrolled(course.id()),
        is_complete: percent == 100,
    }
}

/// Derive cross-course statistics for the account dashboard.
#[must_use]
pub fn project_aggregate(courses: &[Course], state: &ProgressState) -> AggregateStats {
    let enrolled: Vec<&Course> = courses
        .iter()
        .filter(|course| state.is_course_enrolled(course.id()))
        .collect();

    let total_certificates = enrolled
        .iter()
        .filter(|course| project_course(course, state).is_complete)
        .count();

    // Category counts in first-seen order, for deterministic output.
    let mut counts: Vec<(String, usize)> = Vec::new();
    for course in &enrolled {
        match counts.iter_mut().find(|(cat, _)| cat == course.category()) {
            Some((_, count)) => *count += 1,
            None => counts.push((course.category().to_string(), 1)),
        }
    }
    let category_distribution = counts
        .into_iter()
        .map(|(category, count)| CategoryShare {
            category,
            percent: rounded_percent(count, enrolled.len()),
        })
        .collect();

    AggregateStats {
        total_lessons_completed: state.total_lessons_completed(),
        enrolled_courses: enrolled.len(),
        total_certificates,
        category_distribution,
    }
}

/// Lock state for every lesson of a course, in playlist order.
///
/// A two-state gate: all lessons are locked until the course is
/// enrolled, and all are unlocked afterwards. There is no per-lesson
/// sequential unlocking, and no transition back to locked.
#[must_use]
pub fn lesson_access(course: &Course, state: &ProgressState) -> Vec<LessonAccess> {
    let locked = !state.is_course_enrolled(course.id());
    course
        .lessons()
        .iter()
        .map(|lesson| LessonAccess {
            lesson_id: lesson.id().clone(),
            locked,
        })
        .collect()
}

/// The single certificate gate: enrolled and at exactly 100%.
#[must_use]
pub fn certificate_eligible(course: &Course, state: &ProgressState) -> bool {
    state.is_course_enrolled(course.id()) && project_course(course, state).percent == 100
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
