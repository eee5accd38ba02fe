use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{CourseId, LessonId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course id cannot be empty")]
    EmptyId,

    #[error("course name cannot be empty")]
    EmptyName,

    #[error("lesson id cannot be empty")]
    EmptyLessonId,

    #[error("duplicate lesson id within course: {0}")]
    DuplicateLessonId(LessonId),
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// A single lesson in a course playlist.
///
/// `title` and `duration` are descriptive only; `duration` is a display
/// string like "30 min" and carries no authority for progress logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    id: LessonId,
    title: String,
    duration: String,
}

impl Lesson {
    #[must_use]
    pub fn new(id: LessonId, title: impl Into<String>, duration: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            duration: duration.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn duration(&self) -> &str {
        &self.duration
    }
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// An immutable catalog course.
///
/// Lesson order is significant: it defines playlist numbering, the first
/// lesson offered on "Start Learning", and prev/next sibling lookup in
/// the player. The JSON field names follow the catalog data files
/// (`name`, `coursesDtl`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    id: CourseId,
    name: String,
    #[serde(default)]
    description: String,
    category: String,
    #[serde(default)]
    image: String,
    #[serde(rename = "coursesDtl")]
    lessons: Vec<Lesson>,
}

impl Course {
    /// Create a course, validating ids and lesson-id uniqueness.
    ///
    /// # Errors
    ///
    /// Returns `CourseError` when the course id or name is empty, a
    /// lesson id is empty, or two lessons share an id.
    pub fn new(
        id: CourseId,
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        image: impl Into<String>,
        lessons: Vec<Lesson>,
    ) -> Result<Self, CourseError> {
        if id.as_str().trim().is_empty() {
            return Err(CourseError::EmptyId);
        }
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CourseError::EmptyName);
        }
        for (idx, lesson) in lessons.iter().enumerate() {
            if lesson.id().as_str().trim().is_empty() {
                return Err(CourseError::EmptyLessonId);
            }
            if lessons[..idx].iter().any(|prior| prior.id() == lesson.id()) {
                return Err(CourseError::DuplicateLessonId(lesson.id().clone()));
            }
        }

        Ok(Self {
            id,
            name,
            description: description.into(),
            category: category.into(),
            image: image.into(),
            lessons,
        })
    }

    #[must_use]
    pub fn id(&self) -> &CourseId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Lessons in playlist order.
    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    #[must_use]
    pub fn total_lessons(&self) -> usize {
        self.lessons.len()
    }

    /// Zero-based playlist position of a lesson.
    #[must_use]
    pub fn lesson_position(&self, lesson_id: &LessonId) -> Option<usize> {
        self.lessons.iter().position(|l| l.id() == lesson_id)
    }

    #[must_use]
    pub fn lesson(&self, lesson_id: &LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id() == lesson_id)
    }

    /// First lesson of the playlist, offered on "Start/Continue Learning".
    #[must_use]
    pub fn first_lesson(&self) -> Option<&Lesson> {
        self.lessons.first()
    }

    /// Playlist sibling before the given lesson, if any.
    #[must_use]
    pub fn previous_lesson(&self, lesson_id: &LessonId) -> Option<&Lesson> {
        let pos = self.lesson_position(lesson_id)?;
        pos.checked_sub(1).and_then(|prev| self.lessons.get(prev))
    }

    /// Playlist sibling after the given lesson, if any.
    #[must_use]
    pub fn next_lesson(&self, lesson_id: &LessonId) -> Option<&Lesson> {
        let pos = self.lesson_position(lesson_id)?;
        self.lessons.get(pos + 1)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
