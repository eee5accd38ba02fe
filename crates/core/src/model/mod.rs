mod blog;
mod course;
mod ids;
mod progress;

pub use blog::BlogPost;
pub use course::{Course, CourseError, Lesson};
pub use ids::{BlogPostId, CourseId, LessonId};
pub use progress::ProgressState;
