pub mod lesson;
pub mod status;
pub mod student;

pub use lesson::{sort_lessons, Lesson, LessonRecord, DEFAULT_DURATION_MINUTES};
pub use status::StatusGlyph;
pub use student::{Student, StudentRecord};
