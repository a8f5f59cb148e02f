use crate::error::CoreResult;
use crate::model::{LessonRecord, StudentRecord};

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Persistence gateway for the scheduling data.
///
/// Loads are tolerant: they return stored records in whatever historical
/// shape the backing data has, and a missing collection reads as empty.
/// Saves rewrite the whole collection; the last writer wins.
pub trait ScheduleStore: Send + Sync {
    fn load_students(&self) -> CoreResult<Vec<StudentRecord>>;

    fn save_students(&self, records: &[StudentRecord]) -> CoreResult<()>;

    fn load_lessons(&self) -> CoreResult<Vec<LessonRecord>>;

    fn save_lessons(&self, records: &[LessonRecord]) -> CoreResult<()>;

    /// Load a named template document. A missing template reads as an
    /// empty string, never an error.
    fn load_template(&self, name: &str) -> CoreResult<String>;
}
