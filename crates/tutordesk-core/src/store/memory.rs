use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{CoreError, CoreResult};
use crate::model::{LessonRecord, StudentRecord};
use crate::store::ScheduleStore;

/// In-memory store used by tests and non-persistent runs.
#[derive(Default)]
pub struct MemoryStore {
    students: Mutex<Vec<StudentRecord>>,
    lessons: Mutex<Vec<LessonRecord>>,
    templates: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with records, bypassing the trait. Handy for tests
    /// that start from legacy data shapes.
    pub fn seed(students: Vec<StudentRecord>, lessons: Vec<LessonRecord>) -> Self {
        MemoryStore {
            students: Mutex::new(students),
            lessons: Mutex::new(lessons),
            templates: Mutex::new(HashMap::new()),
        }
    }

    pub fn put_template(&self, name: impl Into<String>, body: impl Into<String>) {
        if let Ok(mut templates) = self.templates.lock() {
            templates.insert(name.into(), body.into());
        }
    }
}

impl ScheduleStore for MemoryStore {
    fn load_students(&self) -> CoreResult<Vec<StudentRecord>> {
        self.students
            .lock()
            .map(|records| records.clone())
            .map_err(|_| CoreError::Internal("student store lock poisoned".to_string()))
    }

    fn save_students(&self, records: &[StudentRecord]) -> CoreResult<()> {
        let mut guard = self
            .students
            .lock()
            .map_err(|_| CoreError::Internal("student store lock poisoned".to_string()))?;
        *guard = records.to_vec();
        Ok(())
    }

    fn load_lessons(&self) -> CoreResult<Vec<LessonRecord>> {
        self.lessons
            .lock()
            .map(|records| records.clone())
            .map_err(|_| CoreError::Internal("lesson store lock poisoned".to_string()))
    }

    fn save_lessons(&self, records: &[LessonRecord]) -> CoreResult<()> {
        let mut guard = self
            .lessons
            .lock()
            .map_err(|_| CoreError::Internal("lesson store lock poisoned".to_string()))?;
        *guard = records.to_vec();
        Ok(())
    }

    fn load_template(&self, name: &str) -> CoreResult<String> {
        self.templates
            .lock()
            .map(|templates| templates.get(name).cloned().unwrap_or_default())
            .map_err(|_| CoreError::Internal("template store lock poisoned".to_string()))
    }
}
