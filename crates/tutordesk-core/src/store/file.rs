use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::model::{LessonRecord, StudentRecord};
use crate::store::ScheduleStore;

const DATA_FILENAME: &str = "data.json";

/// JSON-file backed store rooted at a resources directory.
///
/// Layout: `schedules/data.json`, `students/data.json` and free-form
/// template files under `templates/`.
#[derive(Clone)]
pub struct FileStore {
    resources_dir: PathBuf,
}

impl FileStore {
    pub fn new(resources_dir: PathBuf) -> Self {
        Self { resources_dir }
    }

    pub fn schedules_path(&self) -> PathBuf {
        self.resources_dir.join("schedules").join(DATA_FILENAME)
    }

    pub fn students_path(&self) -> PathBuf {
        self.resources_dir.join("students").join(DATA_FILENAME)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.resources_dir.join("templates")
    }

    fn read_collection<T: DeserializeOwned>(&self, path: &Path) -> CoreResult<Vec<T>> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => {
                return Err(CoreError::Storage(format!(
                    "failed to read {}: {error}",
                    path.display()
                )))
            }
        };
        match serde_json::from_str(&data) {
            Ok(items) => Ok(items),
            Err(error) => {
                tracing::warn!("unreadable collection {}: {error}", path.display());
                Ok(Vec::new())
            }
        }
    }

    fn write_collection<T: Serialize>(&self, path: &Path, items: &[T]) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                CoreError::Storage(format!(
                    "failed to create directory {}: {error}",
                    parent.display()
                ))
            })?;
        }
        let data = serde_json::to_string_pretty(items)
            .map_err(|error| CoreError::Serialization(error.to_string()))?;
        std::fs::write(path, data).map_err(|error| {
            CoreError::Storage(format!("failed to write {}: {error}", path.display()))
        })?;
        tracing::info!("wrote {} record(s) to {}", items.len(), path.display());
        Ok(())
    }
}

impl ScheduleStore for FileStore {
    fn load_students(&self) -> CoreResult<Vec<StudentRecord>> {
        self.read_collection(&self.students_path())
    }

    fn save_students(&self, records: &[StudentRecord]) -> CoreResult<()> {
        self.write_collection(&self.students_path(), records)
    }

    fn load_lessons(&self) -> CoreResult<Vec<LessonRecord>> {
        self.read_collection(&self.schedules_path())
    }

    fn save_lessons(&self, records: &[LessonRecord]) -> CoreResult<()> {
        self.write_collection(&self.schedules_path(), records)
    }

    fn load_template(&self, name: &str) -> CoreResult<String> {
        validate_template_name(name)?;
        let path = self.templates_dir().join(name);
        match std::fs::read_to_string(&path) {
            Ok(template) => Ok(template),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(error) => Err(CoreError::Storage(format!(
                "failed to read template {}: {error}",
                path.display()
            ))),
        }
    }
}

fn validate_template_name(name: &str) -> CoreResult<()> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(CoreError::InvalidInput(format!(
            "invalid template name {name}"
        )));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(CoreError::InvalidInput(format!(
            "invalid template name {name}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Student;
    use tempfile::tempdir;

    #[test]
    fn missing_collections_read_as_empty() {
        let dir = tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().to_path_buf());

        assert!(store.load_students().expect("load").is_empty());
        assert!(store.load_lessons().expect("load").is_empty());
    }

    #[test]
    fn saves_and_reloads_students() {
        let dir = tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().to_path_buf());
        let records = vec![StudentRecord::from(&Student::new(
            "Ana",
            "ana01",
            vec!["ana@example.com".to_string()],
        ))];

        store.save_students(&records).expect("save");
        let loaded = store.load_students().expect("load");
        assert_eq!(loaded, records);
    }

    #[test]
    fn corrupt_json_reads_as_empty() {
        let dir = tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().to_path_buf());
        let path = store.schedules_path();
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path, "{not json").expect("write");

        assert!(store.load_lessons().expect("load").is_empty());
    }

    #[test]
    fn legacy_lesson_file_parses() {
        let dir = tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().to_path_buf());
        let path = store.schedules_path();
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(
            &path,
            r#"[{"name": "Ana", "time": "2025-01-01 10:00", "duration": 60, "status": "pending"}]"#,
        )
        .expect("write");

        let records = store.load_lessons().expect("load");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status.as_deref(), Some("pending"));
        assert!(records[0].id.is_none());
    }

    #[test]
    fn missing_template_reads_as_empty_string() {
        let dir = tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().to_path_buf());
        assert_eq!(store.load_template("gmail.html").expect("load"), "");
    }

    #[test]
    fn reads_existing_template() {
        let dir = tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().to_path_buf());
        std::fs::create_dir_all(store.templates_dir()).expect("mkdir");
        std::fs::write(store.templates_dir().join("gmail.html"), "<p>{{DATE}}</p>")
            .expect("write");

        assert_eq!(
            store.load_template("gmail.html").expect("load"),
            "<p>{{DATE}}</p>"
        );
    }

    #[test]
    fn rejects_template_names_that_escape_the_directory() {
        let dir = tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().to_path_buf());
        let err = store.load_template("../secrets").expect_err("invalid name");
        match err {
            CoreError::InvalidInput(_) => {}
            other => panic!("expected invalid input, got {other:?}"),
        }
    }
}
