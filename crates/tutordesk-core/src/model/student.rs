use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored shape of a student. Older files carry no `id`, so the field is
/// optional on the way in and backfilled during load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email_recipients: Vec<String>,
}

/// A registered student. `name` is the display attribute and the join key
/// used by legacy lesson records; `id` is the stable identifier new code
/// paths operate on.
#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email_recipients: Vec<String>,
}

impl StudentRecord {
    /// Promote a stored record to a [`Student`], minting an id when the
    /// record predates them. Returns whether the record changed.
    pub fn into_student(self) -> (Student, bool) {
        let changed = self.id.is_none();
        let student = Student {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            name: self.name,
            username: self.username,
            email_recipients: self.email_recipients,
        };
        (student, changed)
    }
}

impl From<&Student> for StudentRecord {
    fn from(student: &Student) -> Self {
        StudentRecord {
            id: Some(student.id),
            name: student.name.clone(),
            username: student.username.clone(),
            email_recipients: student.email_recipients.clone(),
        }
    }
}

impl Student {
    pub fn new(name: impl Into<String>, username: impl Into<String>, emails: Vec<String>) -> Self {
        Student {
            id: Uuid::new_v4(),
            name: name.into(),
            username: username.into(),
            email_recipients: emails,
        }
    }
}
