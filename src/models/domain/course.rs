use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub description: String,
    pub teacher_id: Option<String>,
    #[serde(default)]
    pub student_ids: Vec<String>,
}

impl Course {
    pub fn new(name: &str, description: &str, teacher_id: &str) -> Self {
        Course {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            teacher_id: Some(teacher_id.to_string()),
            student_ids: Vec::new(),
        }
    }

    pub fn is_owned_by(&self, teacher_id: &str) -> bool {
        self.teacher_id.as_deref() == Some(teacher_id)
    }

    pub fn has_student(&self, student_id: &str) -> bool {
        self.student_ids.iter().any(|id| id == student_id)
    }
}
