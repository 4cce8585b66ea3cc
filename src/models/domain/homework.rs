use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Homework {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub deadline: DateTime<Utc>,
    pub headcount: u32,
    pub self_assignable: bool,
    pub course_id: String,
    #[serde(default)]
    pub student_ids: Vec<String>,
}

impl Homework {
    pub fn new(
        name: &str,
        description: &str,
        deadline: DateTime<Utc>,
        headcount: u32,
        self_assignable: bool,
        course_id: &str,
    ) -> Self {
        Homework {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            deadline,
            headcount,
            self_assignable,
            course_id: course_id.to_string(),
            student_ids: Vec::new(),
        }
    }

    pub fn has_student(&self, student_id: &str) -> bool {
        self.student_ids.iter().any(|id| id == student_id)
    }

    pub fn is_full(&self) -> bool {
        self.student_ids.len() >= self.headcount as usize
    }
}
