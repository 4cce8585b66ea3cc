use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Solution {
    pub id: String,
    pub homework_id: String,
    pub student_id: String,
    pub file_path: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Solution {
    pub fn new(homework_id: &str, student_id: &str, file_path: &str) -> Self {
        Solution {
            id: Uuid::new_v4().to_string(),
            homework_id: homework_id.to_string(),
            student_id: student_id.to_string(),
            file_path: file_path.to_string(),
            submitted_at: Utc::now(),
            status: None,
        }
    }
}
