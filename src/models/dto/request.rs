use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    pagination::{PageRequest, DEFAULT_PAGE_LIMIT, DEFAULT_PAGE_START},
};

/// Wire format for homework deadlines.
pub const DEADLINE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 64))]
    pub name: String,

    #[validate(length(min = 1, max = 32))]
    pub username: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 64))]
    pub name: String,

    #[validate(length(min = 1, max = 256))]
    pub description: String,
}

/// Accepts `true`/`false` or their string spellings in any case.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FlexibleBool {
    Bool(bool),
    Text(String),
}

impl FlexibleBool {
    pub fn parse(&self) -> AppResult<bool> {
        match self {
            FlexibleBool::Bool(value) => Ok(*value),
            FlexibleBool::Text(text) => match text.trim().to_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(AppError::ValidationError(format!(
                    "'{}' is not a boolean",
                    text
                ))),
            },
        }
    }
}

/// Accepts a number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FlexibleCount {
    Number(i64),
    Text(String),
}

impl FlexibleCount {
    pub fn parse(&self) -> AppResult<u32> {
        let value = match self {
            FlexibleCount::Number(value) => *value,
            FlexibleCount::Text(text) => text.trim().parse::<i64>().map_err(|_| {
                AppError::ValidationError(format!("'{}' is not an integer", text))
            })?,
        };

        u32::try_from(value)
            .map_err(|_| AppError::ValidationError(format!("{} is not a valid headcount", value)))
    }
}

pub fn parse_deadline(value: &str) -> AppResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), DEADLINE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| {
            AppError::ValidationError(format!(
                "deadline '{}' does not match {}",
                value, DEADLINE_FORMAT
            ))
        })
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateHomeworkRequest {
    #[validate(length(min = 1, max = 64))]
    pub name: String,

    #[validate(length(min = 1, max = 256))]
    pub description: String,

    pub deadline: String,
    pub headcount: FlexibleCount,
    pub self_assignable: FlexibleBool,
}

/// A homework payload whose every field has been parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHomework {
    pub name: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub headcount: u32,
    pub self_assignable: bool,
}

impl TryFrom<CreateHomeworkRequest> for NewHomework {
    type Error = AppError;

    fn try_from(request: CreateHomeworkRequest) -> AppResult<Self> {
        request.validate()?;

        Ok(NewHomework {
            deadline: parse_deadline(&request.deadline)?,
            headcount: request.headcount.parse()?,
            self_assignable: request.self_assignable.parse()?,
            name: request.name,
            description: request.description,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateHomeworkRequest {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 256))]
    pub description: Option<String>,

    pub deadline: Option<String>,
    pub headcount: Option<FlexibleCount>,
    pub self_assignable: Option<FlexibleBool>,
    pub students: Option<Vec<String>>,
}

/// Parsed partial update; only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeworkChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub headcount: Option<u32>,
    pub self_assignable: Option<bool>,
    pub students: Option<Vec<String>>,
}

impl TryFrom<UpdateHomeworkRequest> for HomeworkChanges {
    type Error = AppError;

    fn try_from(request: UpdateHomeworkRequest) -> AppResult<Self> {
        request.validate()?;

        let changes = HomeworkChanges {
            deadline: request.deadline.as_deref().map(parse_deadline).transpose()?,
            headcount: request.headcount.as_ref().map(FlexibleCount::parse).transpose()?,
            self_assignable: request
                .self_assignable
                .as_ref()
                .map(FlexibleBool::parse)
                .transpose()?,
            name: request.name,
            description: request.description,
            students: request.students,
        };

        if changes == HomeworkChanges::default() {
            return Err(AppError::ValidationError(
                "at least one homework field must be supplied".to_string(),
            ));
        }

        Ok(changes)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateSolutionRequest {
    #[validate(length(max = 512))]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitSolutionParams {
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    #[validate(range(min = 1))]
    pub start: Option<i64>,

    #[validate(range(min = 1))]
    pub limit: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            start: Some(DEFAULT_PAGE_START as i64),
            limit: Some(DEFAULT_PAGE_LIMIT as i64),
        }
    }
}

impl PaginationParams {
    pub fn into_page_request(self) -> AppResult<PageRequest> {
        self.validate()?;

        let start = self.start.unwrap_or(DEFAULT_PAGE_START as i64) as u64;
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT as i64) as u64;
        PageRequest::new(start, limit)
    }
}
