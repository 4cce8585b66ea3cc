use serde::Serialize;

use crate::models::{
    domain::{Course, Homework, Solution, User},
    dto::request::DEADLINE_FORMAT,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub name: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto {
            id: user.id,
            username: user.username,
            name: user.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub teacher: Option<String>,
}

impl CourseDto {
    pub fn new(course: Course, teacher_name: Option<String>) -> Self {
        CourseDto {
            id: course.id,
            name: course.name,
            description: course.description,
            teacher: teacher_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeworkDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub deadline: String,
    pub headcount: u32,
    pub self_assignable: bool,
    pub course: Option<String>,
}

impl HomeworkDto {
    pub fn new(homework: Homework, course_name: Option<String>) -> Self {
        HomeworkDto {
            id: homework.id,
            name: homework.name,
            description: homework.description,
            deadline: homework.deadline.format(DEADLINE_FORMAT).to_string(),
            headcount: homework.headcount,
            self_assignable: homework.self_assignable,
            course: course_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolutionDto {
    pub id: String,
    pub submitted_at: String,
    pub status: Option<String>,
}

impl From<Solution> for SolutionDto {
    fn from(solution: Solution) -> Self {
        SolutionDto {
            id: solution.id,
            submitted_at: solution.submitted_at.format(DEADLINE_FORMAT).to_string(),
            status: solution.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SolutionResponse {
    pub solution: SolutionDto,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
