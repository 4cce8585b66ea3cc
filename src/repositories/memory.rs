//! Process-local repositories backed by `RwLock<HashMap>`.
//!
//! They honour the same uniqueness rules and orderings as the MongoDB
//! repositories and are used for tests and for `DATA_STORE=memory`.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Course, Homework, Solution, User},
    repositories::{
        filters::{CourseFilter, HomeworkFilter, SolutionFilter, UserFilter},
        CourseRepository, HomeworkRepository, SolutionRepository, UserRepository,
    },
};

type Table<T> = Arc<RwLock<HashMap<String, T>>>;

fn slice<T>(items: Vec<T>, skip: u64, take: u64) -> Vec<T> {
    items
        .into_iter()
        .skip(usize::try_from(skip).unwrap_or(usize::MAX))
        .take(usize::try_from(take).unwrap_or(usize::MAX))
        .collect()
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Table<User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unique(users: &HashMap<String, User>, user: &User) -> AppResult<()> {
        for other in users.values().filter(|other| other.id != user.id) {
            if other.username == user.username {
                return Err(AppError::AlreadyExists(format!(
                    "User with username '{}' already exists",
                    user.username
                )));
            }
            if user.token.is_some() && other.token == user.token {
                return Err(AppError::AlreadyExists(
                    "Token is already bound to another user".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.id) {
            return Err(AppError::AlreadyExists(format!(
                "User with id '{}' already exists",
                user.id
            )));
        }
        Self::check_unique(&users, &user)?;

        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.token.as_deref() == Some(token))
            .cloned())
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(AppError::NotFound(format!(
                "User with id '{}' not found",
                user.id
            )));
        }
        Self::check_unique(&users, &user)?;

        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn set_token(&self, id: &str, token: &str, expiration: DateTime<Utc>) -> AppResult<()> {
        let mut users = self.users.write().await;

        if users
            .values()
            .any(|other| other.id != id && other.token.as_deref() == Some(token))
        {
            return Err(AppError::AlreadyExists(
                "Token is already bound to another user".to_string(),
            ));
        }

        let user = users
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", id)))?;
        user.token = Some(token.to_string());
        user.token_expiration = Some(expiration);
        Ok(())
    }

    async fn set_token_expiration(&self, id: &str, expiration: DateTime<Utc>) -> AppResult<()> {
        let mut users = self.users.write().await;

        let user = users
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", id)))?;
        user.token_expiration = Some(expiration);
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let mut users = self.users.write().await;
        Ok(users.remove(id).is_some())
    }

    async fn count(&self, filter: UserFilter) -> AppResult<u64> {
        let users = self.users.read().await;
        Ok(users.values().filter(|u| filter.matches(u)).count() as u64)
    }

    async fn list(&self, filter: UserFilter, skip: u64, take: u64) -> AppResult<Vec<User>> {
        let users = self.users.read().await;
        let mut items: Vec<_> = users.values().filter(|u| filter.matches(u)).cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(slice(items, skip, take))
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCourseRepository {
    courses: Table<Course>,
}

impl InMemoryCourseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unique(courses: &HashMap<String, Course>, course: &Course) -> AppResult<()> {
        let duplicate = courses
            .values()
            .any(|other| other.id != course.id && other.name == course.name);
        if duplicate {
            return Err(AppError::AlreadyExists(format!(
                "Course with name '{}' already exists",
                course.name
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn create(&self, course: Course) -> AppResult<Course> {
        let mut courses = self.courses.write().await;
        Self::check_unique(&courses, &course)?;
        courses.insert(course.id.clone(), course.clone());
        Ok(course)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Course>> {
        let courses = self.courses.read().await;
        Ok(courses.get(id).cloned())
    }

    async fn update(&self, course: Course) -> AppResult<Course> {
        let mut courses = self.courses.write().await;

        if !courses.contains_key(&course.id) {
            return Err(AppError::NotFound(format!(
                "Course with id '{}' not found",
                course.id
            )));
        }
        Self::check_unique(&courses, &course)?;

        courses.insert(course.id.clone(), course.clone());
        Ok(course)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let mut courses = self.courses.write().await;
        Ok(courses.remove(id).is_some())
    }

    async fn count(&self, filter: CourseFilter) -> AppResult<u64> {
        let courses = self.courses.read().await;
        Ok(courses.values().filter(|c| filter.matches(c)).count() as u64)
    }

    async fn list(&self, filter: CourseFilter, skip: u64, take: u64) -> AppResult<Vec<Course>> {
        let courses = self.courses.read().await;
        let mut items: Vec<_> = courses.values().filter(|c| filter.matches(c)).cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(slice(items, skip, take))
    }

    async fn remove_student(&self, student_id: &str) -> AppResult<()> {
        let mut courses = self.courses.write().await;
        for course in courses.values_mut() {
            course.student_ids.retain(|id| id != student_id);
        }
        Ok(())
    }

    async fn clear_teacher(&self, teacher_id: &str) -> AppResult<()> {
        let mut courses = self.courses.write().await;
        for course in courses.values_mut() {
            if course.is_owned_by(teacher_id) {
                course.teacher_id = None;
            }
        }
        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryHomeworkRepository {
    homeworks: Table<Homework>,
}

impl InMemoryHomeworkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unique(homeworks: &HashMap<String, Homework>, homework: &Homework) -> AppResult<()> {
        let duplicate = homeworks
            .values()
            .any(|other| other.id != homework.id && other.name == homework.name);
        if duplicate {
            return Err(AppError::AlreadyExists(format!(
                "Homework with name '{}' already exists",
                homework.name
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl HomeworkRepository for InMemoryHomeworkRepository {
    async fn create(&self, homework: Homework) -> AppResult<Homework> {
        let mut homeworks = self.homeworks.write().await;
        Self::check_unique(&homeworks, &homework)?;
        homeworks.insert(homework.id.clone(), homework.clone());
        Ok(homework)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Homework>> {
        let homeworks = self.homeworks.read().await;
        Ok(homeworks.get(id).cloned())
    }

    async fn update(&self, homework: Homework) -> AppResult<Homework> {
        let mut homeworks = self.homeworks.write().await;

        if !homeworks.contains_key(&homework.id) {
            return Err(AppError::NotFound(format!(
                "Homework with id '{}' not found",
                homework.id
            )));
        }
        Self::check_unique(&homeworks, &homework)?;

        homeworks.insert(homework.id.clone(), homework.clone());
        Ok(homework)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let mut homeworks = self.homeworks.write().await;
        Ok(homeworks.remove(id).is_some())
    }

    async fn delete_by_course(&self, course_id: &str) -> AppResult<Vec<String>> {
        let mut homeworks = self.homeworks.write().await;
        let ids: Vec<String> = homeworks
            .values()
            .filter(|h| h.course_id == course_id)
            .map(|h| h.id.clone())
            .collect();

        for id in &ids {
            homeworks.remove(id);
        }
        Ok(ids)
    }

    async fn count(&self, filter: HomeworkFilter) -> AppResult<u64> {
        let homeworks = self.homeworks.read().await;
        Ok(homeworks.values().filter(|h| filter.matches(h)).count() as u64)
    }

    async fn list(
        &self,
        filter: HomeworkFilter,
        skip: u64,
        take: u64,
    ) -> AppResult<Vec<Homework>> {
        let homeworks = self.homeworks.read().await;
        let mut items: Vec<_> = homeworks
            .values()
            .filter(|h| filter.matches(h))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(slice(items, skip, take))
    }

    async fn remove_student(&self, student_id: &str) -> AppResult<()> {
        let mut homeworks = self.homeworks.write().await;
        for homework in homeworks.values_mut() {
            homework.student_ids.retain(|id| id != student_id);
        }
        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySolutionRepository {
    solutions: Table<Solution>,
}

impl InMemorySolutionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SolutionRepository for InMemorySolutionRepository {
    async fn create(&self, solution: Solution) -> AppResult<Solution> {
        let mut solutions = self.solutions.write().await;

        if solutions.contains_key(&solution.id) {
            return Err(AppError::AlreadyExists(format!(
                "Solution with id '{}' already exists",
                solution.id
            )));
        }

        solutions.insert(solution.id.clone(), solution.clone());
        Ok(solution)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Solution>> {
        let solutions = self.solutions.read().await;
        Ok(solutions.get(id).cloned())
    }

    async fn update(&self, solution: Solution) -> AppResult<Solution> {
        let mut solutions = self.solutions.write().await;

        match solutions.get_mut(&solution.id) {
            Some(existing) => {
                *existing = solution.clone();
                Ok(solution)
            }
            None => Err(AppError::NotFound(format!(
                "Solution with id '{}' not found",
                solution.id
            ))),
        }
    }

    async fn delete_by_homework(&self, homework_id: &str) -> AppResult<Vec<String>> {
        let mut solutions = self.solutions.write().await;
        let removed: Vec<Solution> = solutions
            .values()
            .filter(|s| s.homework_id == homework_id)
            .cloned()
            .collect();

        for solution in &removed {
            solutions.remove(&solution.id);
        }
        Ok(removed.into_iter().map(|s| s.file_path).collect())
    }

    async fn count(&self, filter: SolutionFilter) -> AppResult<u64> {
        let solutions = self.solutions.read().await;
        Ok(solutions.values().filter(|s| filter.matches(s)).count() as u64)
    }

    async fn list(
        &self,
        filter: SolutionFilter,
        skip: u64,
        take: u64,
    ) -> AppResult<Vec<Solution>> {
        let solutions = self.solutions.read().await;
        let mut items: Vec<_> = solutions
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(slice(items, skip, take))
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}
