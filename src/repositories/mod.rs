pub mod course_repository;
pub mod filters;
pub mod homework_repository;
pub mod memory;
pub mod solution_repository;
pub mod user_repository;

use std::sync::Arc;

pub use course_repository::{CourseRepository, MongoCourseRepository};
pub use filters::{CourseFilter, HomeworkFilter, SolutionFilter, UserFilter};
pub use homework_repository::{HomeworkRepository, MongoHomeworkRepository};
pub use memory::{
    InMemoryCourseRepository, InMemoryHomeworkRepository, InMemorySolutionRepository,
    InMemoryUserRepository,
};
pub use solution_repository::{MongoSolutionRepository, SolutionRepository};
pub use user_repository::{MongoUserRepository, UserRepository};

use crate::{db::Database, errors::AppResult};

/// MongoDB takes a signed limit; anything past `i64::MAX` means "no limit".
pub(crate) fn mongo_limit(take: u64) -> i64 {
    i64::try_from(take).unwrap_or(i64::MAX)
}

/// One handle per entity, shared by every service.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub homeworks: Arc<dyn HomeworkRepository>,
    pub solutions: Arc<dyn SolutionRepository>,
}

impl Repositories {
    pub fn mongo(db: &Database) -> Self {
        Self {
            users: Arc::new(MongoUserRepository::new(db)),
            courses: Arc::new(MongoCourseRepository::new(db)),
            homeworks: Arc::new(MongoHomeworkRepository::new(db)),
            solutions: Arc::new(MongoSolutionRepository::new(db)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            courses: Arc::new(InMemoryCourseRepository::new()),
            homeworks: Arc::new(InMemoryHomeworkRepository::new()),
            solutions: Arc::new(InMemorySolutionRepository::new()),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        self.users.ensure_indexes().await?;
        self.courses.ensure_indexes().await?;
        self.homeworks.ensure_indexes().await?;
        self.solutions.ensure_indexes().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mongo_limit_saturates() {
        assert_eq!(mongo_limit(25), 25);
        assert_eq!(mongo_limit(u64::MAX), i64::MAX);
    }
}
