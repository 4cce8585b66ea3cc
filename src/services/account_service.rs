use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::hash_password,
    errors::{AppError, AppResult},
    models::{
        domain::{User, UserRole},
        dto::{request::CreateUserRequest, response::UserDto},
    },
    pagination::{paginate, PageRequest, PageResult},
    repositories::{CourseRepository, HomeworkRepository, UserFilter, UserRepository},
};

/// Teacher and student accounts, managed by administrators.
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    courses: Arc<dyn CourseRepository>,
    homeworks: Arc<dyn HomeworkRepository>,
    password_hash_cost: u32,
}

fn collection_key(role: UserRole) -> &'static str {
    match role {
        UserRole::Administrator => "administrators",
        UserRole::Teacher => "teachers",
        UserRole::Student => "students",
    }
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        courses: Arc<dyn CourseRepository>,
        homeworks: Arc<dyn HomeworkRepository>,
        password_hash_cost: u32,
    ) -> Self {
        Self {
            users,
            courses,
            homeworks,
            password_hash_cost,
        }
    }

    /// Creates the bootstrap administrator unless the username is already taken.
    pub async fn ensure_administrator(
        &self,
        name: &str,
        username: &str,
        password: &str,
    ) -> AppResult<User> {
        if let Some(existing) = self.users.find_by_username(username).await? {
            log::info!("Administrator '{}' already present", username);
            return Ok(existing);
        }

        let hash = hash_password(password, self.password_hash_cost).await?;
        let admin = self
            .users
            .create(User::new(UserRole::Administrator, name, username, hash))
            .await?;

        log::info!("Created administrator '{}'", username);
        Ok(admin)
    }

    pub async fn create_account(
        &self,
        role: UserRole,
        request: CreateUserRequest,
    ) -> AppResult<UserDto> {
        request.validate()?;

        if self.users.find_by_username(&request.username).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "Username '{}' is already taken",
                request.username
            )));
        }

        let hash = hash_password(&request.password, self.password_hash_cost).await?;
        let user = self
            .users
            .create(User::new(role, &request.name, &request.username, hash))
            .await?;

        log::info!("Created {} account '{}'", role, user.username);
        Ok(UserDto::from(user))
    }

    pub async fn list_accounts(
        &self,
        role: UserRole,
        page: PageRequest,
        locator: impl Fn(PageRequest) -> String,
    ) -> AppResult<PageResult<UserDto>> {
        let filter = UserFilter::Role(role);
        let total = self.users.count(filter.clone()).await?;
        let users = &self.users;

        paginate(
            |skip, take| async move {
                users
                    .list(filter, skip, take)
                    .await
                    .map(|page| page.into_iter().map(UserDto::from).collect::<Vec<_>>())
            },
            total,
            locator,
            collection_key(role),
            page,
        )
        .await
    }

    /// Deletes the account and detaches it from courses and homeworks.
    pub async fn remove_account(&self, role: UserRole, id: &str) -> AppResult<()> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .filter(|user| user.role == role)
            .ok_or_else(|| AppError::Gone(format!("No {} with id '{}'", role, id)))?;

        match role {
            UserRole::Student => {
                self.courses.remove_student(&user.id).await?;
                self.homeworks.remove_student(&user.id).await?;
            }
            UserRole::Teacher => self.courses.clear_teacher(&user.id).await?,
            UserRole::Administrator => {}
        }

        if !self.users.delete(&user.id).await? {
            return Err(AppError::Gone(format!("No {} with id '{}'", role, id)));
        }

        log::info!("Removed {} account '{}'", role, user.username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::Course,
        pagination::path_locator,
        repositories::Repositories,
    };

    fn service(repos: &Repositories) -> AccountService {
        AccountService::new(
            repos.users.clone(),
            repos.courses.clone(),
            repos.homeworks.clone(),
            4,
        )
    }

    fn request(username: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: username.to_string(),
            username: username.to_string(),
            password: username.to_string(),
        }
    }

    #[tokio::test]
    async fn test_ensure_administrator_is_idempotent() {
        let repos = Repositories::in_memory();
        let accounts = service(&repos);

        let first = accounts.ensure_administrator("admin", "admin", "pw").await.unwrap();
        let second = accounts.ensure_administrator("admin", "admin", "other").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repos.users.count(UserFilter::Role(UserRole::Administrator)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_account_rejects_taken_username() {
        let repos = Repositories::in_memory();
        let accounts = service(&repos);

        let created = accounts.create_account(UserRole::Teacher, request("t")).await.unwrap();
        assert_eq!(created.username, "t");

        let stored = repos.users.find_by_username("t").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "t");

        let duplicate = accounts.create_account(UserRole::Student, request("t")).await;
        assert!(matches!(duplicate, Err(AppError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_list_accounts_filters_by_role() {
        let repos = Repositories::in_memory();
        let accounts = service(&repos);

        for name in ["b", "a", "c"] {
            accounts.create_account(UserRole::Teacher, request(name)).await.unwrap();
        }
        accounts.create_account(UserRole::Student, request("s")).await.unwrap();

        let page = accounts
            .list_accounts(UserRole::Teacher, PageRequest::new(1, 2).unwrap(), path_locator("/t"))
            .await
            .unwrap();

        let names: Vec<_> = page.items().iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(page.key(), "teachers");
        assert_eq!(page.next(), Some("/t?start=2&limit=2"));
    }

    #[tokio::test]
    async fn test_remove_account_detaches_student() {
        let repos = Repositories::in_memory();
        let accounts = service(&repos);

        let student = accounts.create_account(UserRole::Student, request("s")).await.unwrap();
        let mut course = Course::new("course", "d", "t1");
        course.student_ids.push(student.id.clone());
        let course = repos.courses.create(course).await.unwrap();

        // wrong role looks like an absent account
        let wrong_role = accounts.remove_account(UserRole::Teacher, &student.id).await;
        assert!(matches!(wrong_role, Err(AppError::Gone(_))));

        accounts.remove_account(UserRole::Student, &student.id).await.unwrap();

        let course = repos.courses.find_by_id(&course.id).await.unwrap().unwrap();
        assert!(course.student_ids.is_empty());

        let again = accounts.remove_account(UserRole::Student, &student.id).await;
        assert!(matches!(again, Err(AppError::Gone(_))));
    }

    #[tokio::test]
    async fn test_remove_teacher_orphans_courses() {
        let repos = Repositories::in_memory();
        let accounts = service(&repos);

        let teacher = accounts.create_account(UserRole::Teacher, request("t")).await.unwrap();
        let course = repos
            .courses
            .create(Course::new("course", "d", &teacher.id))
            .await
            .unwrap();

        accounts.remove_account(UserRole::Teacher, &teacher.id).await.unwrap();

        let course = repos.courses.find_by_id(&course.id).await.unwrap().unwrap();
        assert!(course.teacher_id.is_none());
    }
}
