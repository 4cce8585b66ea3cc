use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Course, Homework, User, UserRole},
        dto::{
            request::{CreateHomeworkRequest, HomeworkChanges, NewHomework, UpdateHomeworkRequest},
            response::HomeworkDto,
        },
    },
    pagination::{paginate, PageRequest, PageResult},
    repositories::{
        CourseRepository, HomeworkFilter, HomeworkRepository, SolutionRepository, UserRepository,
    },
    storage::SolutionStorage,
};

pub struct HomeworkService {
    homeworks: Arc<dyn HomeworkRepository>,
    courses: Arc<dyn CourseRepository>,
    users: Arc<dyn UserRepository>,
    solutions: Arc<dyn SolutionRepository>,
    storage: SolutionStorage,
}

impl HomeworkService {
    pub fn new(
        homeworks: Arc<dyn HomeworkRepository>,
        courses: Arc<dyn CourseRepository>,
        users: Arc<dyn UserRepository>,
        solutions: Arc<dyn SolutionRepository>,
        storage: SolutionStorage,
    ) -> Self {
        Self {
            homeworks,
            courses,
            users,
            solutions,
            storage,
        }
    }

    pub async fn load(&self, id: &str) -> AppResult<Homework> {
        self.homeworks
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Gone(format!("No homework with id '{}'", id)))
    }

    async fn load_course(&self, id: &str) -> AppResult<Course> {
        self.courses
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Gone(format!("No course with id '{}'", id)))
    }

    async fn load_owned(&self, teacher: &User, id: &str) -> AppResult<(Homework, Course)> {
        let homework = self.load(id).await?;
        let course = self.load_course(&homework.course_id).await?;
        if !course.is_owned_by(&teacher.id) {
            return Err(AppError::Forbidden(format!(
                "Homework '{}' belongs to another teacher's course",
                homework.name
            )));
        }
        Ok((homework, course))
    }

    async fn course_name(&self, course_id: &str) -> AppResult<Option<String>> {
        Ok(self.courses.find_by_id(course_id).await?.map(|c| c.name))
    }

    async fn list_where(
        &self,
        filter: HomeworkFilter,
        page: PageRequest,
        locator: impl Fn(PageRequest) -> String,
    ) -> AppResult<PageResult<HomeworkDto>> {
        let total = self.homeworks.count(filter.clone()).await?;

        paginate(
            |skip, take| async move {
                let homeworks = self.homeworks.list(filter, skip, take).await?;
                let mut dtos = Vec::with_capacity(homeworks.len());
                for homework in homeworks {
                    let course_name = self.course_name(&homework.course_id).await?;
                    dtos.push(HomeworkDto::new(homework, course_name));
                }
                Ok::<_, AppError>(dtos)
            },
            total,
            locator,
            "homeworks",
            page,
        )
        .await
    }

    pub async fn list_for_course(
        &self,
        course_id: &str,
        page: PageRequest,
        locator: impl Fn(PageRequest) -> String,
    ) -> AppResult<PageResult<HomeworkDto>> {
        let course = self.load_course(course_id).await?;
        self.list_where(HomeworkFilter::Course(course.id), page, locator)
            .await
    }

    pub async fn list_assigned(
        &self,
        student: &User,
        page: PageRequest,
        locator: impl Fn(PageRequest) -> String,
    ) -> AppResult<PageResult<HomeworkDto>> {
        self.list_where(HomeworkFilter::AssignedTo(student.id.clone()), page, locator)
            .await
    }

    pub async fn create(
        &self,
        teacher: &User,
        course_id: &str,
        request: CreateHomeworkRequest,
    ) -> AppResult<HomeworkDto> {
        let course = self.load_course(course_id).await?;
        if !course.is_owned_by(&teacher.id) {
            return Err(AppError::Forbidden(format!(
                "Course '{}' belongs to another teacher",
                course.name
            )));
        }

        let parsed = NewHomework::try_from(request)?;
        let homework = self
            .homeworks
            .create(Homework::new(
                &parsed.name,
                &parsed.description,
                parsed.deadline,
                parsed.headcount,
                parsed.self_assignable,
                &course.id,
            ))
            .await?;

        log::info!("'{}' created homework '{}' in '{}'", teacher.username, homework.name, course.name);
        Ok(HomeworkDto::new(homework, Some(course.name)))
    }

    /// Applies only the supplied fields. A malformed payload changes nothing.
    pub async fn modify(
        &self,
        teacher: &User,
        id: &str,
        request: UpdateHomeworkRequest,
    ) -> AppResult<HomeworkDto> {
        let changes = HomeworkChanges::try_from(request)?;
        let (mut homework, course) = self.load_owned(teacher, id).await?;

        if let Some(student_ids) = &changes.students {
            for student_id in student_ids {
                let is_student = self
                    .users
                    .find_by_id(student_id)
                    .await?
                    .is_some_and(|user| user.role == UserRole::Student);
                if !is_student {
                    return Err(AppError::Gone(format!("No student with id '{}'", student_id)));
                }
            }
        }

        let HomeworkChanges {
            name,
            description,
            deadline,
            headcount,
            self_assignable,
            students,
        } = changes;

        if let Some(name) = name {
            homework.name = name;
        }
        if let Some(description) = description {
            homework.description = description;
        }
        if let Some(deadline) = deadline {
            homework.deadline = deadline;
        }
        if let Some(headcount) = headcount {
            homework.headcount = headcount;
        }
        if let Some(self_assignable) = self_assignable {
            homework.self_assignable = self_assignable;
        }
        for student_id in students.unwrap_or_default() {
            if !homework.has_student(&student_id) {
                homework.student_ids.push(student_id);
            }
        }

        let homework = self.homeworks.update(homework).await?;

        log::info!("'{}' modified homework '{}'", teacher.username, homework.name);
        Ok(HomeworkDto::new(homework, Some(course.name)))
    }

    pub async fn remove(&self, teacher: &User, id: &str) -> AppResult<()> {
        let (homework, _) = self.load_owned(teacher, id).await?;

        let files = self.solutions.delete_by_homework(&homework.id).await?;
        self.storage.remove_all(&files).await;
        self.homeworks.delete(&homework.id).await?;

        log::info!("'{}' removed homework '{}'", teacher.username, homework.name);
        Ok(())
    }

    pub async fn assign_self(&self, student: &User, id: &str) -> AppResult<()> {
        let mut homework = self.load(id).await?;

        if homework.has_student(&student.id) {
            return Err(AppError::NotModified);
        }
        if !homework.self_assignable {
            return Err(AppError::Conflict(format!(
                "Homework '{}' is not self-assignable",
                homework.name
            )));
        }
        if homework.is_full() {
            return Err(AppError::Conflict(format!(
                "Homework '{}' has reached its headcount of {}",
                homework.name, homework.headcount
            )));
        }

        homework.student_ids.push(student.id.clone());
        let homework = self.homeworks.update(homework).await?;

        log::info!("'{}' took homework '{}'", student.username, homework.name);
        Ok(())
    }

    pub async fn abandon(&self, student: &User, id: &str) -> AppResult<()> {
        let mut homework = self.load(id).await?;

        if !homework.has_student(&student.id) {
            return Err(AppError::NotModified);
        }

        homework.student_ids.retain(|sid| sid != &student.id);
        let homework = self.homeworks.update(homework).await?;

        log::info!("'{}' abandoned homework '{}'", student.username, homework.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::dto::request::{FlexibleBool, FlexibleCount},
        pagination::path_locator,
        repositories::Repositories,
    };

    struct Fixture {
        repos: Repositories,
        service: HomeworkService,
        teacher: User,
        student: User,
        course: Course,
    }

    async fn fixture() -> Fixture {
        let repos = Repositories::in_memory();
        let service = HomeworkService::new(
            repos.homeworks.clone(),
            repos.courses.clone(),
            repos.users.clone(),
            repos.solutions.clone(),
            SolutionStorage::new(std::env::temp_dir().join("homework-service-tests")),
        );

        let teacher = repos
            .users
            .create(User::new(UserRole::Teacher, "teacher", "teacher", "hash".to_string()))
            .await
            .unwrap();
        let student = repos
            .users
            .create(User::new(UserRole::Student, "student", "student", "hash".to_string()))
            .await
            .unwrap();
        let course = repos
            .courses
            .create(Course::new("course", "course", &teacher.id))
            .await
            .unwrap();

        Fixture {
            repos,
            service,
            teacher,
            student,
            course,
        }
    }

    fn create_request(name: &str, headcount: i64, self_assignable: bool) -> CreateHomeworkRequest {
        CreateHomeworkRequest {
            name: name.to_string(),
            description: "description".to_string(),
            deadline: "2018-11-08 08:48:11".to_string(),
            headcount: FlexibleCount::Number(headcount),
            self_assignable: FlexibleBool::Bool(self_assignable),
        }
    }

    #[tokio::test]
    async fn test_create_checks_course_and_owner() {
        let f = fixture().await;

        let created = f
            .service
            .create(&f.teacher, &f.course.id, create_request("h", 2, true))
            .await
            .unwrap();
        assert_eq!(created.course.as_deref(), Some("course"));

        let gone = f.service.create(&f.teacher, "missing", create_request("x", 2, true)).await;
        assert!(matches!(gone, Err(AppError::Gone(_))));

        let forbidden = f
            .service
            .create(&f.student, &f.course.id, create_request("y", 2, true))
            .await;
        assert!(matches!(forbidden, Err(AppError::Forbidden(_))));

        let page = f
            .service
            .list_for_course(&f.course.id, PageRequest::default(), path_locator("/h"))
            .await
            .unwrap();
        assert_eq!(page.items().len(), 1);
    }

    #[tokio::test]
    async fn test_modify_applies_only_supplied_fields() {
        let f = fixture().await;
        let created = f
            .service
            .create(&f.teacher, &f.course.id, create_request("h", 2, false))
            .await
            .unwrap();

        let modified = f
            .service
            .modify(
                &f.teacher,
                &created.id,
                UpdateHomeworkRequest {
                    headcount: Some(FlexibleCount::Text("5".to_string())),
                    students: Some(vec![f.student.id.clone()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(modified.headcount, 5);
        assert_eq!(modified.name, "h");
        assert!(!modified.self_assignable);

        let stored = f.repos.homeworks.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.student_ids, vec![f.student.id.clone()]);
    }

    #[tokio::test]
    async fn test_modify_rejects_unknown_student_without_changes() {
        let f = fixture().await;
        let created = f
            .service
            .create(&f.teacher, &f.course.id, create_request("h", 2, false))
            .await
            .unwrap();

        let result = f
            .service
            .modify(
                &f.teacher,
                &created.id,
                UpdateHomeworkRequest {
                    name: Some("renamed".to_string()),
                    students: Some(vec!["missing".to_string()]),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Gone(_))));

        let stored = f.repos.homeworks.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "h");
    }

    #[tokio::test]
    async fn test_assign_self_policies() {
        let f = fixture().await;
        let open = f
            .service
            .create(&f.teacher, &f.course.id, create_request("open", 1, true))
            .await
            .unwrap();
        let closed = f
            .service
            .create(&f.teacher, &f.course.id, create_request("closed", 1, false))
            .await
            .unwrap();

        f.service.assign_self(&f.student, &open.id).await.unwrap();
        assert!(matches!(
            f.service.assign_self(&f.student, &open.id).await,
            Err(AppError::NotModified)
        ));
        assert!(matches!(
            f.service.assign_self(&f.student, &closed.id).await,
            Err(AppError::Conflict(_))
        ));

        let latecomer = f
            .repos
            .users
            .create(User::new(UserRole::Student, "late", "late", "hash".to_string()))
            .await
            .unwrap();
        assert!(matches!(
            f.service.assign_self(&latecomer, &open.id).await,
            Err(AppError::Conflict(_))
        ));

        let assigned = f
            .service
            .list_assigned(&f.student, PageRequest::default(), path_locator("/h"))
            .await
            .unwrap();
        assert_eq!(assigned.items()[0].name, "open");

        f.service.abandon(&f.student, &open.id).await.unwrap();
        assert!(matches!(
            f.service.abandon(&f.student, &open.id).await,
            Err(AppError::NotModified)
        ));
    }
}
