use std::sync::Arc;

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Course, User, UserRole},
        dto::{
            request::CreateCourseRequest,
            response::{CourseDto, UserDto},
        },
    },
    pagination::{paginate, PageRequest, PageResult},
    repositories::{
        CourseFilter, CourseRepository, HomeworkRepository, SolutionRepository, UserFilter,
        UserRepository,
    },
    storage::SolutionStorage,
};

pub struct CourseService {
    courses: Arc<dyn CourseRepository>,
    homeworks: Arc<dyn HomeworkRepository>,
    solutions: Arc<dyn SolutionRepository>,
    users: Arc<dyn UserRepository>,
    storage: SolutionStorage,
}

impl CourseService {
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        homeworks: Arc<dyn HomeworkRepository>,
        solutions: Arc<dyn SolutionRepository>,
        users: Arc<dyn UserRepository>,
        storage: SolutionStorage,
    ) -> Self {
        Self {
            courses,
            homeworks,
            solutions,
            users,
            storage,
        }
    }

    pub async fn load(&self, id: &str) -> AppResult<Course> {
        self.courses
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Gone(format!("No course with id '{}'", id)))
    }

    /// The course, provided `teacher` owns it.
    pub async fn load_owned(&self, teacher: &User, id: &str) -> AppResult<Course> {
        let course = self.load(id).await?;
        if !course.is_owned_by(&teacher.id) {
            return Err(AppError::Forbidden(format!(
                "Course '{}' belongs to another teacher",
                course.name
            )));
        }
        Ok(course)
    }

    async fn to_dto(&self, course: Course) -> AppResult<CourseDto> {
        let teacher_name = match &course.teacher_id {
            Some(teacher_id) => self.users.find_by_id(teacher_id).await?.map(|t| t.name),
            None => None,
        };
        Ok(CourseDto::new(course, teacher_name))
    }

    async fn list_where(
        &self,
        filter: CourseFilter,
        page: PageRequest,
        locator: impl Fn(PageRequest) -> String,
    ) -> AppResult<PageResult<CourseDto>> {
        let total = self.courses.count(filter.clone()).await?;

        paginate(
            |skip, take| async move {
                let courses = self.courses.list(filter, skip, take).await?;
                let mut dtos = Vec::with_capacity(courses.len());
                for course in courses {
                    dtos.push(self.to_dto(course).await?);
                }
                Ok::<_, AppError>(dtos)
            },
            total,
            locator,
            "courses",
            page,
        )
        .await
    }

    pub async fn list_courses(
        &self,
        page: PageRequest,
        locator: impl Fn(PageRequest) -> String,
    ) -> AppResult<PageResult<CourseDto>> {
        self.list_where(CourseFilter::All, page, locator).await
    }

    pub async fn list_enrolled_courses(
        &self,
        student: &User,
        page: PageRequest,
        locator: impl Fn(PageRequest) -> String,
    ) -> AppResult<PageResult<CourseDto>> {
        self.list_where(CourseFilter::WithStudent(student.id.clone()), page, locator)
            .await
    }

    pub async fn create_course(
        &self,
        teacher: &User,
        request: CreateCourseRequest,
    ) -> AppResult<CourseDto> {
        request.validate()?;

        let course = self
            .courses
            .create(Course::new(&request.name, &request.description, &teacher.id))
            .await?;

        log::info!("'{}' created course '{}'", teacher.username, course.name);
        Ok(CourseDto::new(course, Some(teacher.name.clone())))
    }

    /// Deletes the course together with its homeworks, their solutions and files.
    pub async fn remove_course(&self, teacher: &User, id: &str) -> AppResult<()> {
        let course = self.load_owned(teacher, id).await?;

        let homework_ids = self.homeworks.delete_by_course(&course.id).await?;
        for homework_id in &homework_ids {
            let files = self.solutions.delete_by_homework(homework_id).await?;
            self.storage.remove_all(&files).await;
        }
        self.courses.delete(&course.id).await?;

        log::info!(
            "'{}' removed course '{}' and {} homework(s)",
            teacher.username,
            course.name,
            homework_ids.len()
        );
        Ok(())
    }

    pub async fn list_course_students(
        &self,
        course_id: &str,
        page: PageRequest,
        locator: impl Fn(PageRequest) -> String,
    ) -> AppResult<PageResult<UserDto>> {
        let course = self.load(course_id).await?;
        let filter = UserFilter::RoleAmong(UserRole::Student, course.student_ids);
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
            "students",
            page,
        )
        .await
    }

    pub async fn enroll(&self, student: &User, course_id: &str) -> AppResult<()> {
        let mut course = self.load(course_id).await?;
        if course.has_student(&student.id) {
            return Err(AppError::NotModified);
        }

        course.student_ids.push(student.id.clone());
        let course = self.courses.update(course).await?;

        log::info!("'{}' enrolled in '{}'", student.username, course.name);
        Ok(())
    }

    pub async fn withdraw(&self, student: &User, course_id: &str) -> AppResult<()> {
        let mut course = self.load(course_id).await?;
        if !course.has_student(&student.id) {
            return Err(AppError::NotModified);
        }

        course.student_ids.retain(|id| id != &student.id);
        let course = self.courses.update(course).await?;

        log::info!("'{}' withdrew from '{}'", student.username, course.name);
        Ok(())
    }
}
