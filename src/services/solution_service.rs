use std::sync::Arc;

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Course, Homework, Solution, User},
        dto::{request::UpdateSolutionRequest, response::SolutionDto},
    },
    pagination::{paginate, PageRequest, PageResult},
    repositories::{CourseRepository, HomeworkRepository, SolutionFilter, SolutionRepository},
    storage::SolutionStorage,
};

const DEFAULT_FILENAME: &str = "solution";

pub struct SolutionService {
    solutions: Arc<dyn SolutionRepository>,
    homeworks: Arc<dyn HomeworkRepository>,
    courses: Arc<dyn CourseRepository>,
    storage: SolutionStorage,
}

impl SolutionService {
    pub fn new(
        solutions: Arc<dyn SolutionRepository>,
        homeworks: Arc<dyn HomeworkRepository>,
        courses: Arc<dyn CourseRepository>,
        storage: SolutionStorage,
    ) -> Self {
        Self {
            solutions,
            homeworks,
            courses,
            storage,
        }
    }

    async fn load(&self, id: &str) -> AppResult<Solution> {
        self.solutions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Gone(format!("No solution with id '{}'", id)))
    }

    async fn load_homework(&self, id: &str) -> AppResult<Homework> {
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

    async fn list_where(
        &self,
        filter: SolutionFilter,
        page: PageRequest,
        locator: impl Fn(PageRequest) -> String,
    ) -> AppResult<PageResult<SolutionDto>> {
        let total = self.solutions.count(filter.clone()).await?;
        let solutions = &self.solutions;

        paginate(
            |skip, take| async move {
                solutions
                    .list(filter, skip, take)
                    .await
                    .map(|page| page.into_iter().map(SolutionDto::from).collect::<Vec<_>>())
            },
            total,
            locator,
            "solutions",
            page,
        )
        .await
    }

    /// Stores an uploaded file for a homework the student is assigned to.
    pub async fn submit(
        &self,
        student: &User,
        homework_id: &str,
        filename: Option<&str>,
        contents: &[u8],
    ) -> AppResult<SolutionDto> {
        if contents.is_empty() {
            return Err(AppError::ValidationError(
                "The submitted file is empty".to_string(),
            ));
        }

        let homework = self.load_homework(homework_id).await?;
        let course = self.load_course(&homework.course_id).await?;
        if !homework.has_student(&student.id) {
            return Err(AppError::Forbidden(format!(
                "'{}' is not assigned to homework '{}'",
                student.username, homework.name
            )));
        }

        let path = self
            .storage
            .store(
                &course.name,
                &homework.name,
                filename.unwrap_or(DEFAULT_FILENAME),
                contents,
            )
            .await?;

        let file_path = path.to_string_lossy().into_owned();
        let solution = match self
            .solutions
            .create(Solution::new(&homework.id, &student.id, &file_path))
            .await
        {
            Ok(solution) => solution,
            Err(e) => {
                // no row points at the file, so drop it
                self.storage.remove_all(&[file_path]).await;
                return Err(e);
            }
        };

        log::info!("'{}' submitted a solution for '{}'", student.username, homework.name);
        Ok(SolutionDto::from(solution))
    }

    pub async fn list_for_homework(
        &self,
        homework_id: &str,
        page: PageRequest,
        locator: impl Fn(PageRequest) -> String,
    ) -> AppResult<PageResult<SolutionDto>> {
        let homework = self.load_homework(homework_id).await?;
        self.list_where(SolutionFilter::Homework(homework.id), page, locator)
            .await
    }

    pub async fn list_own(
        &self,
        student: &User,
        homework_id: &str,
        page: PageRequest,
        locator: impl Fn(PageRequest) -> String,
    ) -> AppResult<PageResult<SolutionDto>> {
        let homework = self.load_homework(homework_id).await?;
        let filter = SolutionFilter::HomeworkAndStudent {
            homework_id: homework.id,
            student_id: student.id.clone(),
        };
        self.list_where(filter, page, locator).await
    }

    pub async fn get(&self, id: &str) -> AppResult<SolutionDto> {
        Ok(SolutionDto::from(self.load(id).await?))
    }

    pub async fn get_own(&self, student: &User, id: &str) -> AppResult<SolutionDto> {
        let solution = self.load(id).await?;
        if solution.student_id != student.id {
            return Err(AppError::Forbidden(
                "Solution was submitted by another student".to_string(),
            ));
        }
        Ok(SolutionDto::from(solution))
    }

    pub async fn update_status(
        &self,
        teacher: &User,
        id: &str,
        request: UpdateSolutionRequest,
    ) -> AppResult<SolutionDto> {
        request.validate()?;

        let mut solution = self.load(id).await?;
        let homework = self.load_homework(&solution.homework_id).await?;
        let course = self.load_course(&homework.course_id).await?;
        if !course.is_owned_by(&teacher.id) {
            return Err(AppError::Forbidden(format!(
                "Course '{}' belongs to another teacher",
                course.name
            )));
        }

        solution.status = Some(request.status);
        let solution = self.solutions.update(solution).await?;

        log::info!("'{}' graded solution {}", teacher.username, solution.id);
        Ok(SolutionDto::from(solution))
    }
}
