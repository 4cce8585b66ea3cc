pub mod account_service;
pub mod course_service;
pub mod homework_service;
pub mod solution_service;

pub use account_service::AccountService;
pub use course_service::CourseService;
pub use homework_service::HomeworkService;
pub use solution_service::SolutionService;
