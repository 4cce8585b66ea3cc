pub mod admin;
pub mod auth;
pub mod health;
pub mod student;
pub mod teacher;

use actix_web::{web, HttpRequest};

use crate::{
    errors::{AppError, AppResult},
    models::dto::request::PaginationParams,
    pagination::PageRequest,
};

/// Reads `start`/`limit` from the query string. Called only after the
/// caller has been authenticated and authorized.
pub(crate) fn page_request(req: &HttpRequest) -> AppResult<PageRequest> {
    web::Query::<PaginationParams>::from_query(req.query_string())
        .map_err(|e| AppError::ValidationError(format!("Invalid pagination parameters: {}", e)))?
        .into_inner()
        .into_page_request()
}

/// Registers every route plus the body/query extractor limits.
pub fn configure(max_upload_bytes: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(
            web::JsonConfig::default()
                .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
        )
        .app_data(
            web::QueryConfig::default()
                .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
        )
        .app_data(web::PayloadConfig::new(max_upload_bytes))
        .service(health::health_check)
        .service(
            web::scope("/api/v1/auth")
                .service(auth::issue_token)
                .service(auth::check_token)
                .service(auth::revoke_token),
        )
        .service(
            web::scope("/api/v1/admin")
                .service(admin::list_teachers)
                .service(admin::create_teacher)
                .service(admin::remove_teacher)
                .service(admin::list_students)
                .service(admin::create_student)
                .service(admin::remove_student),
        )
        .service(
            web::scope("/api/v1/teacher")
                .service(teacher::list_courses)
                .service(teacher::create_course)
                .service(teacher::remove_course)
                .service(teacher::list_homeworks)
                .service(teacher::create_homework)
                .service(teacher::list_students)
                .service(teacher::modify_homework)
                .service(teacher::remove_homework)
                .service(teacher::list_solutions)
                .service(teacher::get_solution)
                .service(teacher::modify_solution),
        )
        .service(
            web::scope("/api/v1/student")
                .service(student::list_courses)
                .service(student::enroll)
                .service(student::withdraw)
                .service(student::list_course_homeworks)
                .service(student::assign_homework)
                .service(student::abandon_homework)
                .service(student::list_homeworks)
                .service(student::submit_solution)
                .service(student::list_solutions)
                .service(student::get_solution),
        );
    }
}
