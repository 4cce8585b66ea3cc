use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_role, TokenAuth},
    errors::AppError,
    handlers::page_request,
    models::{
        domain::UserRole,
        dto::{
            request::{
                CreateCourseRequest, CreateHomeworkRequest, UpdateHomeworkRequest,
                UpdateSolutionRequest,
            },
            response::SolutionResponse,
        },
    },
    pagination::path_locator,
};

#[get("/courses")]
async fn list_courses(
    state: web::Data<AppState>,
    auth: TokenAuth,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, UserRole::Teacher)?;

    let page = page_request(&req)?;
    let courses = state
        .courses
        .list_courses(page, path_locator(req.path()))
        .await?;
    Ok(HttpResponse::Ok().json(courses))
}

#[post("/courses")]
async fn create_course(
    state: web::Data<AppState>,
    auth: TokenAuth,
    request: web::Json<CreateCourseRequest>,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, UserRole::Teacher)?;

    let course = state
        .courses
        .create_course(&auth.0, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(course))
}

#[delete("/course/{id}")]
async fn remove_course(
    state: web::Data<AppState>,
    auth: TokenAuth,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, UserRole::Teacher)?;

    state.courses.remove_course(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().finish())
}

#[get("/course/{id}/homeworks")]
async fn list_homeworks(
    state: web::Data<AppState>,
    auth: TokenAuth,
    id: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, UserRole::Teacher)?;

    let page = page_request(&req)?;
    let homeworks = state
        .homeworks
        .list_for_course(&id, page, path_locator(req.path()))
        .await?;
    Ok(HttpResponse::Ok().json(homeworks))
}

#[post("/course/{id}/homeworks")]
async fn create_homework(
    state: web::Data<AppState>,
    auth: TokenAuth,
    id: web::Path<String>,
    request: web::Json<CreateHomeworkRequest>,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, UserRole::Teacher)?;

    let homework = state
        .homeworks
        .create(&auth.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(homework))
}

#[get("/course/{id}/students")]
async fn list_students(
    state: web::Data<AppState>,
    auth: TokenAuth,
    id: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, UserRole::Teacher)?;

    let page = page_request(&req)?;
    let students = state
        .courses
        .list_course_students(&id, page, path_locator(req.path()))
        .await?;
    Ok(HttpResponse::Ok().json(students))
}

#[put("/homework/{id}")]
async fn modify_homework(
    state: web::Data<AppState>,
    auth: TokenAuth,
    id: web::Path<String>,
    request: web::Json<UpdateHomeworkRequest>,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, UserRole::Teacher)?;

    let homework = state
        .homeworks
        .modify(&auth.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(homework))
}

#[delete("/homework/{id}")]
async fn remove_homework(
    state: web::Data<AppState>,
    auth: TokenAuth,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, UserRole::Teacher)?;

    state.homeworks.remove(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().finish())
}

#[get("/homework/{id}/solutions")]
async fn list_solutions(
    state: web::Data<AppState>,
    auth: TokenAuth,
    id: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, UserRole::Teacher)?;

    let page = page_request(&req)?;
    let solutions = state
        .solutions
        .list_for_homework(&id, page, path_locator(req.path()))
        .await?;
    Ok(HttpResponse::Ok().json(solutions))
}

#[get("/solution/{id}")]
async fn get_solution(
    state: web::Data<AppState>,
    auth: TokenAuth,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, UserRole::Teacher)?;

    let solution = state.solutions.get(&id).await?;
    Ok(HttpResponse::Ok().json(SolutionResponse { solution }))
}

#[put("/solution/{id}")]
async fn modify_solution(
    state: web::Data<AppState>,
    auth: TokenAuth,
    id: web::Path<String>,
    request: web::Json<UpdateSolutionRequest>,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, UserRole::Teacher)?;

    let solution = state
        .solutions
        .update_status(&auth.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(SolutionResponse { solution }))
}
