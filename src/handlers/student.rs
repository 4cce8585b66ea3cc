use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_role, TokenAuth},
    errors::AppError,
    handlers::page_request,
    models::{
        domain::UserRole,
        dto::{request::SubmitSolutionParams, response::SolutionResponse},
    },
    pagination::path_locator,
};

#[get("/courses")]
async fn list_courses(
    state: web::Data<AppState>,
    auth: TokenAuth,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, UserRole::Student)?;

    let page = page_request(&req)?;
    let courses = state
        .courses
        .list_enrolled_courses(&auth.0, page, path_locator(req.path()))
        .await?;
    Ok(HttpResponse::Ok().json(courses))
}

#[post("/course/{id}")]
async fn enroll(
    state: web::Data<AppState>,
    auth: TokenAuth,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, UserRole::Student)?;

    state.courses.enroll(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().finish())
}

#[delete("/course/{id}")]
async fn withdraw(
    state: web::Data<AppState>,
    auth: TokenAuth,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, UserRole::Student)?;

    state.courses.withdraw(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().finish())
}

#[get("/course/{id}/homeworks")]
async fn list_course_homeworks(
    state: web::Data<AppState>,
    auth: TokenAuth,
    id: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, UserRole::Student)?;

    let page = page_request(&req)?;
    let homeworks = state
        .homeworks
        .list_for_course(&id, page, path_locator(req.path()))
        .await?;
    Ok(HttpResponse::Ok().json(homeworks))
}

#[post("/homework/{id}")]
async fn assign_homework(
    state: web::Data<AppState>,
    auth: TokenAuth,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, UserRole::Student)?;

    state.homeworks.assign_self(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().finish())
}

#[delete("/homework/{id}")]
async fn abandon_homework(
    state: web::Data<AppState>,
    auth: TokenAuth,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, UserRole::Student)?;

    state.homeworks.abandon(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().finish())
}

#[get("/homeworks")]
async fn list_homeworks(
    state: web::Data<AppState>,
    auth: TokenAuth,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, UserRole::Student)?;

    let page = page_request(&req)?;
    let homeworks = state
        .homeworks
        .list_assigned(&auth.0, page, path_locator(req.path()))
        .await?;
    Ok(HttpResponse::Ok().json(homeworks))
}

/// The request body is the raw file; `filename` names it.
#[post("/homework/{id}/submit")]
async fn submit_solution(
    state: web::Data<AppState>,
    auth: TokenAuth,
    id: web::Path<String>,
    params: web::Query<SubmitSolutionParams>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, UserRole::Student)?;

    let solution = state
        .solutions
        .submit(&auth.0, &id, params.filename.as_deref(), &body)
        .await?;
    Ok(HttpResponse::Ok().json(SolutionResponse { solution }))
}

#[get("/homework/{id}/solutions")]
async fn list_solutions(
    state: web::Data<AppState>,
    auth: TokenAuth,
    id: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, UserRole::Student)?;

    let page = page_request(&req)?;
    let solutions = state
        .solutions
        .list_own(&auth.0, &id, page, path_locator(req.path()))
        .await?;
    Ok(HttpResponse::Ok().json(solutions))
}

#[get("/solution/{id}")]
async fn get_solution(
    state: web::Data<AppState>,
    auth: TokenAuth,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_role(&auth.0, UserRole::Student)?;

    let solution = state.solutions.get_own(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(SolutionResponse { solution }))
}
