use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{with_role, TokenAuth},
    errors::AppError,
    handlers::page_request,
    models::{domain::UserRole, dto::request::CreateUserRequest},
    pagination::path_locator,
};

async fn list_accounts(
    state: &AppState,
    auth: &TokenAuth,
    req: &HttpRequest,
    role: UserRole,
) -> Result<HttpResponse, AppError> {
    with_role(&auth.0, UserRole::Administrator, || async move {
        let page = page_request(req)?;
        let accounts = state
            .accounts
            .list_accounts(role, page, path_locator(req.path()))
            .await?;
        Ok::<_, AppError>(HttpResponse::Ok().json(accounts))
    })
    .await
}

async fn create_account(
    state: &AppState,
    auth: &TokenAuth,
    role: UserRole,
    request: CreateUserRequest,
) -> Result<HttpResponse, AppError> {
    with_role(&auth.0, UserRole::Administrator, || async move {
        let account = state.accounts.create_account(role, request).await?;
        Ok::<_, AppError>(HttpResponse::Ok().json(account))
    })
    .await
}

async fn remove_account(
    state: &AppState,
    auth: &TokenAuth,
    role: UserRole,
    id: &str,
) -> Result<HttpResponse, AppError> {
    with_role(&auth.0, UserRole::Administrator, || async move {
        state.accounts.remove_account(role, id).await?;
        Ok::<_, AppError>(HttpResponse::Ok().finish())
    })
    .await
}

#[get("/teachers")]
async fn list_teachers(
    state: web::Data<AppState>,
    auth: TokenAuth,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    list_accounts(&state, &auth, &req, UserRole::Teacher).await
}

#[post("/teachers")]
async fn create_teacher(
    state: web::Data<AppState>,
    auth: TokenAuth,
    request: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    create_account(&state, &auth, UserRole::Teacher, request.into_inner()).await
}

#[delete("/teacher/{id}")]
async fn remove_teacher(
    state: web::Data<AppState>,
    auth: TokenAuth,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    remove_account(&state, &auth, UserRole::Teacher, &id).await
}

#[get("/students")]
async fn list_students(
    state: web::Data<AppState>,
    auth: TokenAuth,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    list_accounts(&state, &auth, &req, UserRole::Student).await
}

#[post("/students")]
async fn create_student(
    state: web::Data<AppState>,
    auth: TokenAuth,
    request: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    create_account(&state, &auth, UserRole::Student, request.into_inner()).await
}

#[delete("/student/{id}")]
async fn remove_student(
    state: web::Data<AppState>,
    auth: TokenAuth,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    remove_account(&state, &auth, UserRole::Student, &id).await
}
