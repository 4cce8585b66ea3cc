#![allow(dead_code)]

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App,
};
use actix_web_httpauth::headers::authorization::{Authorization, Basic, Bearer};
use uuid::Uuid;

use homework_server::{
    app_state::AppState,
    config::Config,
    handlers,
    middleware::RequestIdMiddleware,
    models::{
        domain::{User, UserRole},
        dto::request::CreateUserRequest,
    },
    repositories::Repositories,
};

pub const ADMIN: &str = "admin";

/// In-memory state with its own upload folder and a bootstrapped administrator.
pub async fn state() -> web::Data<AppState> {
    let mut config = Config::test_config();
    config.upload_folder = std::env::temp_dir().join(format!("homework-api-{}", Uuid::new_v4()));

    let state = AppState::from_repositories(config, Repositories::in_memory())
        .expect("valid test configuration");
    state
        .accounts
        .ensure_administrator(ADMIN, ADMIN, ADMIN)
        .await
        .expect("bootstrap administrator");

    web::Data::new(state)
}

pub fn app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let max_upload_bytes = state
        .config
        .max_upload_bytes()
        .expect("valid upload limit");
    App::new()
        .app_data(state)
        .wrap(RequestIdMiddleware)
        .configure(handlers::configure(max_upload_bytes))
}

pub fn basic(username: &str, password: &str) -> Authorization<Basic> {
    Authorization::from(Basic::new(username.to_string(), Some(password.to_string())))
}

pub fn bearer(token: &str) -> Authorization<Bearer> {
    Authorization::from(Bearer::new(token.to_string()))
}

/// Creates an account whose password equals its username.
pub async fn account(state: &AppState, role: UserRole, username: &str) -> User {
    state
        .accounts
        .create_account(
            role,
            CreateUserRequest {
                name: username.to_string(),
                username: username.to_string(),
                password: username.to_string(),
            },
        )
        .await
        .expect("create account");

    state
        .credentials
        .verify_password(username, username)
        .await
        .expect("store available")
        .expect("fresh account verifies")
}

pub async fn token_for(state: &AppState, username: &str) -> String {
    let user = state
        .credentials
        .verify_password(username, username)
        .await
        .expect("store available")
        .expect("known account");

    state.credentials.issue_token(&user).await.expect("issue token")
}

pub async fn admin_token(state: &AppState) -> String {
    token_for(state, ADMIN).await
}
