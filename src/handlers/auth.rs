use actix_web::{delete, get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{PasswordAuth, TokenAuth},
    errors::AppError,
    models::dto::response::TokenResponse,
};

/// Exchanges HTTP Basic credentials for a bearer token.
#[post("/token")]
async fn issue_token(
    state: web::Data<AppState>,
    auth: PasswordAuth,
) -> Result<HttpResponse, AppError> {
    let token = state.credentials.issue_token(&auth.0).await?;
    log::info!("'{}' logged in", auth.0.username);
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

#[get("/token")]
async fn check_token(_auth: TokenAuth) -> HttpResponse {
    HttpResponse::Ok().finish()
}

#[delete("/token")]
async fn revoke_token(
    state: web::Data<AppState>,
    auth: TokenAuth,
) -> Result<HttpResponse, AppError> {
    state.credentials.revoke_token(&auth.0).await?;
    log::info!("'{}' logged out", auth.0.username);
    Ok(HttpResponse::NoContent().finish())
}
