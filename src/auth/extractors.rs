use actix_web::{dev::Payload, http::header::Header, web, FromRequest, HttpRequest};
use actix_web_httpauth::headers::authorization::{Authorization, Basic, Bearer};
use futures::future::LocalBoxFuture;

use crate::{
    app_state::AppState,
    errors::{AppError, AppResult},
    middleware::get_request_id,
    models::domain::User,
};

fn app_state(req: &HttpRequest) -> AppResult<web::Data<AppState>> {
    req.app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::InternalError("Application state not configured".to_string()))
}

/// Caller authenticated with a bearer token.
pub struct TokenAuth(pub User);

impl FromRequest for TokenAuth {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = app_state(req);
        let token = Authorization::<Bearer>::parse(req)
            .map(|auth| auth.into_scheme().token().to_string());
        let path = req.path().to_string();
        let request_id = get_request_id(req).unwrap_or_default();

        Box::pin(async move {
            let state = state?;
            let Ok(token) = token else {
                log::warn!(
                    "[{}] Rejected request to {} without a bearer token",
                    request_id,
                    path
                );
                return Err(AppError::Unauthorized(
                    "A bearer token is required".to_string(),
                ));
            };

            match state.credentials.validate_token(&token).await? {
                Some(user) => Ok(TokenAuth(user)),
                None => {
                    log::warn!("[{}] Rejected invalid or expired token on {}", request_id, path);
                    Err(AppError::Unauthorized("Invalid or expired token".to_string()))
                }
            }
        })
    }
}

/// Caller authenticated with HTTP Basic username and password.
pub struct PasswordAuth(pub User);

impl FromRequest for PasswordAuth {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = app_state(req);
        let request_id = get_request_id(req).unwrap_or_default();
        let credentials = Authorization::<Basic>::parse(req).map(|auth| {
            let basic = auth.into_scheme();
            (
                basic.user_id().to_string(),
                basic.password().map(|p| p.to_string()).unwrap_or_default(),
            )
        });

        Box::pin(async move {
            let state = state?;
            let Ok((username, password)) = credentials else {
                log::warn!("[{}] Rejected login without basic credentials", request_id);
                return Err(AppError::Unauthorized(
                    "Basic credentials are required".to_string(),
                ));
            };

            match state.credentials.verify_password(&username, &password).await? {
                Some(user) => Ok(PasswordAuth(user)),
                None => {
                    log::warn!("[{}] Failed password login for '{}'", request_id, username);
                    Err(AppError::Unauthorized("Invalid username or password".to_string()))
                }
            }
        })
    }
}
