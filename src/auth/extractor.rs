use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};

use crate::error::{AppError, AuthError};
use crate::AppState;

/// Identity established from the request's bearer token.
///
/// Handlers that take this as a parameter only run with a valid access token;
/// missing or bad tokens short-circuit with 401 before the handler body.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub email: String,
}

fn authenticate(req: &HttpRequest) -> Result<AuthedUser, AppError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::AuthenticationRequired)?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidToken)?;

    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::InternalError("application state missing".to_string()))?;

    let claims = state.auth_service.validate_access_token(token)?;

    Ok(AuthedUser { email: claims.sub })
}

impl FromRequest for AuthedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
