//! Authentication handlers.

use actix_web::{HttpRequest, HttpResponse, http::header, web};

use scribe_core::domain::NewUser;
use scribe_core::ports::TokenKind;
use scribe_shared::MessageResponse;
use scribe_shared::dto::{
    ConfirmQuery, LoginRequest, LoginResponse, RegisterUserRequest, ResetPasswordRequest,
    RestorePasswordRequest, TokenResponse,
};

use super::views;
use crate::middleware::auth::{AnyRole, Guard};
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::validation::ValidatedJson;
use crate::state::AppState;

/// POST /api/v1/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: ValidatedJson<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let user = state
        .auth
        .create_user(NewUser {
            name: req.name,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(HttpResponse::Created().json(views::user(&user)))
}

/// POST /api/v1/auth/login
///
/// Sets both token cookies and returns the access token in the body.
pub async fn login(
    state: web::Data<AppState>,
    body: ValidatedJson<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let user = state.auth.login_user(&req.email, &req.password).await?;

    let access = state.auth.jwt_access_token(&user)?;
    let refresh = state.auth.jwt_refresh_token(&user)?;

    Ok(HttpResponse::Ok()
        .append_header((header::SET_COOKIE, access.cookie))
        .append_header((header::SET_COOKIE, refresh.cookie))
        .json(LoginResponse {
            jwt: access.token,
            user: views::user(&user),
        }))
}

/// GET /api/v1/auth/confirm?token=
pub async fn confirm(
    state: web::Data<AppState>,
    query: web::Query<ConfirmQuery>,
) -> AppResult<HttpResponse> {
    let user = state.auth.confirm_user(&query.token).await?;
    Ok(HttpResponse::Ok().json(views::user(&user)))
}

/// POST /api/v1/auth/reset-password
pub async fn reset_password(
    state: web::Data<AppState>,
    body: ValidatedJson<ResetPasswordRequest>,
) -> AppResult<HttpResponse> {
    state.auth.reset_password(&body.0.email).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Reset link sent")))
}

/// POST /api/v1/auth/restore-password
///
/// The account is the one named by the caller's token.
pub async fn restore_password(
    state: web::Data<AppState>,
    body: ValidatedJson<RestorePasswordRequest>,
    guard: Guard<AnyRole>,
) -> AppResult<HttpResponse> {
    state
        .auth
        .restore_password(&guard.caller.email, &body.0.password)
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Password updated")))
}

/// GET /api/v1/auth/logout
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    let mut response = HttpResponse::Ok();
    for cookie in state.auth.logout_cookies() {
        response.append_header((header::SET_COOKIE, cookie));
    }
    response.json(MessageResponse::new("Logged out"))
}

/// GET /api/v1/auth/token
///
/// Trades the refresh cookie for a new access token.
pub async fn token(state: web::Data<AppState>, req: HttpRequest) -> AppResult<HttpResponse> {
    let refresh = req
        .cookie(TokenKind::Refresh.cookie_name())
        .ok_or_else(|| AppError::Forbidden("User not authorized".to_string()))?;

    let (user, access) = state.auth.refresh(refresh.value()).await?;
    tracing::debug!(user_id = %user.id, "access token refreshed");

    Ok(HttpResponse::Ok()
        .append_header((header::SET_COOKIE, access.cookie))
        .json(TokenResponse { jwt: access.token }))
}
