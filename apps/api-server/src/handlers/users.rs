//! User handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use scribe_core::domain::{Role, UserPatch, UserStatus};
use scribe_shared::dto::UpdateUserRequest;

use super::views;
use crate::middleware::auth::{AdminOnly, AnyRole, Guard};
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::validation::ValidatedJson;
use crate::state::AppState;

/// GET /api/v1/user
pub async fn list(state: web::Data<AppState>, _guard: Guard<AdminOnly>) -> AppResult<HttpResponse> {
    let users = state.users.find_users().await?;
    Ok(HttpResponse::Ok().json(views::users(&users)))
}

/// GET /api/v1/user/me
pub async fn me(state: web::Data<AppState>, guard: Guard<AnyRole>) -> AppResult<HttpResponse> {
    let user = state.users.find_me(guard.caller.id).await?;
    Ok(HttpResponse::Ok().json(views::user(&user)))
}

/// PATCH /api/v1/user/{id}
pub async fn edit(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: ValidatedJson<UpdateUserRequest>,
    _guard: Guard<AdminOnly>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let unprocessable = |e: scribe_core::domain::ParseEnumError| AppError::Unprocessable(e.to_string());
    let patch = UserPatch {
        role: req.role.as_deref().map(str::parse::<Role>).transpose().map_err(unprocessable)?,
        status: req
            .status
            .as_deref()
            .map(str::parse::<UserStatus>)
            .transpose()
            .map_err(unprocessable)?,
    };

    let user = state.users.edit_user(path.into_inner(), patch).await?;
    Ok(HttpResponse::Ok().json(views::user(&user)))
}
