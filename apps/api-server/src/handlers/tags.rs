//! Tag handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use scribe_core::domain::NewTag;
use scribe_shared::MessageResponse;
use scribe_shared::dto::CreateTagRequest;

use super::views;
use crate::middleware::auth::{AdminOnly, Guard, Staff};
use crate::middleware::error::AppResult;
use crate::middleware::validation::ValidatedJson;
use crate::state::AppState;

/// GET /api/v1/tag
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let tags = state.tags.get_tags().await?;
    Ok(HttpResponse::Ok().json(views::tags(&tags)))
}

/// GET /api/v1/tag/{id}
pub async fn get(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    _guard: Guard<Staff>,
) -> AppResult<HttpResponse> {
    let tag = state.tags.get_tag_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(views::tag(&tag)))
}

/// POST /api/v1/tag
pub async fn create(
    state: web::Data<AppState>,
    body: ValidatedJson<CreateTagRequest>,
    _guard: Guard<AdminOnly>,
) -> AppResult<HttpResponse> {
    let tag = state
        .tags
        .create_tag(NewTag {
            title: body.into_inner().title,
        })
        .await?;
    Ok(HttpResponse::Created().json(views::tag(&tag)))
}

/// DELETE /api/v1/tag/{id}
pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    _guard: Guard<AdminOnly>,
) -> AppResult<HttpResponse> {
    state.tags.delete_tag_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Tag deleted")))
}
