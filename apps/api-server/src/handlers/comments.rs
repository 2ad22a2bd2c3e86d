//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use scribe_core::domain::NewComment;
use scribe_shared::MessageResponse;
use scribe_shared::dto::CreateCommentRequest;

use super::views;
use crate::middleware::auth::{AnyRole, Guard, Staff};
use crate::middleware::error::AppResult;
use crate::middleware::validation::ValidatedJson;
use crate::state::AppState;

/// POST /api/v1/comment
///
/// Comments from an ADMIN are published straight away.
pub async fn create(
    state: web::Data<AppState>,
    body: ValidatedJson<CreateCommentRequest>,
    guard: Guard<AnyRole>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let input = NewComment {
        text: req.text,
        post_id: req.post_id,
        is_publish: req.is_publish,
    };

    let comment = state.comments.create(&guard.caller, input).await?;
    Ok(HttpResponse::Created().json(views::comment(&comment)))
}

/// DELETE /api/v1/comment/{id}
pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    _guard: Guard<Staff>,
) -> AppResult<HttpResponse> {
    state.comments.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Comment deleted")))
}

/// PATCH /api/v1/comment/publish/{id}
pub async fn publish(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    _guard: Guard<Staff>,
) -> AppResult<HttpResponse> {
    let comment = state.comments.publish_comment(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(views::comment(&comment)))
}

/// GET /api/v1/comment/published/{postId}
pub async fn published(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let rows = state
        .comments
        .get_published_comments_by_post_id(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(views::comments_with_authors(&rows)))
}

/// GET /api/v1/comment/unpublished/{postId}
pub async fn unpublished(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    _guard: Guard<Staff>,
) -> AppResult<HttpResponse> {
    let rows = state
        .comments
        .get_unpublished_comments_by_post_id(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(views::comments_with_authors(&rows)))
}
