//! Post handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use scribe_core::domain::{NewPost, PostPatch};
use scribe_shared::MessageResponse;
use scribe_shared::dto::{CreatePostRequest, TagRef, UpdatePostRequest};

use super::views;
use crate::middleware::auth::{Caller, Guard, Staff};
use crate::middleware::error::AppResult;
use crate::middleware::validation::ValidatedJson;
use crate::state::AppState;

fn tag_ids(tags: Vec<TagRef>) -> Vec<Uuid> {
    tags.into_iter().map(|t| t.id).collect()
}

/// GET /api/v1/posts - published posts.
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.get_posts().await?;
    Ok(HttpResponse::Ok().json(views::posts(&posts)))
}

/// GET /api/v1/posts/tag/{id}
pub async fn by_tag(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let posts = state.posts.get_posts_by_tag(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(views::posts(&posts)))
}

/// GET /api/v1/posts/accessible
pub async fn accessible(state: web::Data<AppState>, guard: Guard<Staff>) -> AppResult<HttpResponse> {
    let posts = state.posts.get_accessible_posts(&guard.caller).await?;
    Ok(HttpResponse::Ok().json(views::posts(&posts)))
}

/// GET /api/v1/posts/{id}
///
/// Anonymous callers only see published posts.
pub async fn get(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    caller: Caller,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .get_post_by_id(path.into_inner(), caller.0.as_ref())
        .await?;
    Ok(HttpResponse::Ok().json(views::post(&post)))
}

/// POST /api/v1/posts
pub async fn create(
    state: web::Data<AppState>,
    body: ValidatedJson<CreatePostRequest>,
    guard: Guard<Staff>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let input = NewPost {
        title: req.title,
        text: req.text,
        tag_ids: tag_ids(req.tags),
    };

    let post = state.posts.create_post(input, &guard.caller).await?;
    Ok(HttpResponse::Created().json(views::post(&post)))
}

/// PATCH /api/v1/posts/{id}
pub async fn edit(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: ValidatedJson<UpdatePostRequest>,
    guard: Guard<Staff>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let patch = PostPatch {
        title: req.title,
        text: req.text,
        tag_ids: req.tags.map(tag_ids),
        is_publish: req.is_publish,
    };

    let post = state
        .posts
        .edit_post(path.into_inner(), patch, &guard.caller)
        .await?;
    Ok(HttpResponse::Ok().json(views::post(&post)))
}

/// DELETE /api/v1/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    guard: Guard<Staff>,
) -> AppResult<HttpResponse> {
    state.posts.delete_post(path.into_inner(), &guard.caller).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Post deleted")))
}
