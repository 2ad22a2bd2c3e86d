//! Domain to response DTO mapping.

use scribe_core::domain::{CommentWithAuthor, Comment, Post, Tag, User};
use scribe_shared::dto::{
    CommentResponse, CommenterResponse, PostResponse, TagResponse, UserResponse,
};

pub fn user(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role.to_string(),
        status: user.status.to_string(),
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

pub fn users(users: &[User]) -> Vec<UserResponse> {
    users.iter().map(user).collect()
}

pub fn tag(tag: &Tag) -> TagResponse {
    TagResponse {
        id: tag.id,
        title: tag.title.clone(),
        created_at: tag.created_at,
        updated_at: tag.updated_at,
    }
}

pub fn tags(tags: &[Tag]) -> Vec<TagResponse> {
    tags.iter().map(tag).collect()
}

pub fn post(post: &Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title.clone(),
        text: post.text.clone(),
        views_count: post.views_count,
        is_publish: post.is_publish,
        user_id: post.user_id,
        tags: tags(&post.tags),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

pub fn posts(posts: &[Post]) -> Vec<PostResponse> {
    posts.iter().map(post).collect()
}

pub fn comment(comment: &Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        text: comment.text.clone(),
        is_publish: comment.is_publish,
        post_id: comment.post_id,
        user_id: comment.user_id,
        created_at: comment.created_at,
        updated_at: comment.updated_at,
        user: None,
    }
}

pub fn comments_with_authors(rows: &[CommentWithAuthor]) -> Vec<CommentResponse> {
    rows.iter()
        .map(|row| CommentResponse {
            user: row.author.as_ref().map(|a| CommenterResponse {
                id: a.id,
                name: a.name.clone(),
                email: a.email.clone(),
            }),
            ..comment(&row.comment)
        })
        .collect()
}
