use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{NewPost, Post, PostPatch, Tag};
use crate::error::{DomainError, DomainResult};
use crate::policy::{self, Action, Ownership};
use crate::ports::{BaseRepository, PostRepository, TagRepository, TokenPayload};

/// Post management with publish-state visibility rules.
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    tags: Arc<dyn TagRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, tags: Arc<dyn TagRepository>) -> Self {
        Self { posts, tags }
    }

    /// Published posts.
    pub async fn get_posts(&self) -> DomainResult<Vec<Post>> {
        Ok(self.posts.find_published().await?)
    }

    /// Published posts carrying `tag_id`.
    pub async fn get_posts_by_tag(&self, tag_id: Uuid) -> DomainResult<Vec<Post>> {
        Ok(self.posts.find_published_by_tag(tag_id).await?)
    }

    /// Everything for ADMIN; the ownership proxy for everyone else.
    pub async fn get_accessible_posts(&self, caller: &TokenPayload) -> DomainResult<Vec<Post>> {
        let posts = self.posts.find_all().await?;
        if policy::evaluate(Some(caller.role), Action::ListAllPosts, Ownership::NotOwner).is_allowed() {
            return Ok(posts);
        }

        Ok(posts
            .into_iter()
            .filter(|p| Ownership::of_post(p, caller.id) == Ownership::Owner)
            .collect())
    }

    pub async fn create_post(&self, input: NewPost, caller: &TokenPayload) -> DomainResult<Post> {
        let tags = self.resolve_tags(&input.tag_ids).await?;
        let is_publish =
            policy::evaluate(Some(caller.role), Action::PublishOnCreate, Ownership::Owner).is_allowed();

        let post = Post::new(caller.id, input.title, input.text, is_publish, tags);
        let saved = self.posts.insert(post).await?;
        tracing::info!(post_id = %saved.id, user_id = %caller.id, is_publish, "post created");
        Ok(saved)
    }

    /// Edit a post. Only ADMIN may change its publish state.
    pub async fn edit_post(
        &self,
        id: Uuid,
        patch: PostPatch,
        caller: &TokenPayload,
    ) -> DomainResult<Post> {
        let mut post = self.find(id).await?;
        if !policy::is_accessible(Some(caller), &post) {
            return Err(DomainError::forbidden("Access denied"));
        }

        let may_publish =
            policy::evaluate(Some(caller.role), Action::ChangePublishState, Ownership::of_post(&post, caller.id))
                .is_allowed();
        if may_publish {
            if let Some(is_publish) = patch.is_publish {
                post.is_publish = is_publish;
            }
        }

        if let Some(title) = patch.title {
            post.title = title;
        }
        if let Some(text) = patch.text {
            post.text = text;
        }
        if let Some(tag_ids) = patch.tag_ids {
            for tag in self.resolve_tags(&tag_ids).await? {
                if !post.tags.iter().any(|t| t.id == tag.id) {
                    post.tags.push(tag);
                }
            }
        }
        post.updated_at = Utc::now();

        Ok(self.posts.update(post).await?)
    }

    /// A post is visible when published or when the caller is accessible.
    pub async fn get_post_by_id(&self, id: Uuid, caller: Option<&TokenPayload>) -> DomainResult<Post> {
        let post = self.find(id).await?;
        let ownership = caller
            .map(|c| Ownership::of_post(&post, c.id))
            .unwrap_or(Ownership::NotOwner);
        let action = Action::ReadPost {
            published: post.is_publish,
        };

        if policy::evaluate(caller.map(|c| c.role), action, ownership).is_allowed() {
            Ok(post)
        } else {
            Err(DomainError::forbidden("Access denied"))
        }
    }

    pub async fn delete_post(&self, id: Uuid, caller: &TokenPayload) -> DomainResult<()> {
        let post = self.find(id).await?;
        if !policy::is_accessible(Some(caller), &post) {
            return Err(DomainError::forbidden("Access denied"));
        }

        self.posts.delete(id).await?;
        tracing::info!(post_id = %id, user_id = %caller.id, "post deleted");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> DomainResult<Post> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post not found"))
    }

    async fn resolve_tags(&self, ids: &[Uuid]) -> DomainResult<Vec<Tag>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let tags = self.tags.find_by_ids(ids).await?;
        if let Some(missing) = ids.iter().find(|id| !tags.iter().any(|t| t.id == **id)) {
            return Err(DomainError::NotFound(format!("Tag {missing} not found")));
        }
        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::services::testing::Table;

    struct Fixture {
        service: PostService,
        posts: Arc<Table<Post>>,
        tags: Arc<Table<Tag>>,
    }

    fn fixture() -> Fixture {
        let posts = Arc::new(Table::<Post>::default());
        let tags = Arc::new(Table::<Tag>::default());
        Fixture {
            service: PostService::new(posts.clone(), tags.clone()),
            posts,
            tags,
        }
    }

    fn caller(role: Role) -> TokenPayload {
        TokenPayload {
            id: Uuid::new_v4(),
            email: format!("{}@mail.ru", role.as_str().to_lowercase()),
            role,
        }
    }

    async fn seed_post(f: &Fixture, is_publish: bool) -> Post {
        let post = Post::new(Uuid::new_v4(), "Title 1".into(), "Some text".into(), is_publish, vec![]);
        f.posts.insert(post).await.unwrap()
    }

    fn new_post(tag_ids: Vec<Uuid>) -> NewPost {
        NewPost {
            title: "Title 1".into(),
            text: "Some text".into(),
            tag_ids,
        }
    }

    #[tokio::test]
    async fn admin_posts_are_published_on_create() {
        let f = fixture();
        let tag = f.tags.insert(Tag::new("animal".into())).await.unwrap();

        let post = f.service.create_post(new_post(vec![tag.id]), &caller(Role::Admin)).await.unwrap();
        assert!(post.is_publish);
        assert_eq!(post.tags, vec![tag]);

        let post = f.service.create_post(new_post(vec![]), &caller(Role::Manager)).await.unwrap();
        assert!(!post.is_publish);
    }

    #[tokio::test]
    async fn create_post_with_unknown_tag_fails() {
        let f = fixture();
        let err = f
            .service
            .create_post(new_post(vec![Uuid::new_v4()]), &caller(Role::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn listings_only_show_published_posts() {
        let f = fixture();
        let tag = f.tags.insert(Tag::new("tagged".into())).await.unwrap();
        let mut published = seed_post(&f, true).await;
        published.tags.push(tag.clone());
        f.posts.update(published.clone()).await.unwrap();
        seed_post(&f, false).await;

        let posts = f.service.get_posts().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, published.id);

        let by_tag = f.service.get_posts_by_tag(tag.id).await.unwrap();
        assert_eq!(by_tag.len(), 1);
        assert!(f.service.get_posts_by_tag(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unpublished_post_is_forbidden_to_non_accessible_callers() {
        let f = fixture();
        let post = seed_post(&f, false).await;

        for who in [None, Some(caller(Role::User)), Some(caller(Role::Manager))] {
            let err = f.service.get_post_by_id(post.id, who.as_ref()).await.unwrap_err();
            assert!(matches!(err, DomainError::Forbidden(_)));
        }

        let admin = caller(Role::Admin);
        assert_eq!(f.service.get_post_by_id(post.id, Some(&admin)).await.unwrap().id, post.id);
    }

    #[tokio::test]
    async fn manager_matching_post_id_may_read_unpublished() {
        let f = fixture();
        let post = seed_post(&f, false).await;
        let manager = TokenPayload {
            id: post.id,
            ..caller(Role::Manager)
        };

        assert!(f.service.get_post_by_id(post.id, Some(&manager)).await.is_ok());
    }

    #[tokio::test]
    async fn published_post_is_visible_to_anyone() {
        let f = fixture();
        let post = seed_post(&f, true).await;
        assert!(f.service.get_post_by_id(post.id, None).await.is_ok());

        let err = f.service.get_post_by_id(Uuid::new_v4(), None).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn admin_edit_may_change_publish_state() {
        let f = fixture();
        let post = seed_post(&f, false).await;
        let patch = PostPatch {
            title: Some("New Title 1".into()),
            text: Some("New Some text".into()),
            is_publish: Some(true),
            ..Default::default()
        };

        let edited = f.service.edit_post(post.id, patch, &caller(Role::Admin)).await.unwrap();
        assert_eq!(edited.title, "New Title 1");
        assert_eq!(edited.text, "New Some text");
        assert!(edited.is_publish);
    }

    #[tokio::test]
    async fn non_admin_edit_keeps_publish_state() {
        let f = fixture();
        let post = seed_post(&f, false).await;
        let manager = TokenPayload {
            id: post.id,
            ..caller(Role::Manager)
        };
        let patch = PostPatch {
            title: Some("Renamed".into()),
            is_publish: Some(true),
            ..Default::default()
        };

        let edited = f.service.edit_post(post.id, patch, &manager).await.unwrap();
        assert_eq!(edited.title, "Renamed");
        assert!(!edited.is_publish);
    }

    #[tokio::test]
    async fn edit_connects_additional_tags() {
        let f = fixture();
        let first = f.tags.insert(Tag::new("first".into())).await.unwrap();
        let second = f.tags.insert(Tag::new("second".into())).await.unwrap();
        let post = f.service.create_post(new_post(vec![first.id]), &caller(Role::Admin)).await.unwrap();

        let patch = PostPatch {
            tag_ids: Some(vec![first.id, second.id]),
            ..Default::default()
        };
        let edited = f.service.edit_post(post.id, patch, &caller(Role::Admin)).await.unwrap();
        assert_eq!(edited.tag_ids(), vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn edit_and_delete_check_existence_then_access() {
        let f = fixture();
        let user = caller(Role::User);

        let err = f
            .service
            .edit_post(Uuid::new_v4(), PostPatch::default(), &user)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        let post = seed_post(&f, true).await;
        let err = f.service.delete_post(post.id, &caller(Role::Manager)).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        f.service.delete_post(post.id, &caller(Role::Admin)).await.unwrap();
        assert!(f.posts.rows().is_empty());
    }

    #[tokio::test]
    async fn accessible_posts_depend_on_role() {
        let f = fixture();
        let hidden = seed_post(&f, false).await;
        seed_post(&f, true).await;

        assert_eq!(f.service.get_accessible_posts(&caller(Role::Admin)).await.unwrap().len(), 2);
        assert!(f.service.get_accessible_posts(&caller(Role::Manager)).await.unwrap().is_empty());

        let proxy = TokenPayload {
            id: hidden.id,
            ..caller(Role::Manager)
        };
        let posts = f.service.get_accessible_posts(&proxy).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, hidden.id);
    }
}
