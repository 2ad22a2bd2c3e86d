//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use uuid::Uuid;

use scribe_core::domain::{Comment, CommentWithAuthor, Commenter, Post, Tag, User, UserStatus};
use scribe_core::error::RepoError;
use scribe_core::ports::{
    BaseRepository, CommentRepository, PostRepository, TagRepository, UserRepository,
};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = if local.len() > 1 {
                format!("{}***", &local[..1])
            } else {
                "***".to_string()
            };
            format!("{}{}", masked_local, domain)
        }
        None => "***".to_string(),
    }
}

impl PostgresUserRepository {
    async fn load(&self, id: Uuid) -> Result<user::ActiveModel, RepoError> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(IntoActiveModel::into_active_model)
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }

    async fn update_status(&self, id: Uuid, status: UserStatus) -> Result<User, RepoError> {
        let mut model = self.load(id).await?;
        model.status = Set(status.into());
        model.updated_at = Set(Utc::now().into());

        Ok(model.update(&self.db).await.map_err(db_err)?.into())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<User, RepoError> {
        let mut model = self.load(id).await?;
        model.password_hash = Set(password_hash.to_string());
        model.updated_at = Set(Utc::now().into());

        Ok(model.update(&self.db).await.map_err(db_err)?.into())
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_title(&self, title: &str) -> Result<Option<Tag>, RepoError> {
        let result = TagEntity::find()
            .filter(tag::Column::Title.eq(title))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tag>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = TagEntity::find()
            .filter(tag::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn publish(&self, id: Uuid) -> Result<Comment, RepoError> {
        let mut model = CommentEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(IntoActiveModel::into_active_model)
            .ok_or(RepoError::NotFound)?;
        model.is_publish = Set(true);
        model.updated_at = Set(Utc::now().into());

        Ok(model.update(&self.db).await.map_err(db_err)?.into())
    }

    async fn find_by_post(
        &self,
        post_id: Uuid,
        is_publish: bool,
    ) -> Result<Vec<CommentWithAuthor>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::IsPublish.eq(is_publish))
            .order_by_asc(comment::Column::CreatedAt)
            .find_also_related(UserEntity)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|(comment, author)| CommentWithAuthor {
                comment: comment.into(),
                author: author.map(|u| Commenter {
                    id: u.id,
                    name: u.name,
                    email: u.email,
                }),
            })
            .collect())
    }
}

/// PostgreSQL post repository. Keeps `post_tags` in step with the post's tags.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    async fn with_tags(
        &self,
        query: sea_orm::Select<PostEntity>,
    ) -> Result<Vec<Post>, RepoError> {
        let rows = query
            .find_with_related(TagEntity)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|(post, tags)| post.into_post(tags))
            .collect())
    }

    async fn link_tags<C>(conn: &C, post: &Post) -> Result<(), RepoError>
    where
        C: sea_orm::ConnectionTrait,
    {
        if post.tags.is_empty() {
            return Ok(());
        }

        let links = post.tags.iter().map(|t| post_tag::ActiveModel {
            post_id: Set(post.id),
            tag_id: Set(t.id),
        });
        PostTagEntity::insert_many(links)
            .exec_without_returning(conn)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self
            .with_tags(PostEntity::find_by_id(id))
            .await?
            .into_iter()
            .next())
    }

    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        self.with_tags(PostEntity::find()).await
    }

    async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let model = post::ActiveModel::from(&entity)
            .insert(&txn)
            .await
            .map_err(db_err)?;
        Self::link_tags(&txn, &entity).await?;

        txn.commit().await.map_err(db_err)?;
        Ok(Post {
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
            ..entity
        })
    }

    async fn update(&self, entity: Post) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let model = post::ActiveModel::from(&entity)
            .update(&txn)
            .await
            .map_err(db_err)?;
        PostTagEntity::delete_many()
            .filter(post_tag::Column::PostId.eq(entity.id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        Self::link_tags(&txn, &entity).await?;

        txn.commit().await.map_err(db_err)?;
        Ok(Post {
            updated_at: model.updated_at.into(),
            ..entity
        })
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        tracing::debug!(post_id = %id, "post removed with its tag links");
        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_published(&self) -> Result<Vec<Post>, RepoError> {
        self.with_tags(PostEntity::find().filter(post::Column::IsPublish.eq(true)))
            .await
    }

    async fn find_published_by_tag(&self, tag_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let post_ids: Vec<Uuid> = PostTagEntity::find()
            .filter(post_tag::Column::TagId.eq(tag_id))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|link| link.post_id)
            .collect();

        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        self.with_tags(
            PostEntity::find()
                .filter(post::Column::Id.is_in(post_ids))
                .filter(post::Column::IsPublish.eq(true)),
        )
        .await
    }
}
