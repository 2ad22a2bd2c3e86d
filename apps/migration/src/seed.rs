//! Default accounts for a fresh database.
//!
//! Active accounts get a post carrying its own tag. Accounts whose email is
//! already taken are skipped, so seeding can be re-run.

use std::sync::Arc;

use scribe_core::domain::{Post, Role, Tag, User, UserStatus};
use scribe_core::error::RepoError;
use scribe_core::ports::{
    AuthError, BaseRepository, PasswordService, PostRepository, TagRepository, UserRepository,
};
use scribe_infra::database::{
    PostgresPostRepository, PostgresTagRepository, PostgresUserRepository,
};
use scribe_infra::{Argon2PasswordService, DatabaseConfig, DatabaseConnections};
use sea_orm_migration::sea_orm::DbErr;

const DEFAULT_PASSWORD: &str = "11111111";

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Repository(#[from] RepoError),
    #[error(transparent)]
    Password(#[from] AuthError),
}

pub struct SeedPost {
    pub title: &'static str,
    pub text: &'static str,
    pub is_publish: bool,
    pub tag: &'static str,
}

pub struct SeedAccount {
    pub name: &'static str,
    pub email: &'static str,
    pub role: Role,
    pub status: UserStatus,
    pub post: Option<SeedPost>,
}

pub fn default_accounts() -> Vec<SeedAccount> {
    vec![
        SeedAccount {
            name: "Admin",
            email: "admin@admin.com",
            role: Role::Admin,
            status: UserStatus::Active,
            post: Some(SeedPost {
                title: "post Title",
                text: "some text",
                is_publish: true,
                tag: "animal",
            }),
        },
        SeedAccount {
            name: "User2",
            email: "user2@user.com",
            role: Role::User,
            status: UserStatus::Active,
            post: Some(SeedPost {
                title: "post Title3",
                text: "some text3",
                is_publish: false,
                tag: "art",
            }),
        },
        SeedAccount {
            name: "user1",
            email: "user1@user.com",
            role: Role::User,
            status: UserStatus::Inactive,
            post: None,
        },
        SeedAccount {
            name: "Manager",
            email: "manager@manager.com",
            role: Role::Manager,
            status: UserStatus::Active,
            post: Some(SeedPost {
                title: "post Title2",
                text: "some text2",
                is_publish: true,
                tag: "flowers",
            }),
        },
    ]
}

/// Repositories the seeder writes through.
pub struct Seeder {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    tags: Arc<dyn TagRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl Seeder {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        tags: Arc<dyn TagRepository>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            users,
            posts,
            tags,
            passwords,
        }
    }

    /// Insert `accounts`, returning how many were created.
    pub async fn run(&self, accounts: &[SeedAccount], password: &str) -> Result<usize, SeedError> {
        tracing::info!("Start seeding ...");
        let mut created = 0;

        for account in accounts {
            if self.users.find_by_email(account.email).await?.is_some() {
                tracing::info!(email = account.email, "user already exists, skipping");
                continue;
            }

            let mut user = User::new(
                account.name.to_string(),
                account.email.to_string(),
                self.passwords.hash(password)?,
            );
            user.role = account.role;
            user.status = account.status;
            let user = self.users.insert(user).await?;
            tracing::info!(user_id = %user.id, "created user");

            if let Some(post) = &account.post {
                let tag = self.tag(post.tag).await?;
                let mut entry = Post::new(
                    user.id,
                    post.title.to_string(),
                    post.text.to_string(),
                    post.is_publish,
                    vec![tag],
                );
                entry.views_count = 1;
                self.posts.insert(entry).await?;
            }
            created += 1;
        }

        tracing::info!(created, "Seeding finished.");
        Ok(created)
    }

    async fn tag(&self, title: &str) -> Result<Tag, SeedError> {
        match self.tags.find_by_title(title).await? {
            Some(tag) => Ok(tag),
            None => Ok(self.tags.insert(Tag::new(title.to_string())).await?),
        }
    }
}

/// Seed the database named by `DATABASE_URL`. The password comes from
/// `ROOT_PASSWORD` when set.
pub async fn run_from_env() -> Result<(), SeedError> {
    let config = DatabaseConfig::from_env().ok_or(SeedError::MissingDatabaseUrl)?;
    let db = DatabaseConnections::init(&config).await?;
    let password = std::env::var("ROOT_PASSWORD").unwrap_or_else(|_| DEFAULT_PASSWORD.to_string());
    let passwords = match std::env::var("SALT").ok().and_then(|s| s.parse().ok()) {
        Some(cost) => Argon2PasswordService::with_cost(cost)?,
        None => Argon2PasswordService::new(),
    };

    let seeder = Seeder::new(
        Arc::new(PostgresUserRepository::new(db.main.clone())),
        Arc::new(PostgresPostRepository::new(db.main.clone())),
        Arc::new(PostgresTagRepository::new(db.main.clone())),
        Arc::new(passwords),
    );
    let result = seeder.run(&default_accounts(), &password).await;

    db.close().await?;
    result.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_infra::InMemoryStore;

    fn seeder(store: &InMemoryStore) -> Seeder {
        Seeder::new(
            store.users.clone(),
            store.posts.clone(),
            store.tags.clone(),
            Arc::new(Argon2PasswordService::with_cost(1).unwrap()),
        )
    }

    #[tokio::test]
    async fn seeds_accounts_posts_and_tags() {
        let store = InMemoryStore::new();
        let created = seeder(&store).run(&default_accounts(), DEFAULT_PASSWORD).await.unwrap();
        assert_eq!(created, 4);

        let admin = store.users.find_by_email("admin@admin.com").await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(admin.is_active());
        assert_ne!(admin.password_hash, DEFAULT_PASSWORD);

        let published = store.posts.find_published().await.unwrap();
        assert_eq!(published.len(), 2);
        assert!(store.tags.find_by_title("flowers").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn rerun_skips_existing_accounts() {
        let store = InMemoryStore::new();
        let seeder = seeder(&store);
        seeder.run(&default_accounts(), DEFAULT_PASSWORD).await.unwrap();

        let created = seeder.run(&default_accounts(), DEFAULT_PASSWORD).await.unwrap();
        assert_eq!(created, 0);
        assert_eq!(store.users.find_all().await.unwrap().len(), 4);
    }
}
