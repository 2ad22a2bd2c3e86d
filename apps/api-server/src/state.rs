//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use scribe_core::ports::{
    CommentRepository, Mailer, PasswordService, PostRepository, TagRepository, TokenService,
    UserRepository,
};
use scribe_core::services::{AuthService, CommentService, PostService, TagService, UserService};
use scribe_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService, TemplatedMailer};

#[cfg(feature = "postgres")]
use scribe_infra::DatabaseConnections;
#[cfg(feature = "postgres")]
use scribe_infra::database::{
    PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
    PostgresUserRepository,
};

use crate::config::AppConfig;

/// Repository handles the services are built from.
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        let store = InMemoryStore::new();
        Self {
            users: store.users,
            posts: store.posts,
            tags: store.tags,
            comments: store.comments,
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(db: &DatabaseConnections) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(db.main.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.main.clone())),
            tags: Arc::new(PostgresTagRepository::new(db.main.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db.main.clone())),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub posts: Arc<PostService>,
    pub tags: Arc<TagService>,
    pub comments: Arc<CommentService>,
    pub tokens: Arc<dyn TokenService>,
    pub started_at: Instant,
}

impl AppState {
    /// Wire the services over the given repositories and adapters.
    pub fn from_parts(
        repos: Repositories,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let users = Arc::new(UserService::new(repos.users.clone()));
        let auth = Arc::new(AuthService::new(
            repos.users,
            users.clone(),
            passwords,
            tokens.clone(),
            mailer,
        ));

        Self {
            auth,
            users,
            posts: Arc::new(PostService::new(repos.posts.clone(), repos.tags.clone())),
            tags: Arc::new(TagService::new(repos.tags)),
            comments: Arc::new(CommentService::new(repos.comments, repos.posts)),
            tokens,
            started_at: Instant::now(),
        }
    }
}

/// What `main` needs to serve and later shut down.
pub struct Bootstrap {
    pub state: AppState,
    #[cfg(feature = "postgres")]
    pub db: Option<DatabaseConnections>,
}

impl Bootstrap {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> std::io::Result<Self> {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));

        let passwords = match config.password_cost {
            Some(cost) => Argon2PasswordService::with_cost(cost),
            None => Ok(Argon2PasswordService::new()),
        }
        .map_err(std::io::Error::other)?;

        let mailer = Arc::new(match &config.mail_relay_url {
            #[cfg(feature = "mail-relay")]
            Some(url) => {
                tracing::info!("Mail relay configured");
                TemplatedMailer::new(
                    config.mail.clone(),
                    Arc::new(scribe_infra::HttpRelayTransport::new(url.clone())),
                )
            }
            _ => {
                tracing::info!("No mail relay - account mail will only be logged");
                TemplatedMailer::logging(config.mail.clone())
            }
        });

        #[cfg(feature = "postgres")]
        let (db, repos) = match &config.database {
            Some(db_config) => match DatabaseConnections::init(db_config).await {
                Ok(connections) => {
                    let repos = Repositories::postgres(&connections);
                    (Some(connections), repos)
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    (None, Repositories::in_memory())
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                (None, Repositories::in_memory())
            }
        };

        #[cfg(not(feature = "postgres"))]
        let repos = {
            tracing::info!("Running without postgres feature - using in-memory repositories");
            Repositories::in_memory()
        };

        let state = AppState::from_parts(repos, tokens, Arc::new(passwords), mailer);
        tracing::info!("Application state initialized");

        Ok(Self {
            state,
            #[cfg(feature = "postgres")]
            db,
        })
    }
}
