//! Application state - shared across all handlers.

use std::sync::Arc;

use yatube_core::ports::{
    GroupRepository, PasswordService, PostRepository, RateLimiter, TokenService, UserRepository,
};
use yatube_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    /// Applied to the `/auth` scope when present.
    pub rate_limiter: Option<Arc<dyn RateLimiter>>,
}

impl AppState {
    /// State backed by the in-memory store.
    pub fn in_memory(store: &InMemoryStore, tokens: Arc<dyn TokenService>) -> Self {
        Self {
            users: Arc::new(store.users()),
            groups: Arc::new(store.groups()),
            posts: Arc::new(store.posts()),
            tokens,
            passwords: Arc::new(Argon2PasswordService::new()),
            rate_limiter: None,
        }
    }

    /// Build the application state with the configured backends.
    pub async fn new(config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));

        #[cfg(feature = "postgres")]
        let mut state = match &config.database {
            Some(db_config) => match Self::postgres(db_config, tokens.clone()).await {
                Ok(state) => state,
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Self::in_memory(&InMemoryStore::new(), tokens)
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Self::in_memory(&InMemoryStore::new(), tokens)
            }
        };

        #[cfg(not(feature = "postgres"))]
        let mut state = {
            tracing::info!("Running without postgres feature - using in-memory store");
            Self::in_memory(&InMemoryStore::new(), tokens)
        };

        #[cfg(feature = "rate-limit")]
        {
            state.rate_limiter = Some(Arc::new(yatube_infra::InMemoryRateLimiter::new(
                config.rate_limit.clone(),
            )));
        }

        tracing::info!("Application state initialized");
        state
    }

    #[cfg(feature = "postgres")]
    async fn postgres(
        db_config: &yatube_infra::database::DatabaseConfig,
        tokens: Arc<dyn TokenService>,
    ) -> Result<Self, yatube_core::error::RepoError> {
        use migration::MigratorTrait;
        use yatube_core::error::RepoError;
        use yatube_infra::database::{
            PostgresGroupRepository, PostgresPostRepository, PostgresUserRepository, connect,
        };

        let conn = connect(db_config)
            .await
            .map_err(|e| RepoError::Connection(e.to_string()))?;

        if db_config.auto_migrate {
            migration::Migrator::up(&conn, None)
                .await
                .map_err(|e| RepoError::Query(e.to_string()))?;
            tracing::info!("Pending migrations applied");
        }

        Ok(Self {
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            groups: Arc::new(PostgresGroupRepository::new(conn.clone())),
            posts: Arc::new(PostgresPostRepository::new(conn)),
            tokens,
            passwords: Arc::new(Argon2PasswordService::new()),
            rate_limiter: None,
        })
    }
}
