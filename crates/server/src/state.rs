//! Shared application state.

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::TokenKeys;
use crate::config::ServerConfig;
use crate::services::notifier::NotificationQueue;

/// Shared state handed to every handler. Cloning is cheap; the inner state
/// sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    token_keys: TokenKeys,
    notifier: NotificationQueue,
}

impl AppState {
    /// Assemble state from loaded configuration and a connected pool.
    ///
    /// Spawns the notification worker as a side effect, so this must run
    /// inside a tokio runtime.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let token_keys = TokenKeys::new(&config.token_secret, config.token_ttl_secs);
        let notifier = NotificationQueue::from_config(&config.notifier);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                token_keys,
                notifier,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn token_keys(&self) -> &TokenKeys {
        &self.inner.token_keys
    }

    #[must_use]
    pub fn notifier(&self) -> &NotificationQueue {
        &self.inner.notifier
    }
}
