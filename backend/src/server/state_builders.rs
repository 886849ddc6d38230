//! Builders for the store adapters and the HTTP handler state.
//!
//! Without a database DSN every port is backed by the in-memory adapters;
//! with one, a Diesel pool is opened, migrations are applied and the
//! PostgreSQL adapters are used instead.

use std::sync::Arc;
use std::time::Duration;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use todo_backend::domain::ports::{ItemListService, SessionStore, StoreStats, TodoStore, UserService};
use todo_backend::domain::{
    ApiKey, SessionService, StoreContext, StoreItemListService, StoreUserService,
};
use todo_backend::inbound::http::state::HttpState;
use todo_backend::outbound::memory::{MemorySessionStore, MemoryStoreStats, MemoryTodoStore};
use todo_backend::outbound::persistence::{
    DbPool, DieselSessionStore, DieselStoreStats, DieselTodoStore, PoolConfig, QueryLog,
    run_migrations,
};
use todo_backend::settings::Settings;

/// How long startup waits for PostgreSQL to answer.
const DATABASE_READY_BUDGET: Duration = Duration::from_secs(15);

/// Store, session and statistics adapters sharing one backing store.
#[derive(Clone)]
pub struct Backend {
    pub(crate) store: Arc<dyn TodoStore>,
    pub(crate) sessions: Arc<dyn SessionStore>,
    pub(crate) stats: Arc<dyn StoreStats>,
}

impl Backend {
    /// Process-local adapters; all data is lost on exit.
    pub fn memory() -> Self {
        let store = MemoryTodoStore::new();
        let sessions = MemorySessionStore::new();
        let stats = MemoryStoreStats::new(store.clone(), sessions.clone());
        Self {
            store: Arc::new(store),
            sessions: Arc::new(sessions),
            stats: Arc::new(stats),
        }
    }

    /// PostgreSQL adapters over a fresh pool, after applying migrations.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] when the pool cannot be built, the
    /// database never answers or a migration fails.
    pub async fn postgres(dsn: &str, max_connections: u32, log: QueryLog) -> std::io::Result<Self> {
        let config = PoolConfig::new(dsn).with_max_size(max_connections);
        let pool = DbPool::new(config)
            .await
            .map_err(|e| std::io::Error::other(format!("database pool setup failed: {e}")))?;
        pool.wait_until_ready(DATABASE_READY_BUDGET)
            .await
            .map_err(|e| std::io::Error::other(format!("database unavailable: {e}")))?;
        let applied = run_migrations(dsn)
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        info!(applied, max_connections, "database ready");

        Ok(Self {
            store: Arc::new(DieselTodoStore::new(pool.clone()).with_query_log(log)),
            sessions: Arc::new(DieselSessionStore::new(pool.clone()).with_query_log(log)),
            stats: Arc::new(DieselStoreStats::new(pool)),
        })
    }

    /// Pick the adapters named by `settings`.
    ///
    /// # Errors
    ///
    /// See [`Backend::postgres`].
    pub async fn from_settings(settings: &Settings) -> std::io::Result<Self> {
        match settings.db_dsn.as_deref() {
            Some(dsn) => {
                Self::postgres(
                    dsn,
                    settings.db_max_connections(),
                    QueryLog::new(settings.db_query_logging),
                )
                .await
            }
            None => {
                warn!("no database DSN configured; data is kept in memory");
                Ok(Self::memory())
            }
        }
    }

    /// Session lifecycle service over this backend's session store.
    pub fn session_service(&self, clock: Arc<dyn Clock>) -> SessionService {
        SessionService::new(self.sessions.clone(), clock)
    }
}

/// Assemble the handler state over `backend`.
///
/// Every store operation started by a request is bounded by
/// `request_timeout`.
pub fn build_http_state(
    backend: &Backend,
    sessions: SessionService,
    admin_key: ApiKey,
    request_timeout: Duration,
) -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let context = StoreContext::new(backend.store.clone(), clock).with_deadline(request_timeout);
    let users: Arc<dyn UserService> = Arc::new(StoreUserService::new(context.clone()));
    let lists: Arc<dyn ItemListService> = Arc::new(StoreItemListService::new(context));
    HttpState::new(users, lists, sessions, admin_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_backend::domain::NewUser;

    #[tokio::test]
    async fn memory_backend_serves_the_user_service() {
        let backend = Backend::memory();
        let sessions = backend.session_service(Arc::new(DefaultClock));
        let state = build_http_state(
            &backend,
            sessions,
            ApiKey::generate(),
            Duration::from_secs(6),
        );

        let created = state
            .users
            .register_user(NewUser::new("alice"))
            .await
            .expect("registration succeeds");
        let found = state
            .users
            .find_user_by_name("ALICE")
            .await
            .expect("lookup succeeds");
        assert_eq!(found.id, created.id);

        let counts = backend.stats.counts().await.expect("counts");
        assert_eq!(counts.users, 1);
    }
}
