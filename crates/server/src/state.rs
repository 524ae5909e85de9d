//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::services::roles::RoleResolver;
use crate::supabase::{AuthClient, StoreClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// Supabase clients and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    auth: AuthClient,
    store: StoreClient,
    roles: RoleResolver,
}

impl AppState {
    /// Create a new application state from configuration.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let auth = AuthClient::new(&config.supabase);
        let store = StoreClient::new(&config.supabase);
        let roles = RoleResolver::new(config.barista_emails.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                auth,
                store,
                roles,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the GoTrue auth client.
    #[must_use]
    pub fn auth(&self) -> &AuthClient {
        &self.inner.auth
    }

    /// Get a reference to the PostgREST data client.
    #[must_use]
    pub fn store(&self) -> &StoreClient {
        &self.inner.store
    }

    /// Get a reference to the role resolver.
    #[must_use]
    pub fn roles(&self) -> &RoleResolver {
        &self.inner.roles
    }
}
