//! Barista role resolution.
//!
//! A caller is a barista when their lowercased email appears in either of
//! two explicit sources, consulted in order:
//!
//! 1. the immutable allow-list from `BARISTA_EMAILS` (checked first, so a
//!    statically listed barista stays one whatever the table says), or
//! 2. the persisted `baristas` table, reached through a [`BaristaDirectory`].
//!
//! Derivation runs on every authenticated request; nothing is cached. A
//! directory lookup failure downgrades the caller to customer instead of
//! failing the request - permission stays closed, the order flow stays open.

use std::collections::HashSet;

use crate::supabase::{StoreClient, SupabaseError};

/// Lookup capability over the persisted barista list.
#[allow(async_fn_in_trait)]
pub trait BaristaDirectory {
    /// Whether this lowercased email has a row in the barista list.
    async fn contains(&self, email: &str) -> Result<bool, SupabaseError>;
}

impl BaristaDirectory for StoreClient {
    async fn contains(&self, email: &str) -> Result<bool, SupabaseError> {
        self.barista_exists(email).await
    }
}

/// Resolves emails to the barista role.
#[derive(Debug, Clone)]
pub struct RoleResolver {
    static_emails: HashSet<String>,
}

impl RoleResolver {
    /// Create a resolver over a static allow-list of lowercased emails.
    #[must_use]
    pub const fn new(static_emails: HashSet<String>) -> Self {
        Self { static_emails }
    }

    /// Whether the caller is a barista. `None` (no email on the identity)
    /// is never a barista.
    pub async fn is_barista<D: BaristaDirectory>(
        &self,
        directory: &D,
        email: Option<&str>,
    ) -> bool {
        let Some(email) = email else {
            return false;
        };

        if self.static_emails.contains(email) {
            return true;
        }

        match directory.contains(email).await {
            Ok(found) => found,
            Err(error) => {
                tracing::warn!(%error, "barista lookup failed, treating caller as customer");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Directory with a fixed membership answer.
    struct FixedDirectory(bool);

    impl BaristaDirectory for FixedDirectory {
        async fn contains(&self, _email: &str) -> Result<bool, SupabaseError> {
            Ok(self.0)
        }
    }

    /// Directory whose lookups always fail.
    struct BrokenDirectory;

    impl BaristaDirectory for BrokenDirectory {
        async fn contains(&self, _email: &str) -> Result<bool, SupabaseError> {
            Err(SupabaseError::Api {
                status: 500,
                message: "connection reset".to_owned(),
            })
        }
    }

    fn resolver_with(emails: &[&str]) -> RoleResolver {
        RoleResolver::new(emails.iter().map(|e| (*e).to_owned()).collect())
    }

    #[tokio::test]
    async fn test_static_list_grants_role() {
        let resolver = resolver_with(&["anna@cafe.example"]);
        assert!(
            resolver
                .is_barista(&FixedDirectory(false), Some("anna@cafe.example"))
                .await
        );
    }

    #[tokio::test]
    async fn test_static_list_wins_even_when_directory_fails() {
        // A statically listed barista keeps the role whatever the persisted
        // list is doing.
        let resolver = resolver_with(&["anna@cafe.example"]);
        assert!(
            resolver
                .is_barista(&BrokenDirectory, Some("anna@cafe.example"))
                .await
        );
    }

    #[tokio::test]
    async fn test_directory_grants_role() {
        let resolver = resolver_with(&[]);
        assert!(
            resolver
                .is_barista(&FixedDirectory(true), Some("bob@cafe.example"))
                .await
        );
    }

    #[tokio::test]
    async fn test_unknown_email_is_customer() {
        let resolver = resolver_with(&["anna@cafe.example"]);
        assert!(
            !resolver
                .is_barista(&FixedDirectory(false), Some("carol@cafe.example"))
                .await
        );
    }

    #[tokio::test]
    async fn test_directory_failure_degrades_to_customer() {
        let resolver = resolver_with(&[]);
        assert!(
            !resolver
                .is_barista(&BrokenDirectory, Some("bob@cafe.example"))
                .await
        );
    }

    #[tokio::test]
    async fn test_missing_email_is_customer() {
        let resolver = resolver_with(&["anna@cafe.example"]);
        assert!(!resolver.is_barista(&FixedDirectory(true), None).await);
    }
}
