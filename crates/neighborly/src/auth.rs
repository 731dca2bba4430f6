//! Session authentication seam.
//!
//! The session layer is an external collaborator; this module defines the
//! trait the HTTP layer consumes to turn a bearer token into a
//! [`CurrentActor`], plus a static-token implementation that stands in for
//! it when running standalone.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::config::AuthConfig;
use crate::error::Result;
use crate::model::CurrentActor;

/// Resolves session tokens into actors.
#[async_trait]
pub trait SessionAuth: Send + Sync {
    /// Resolve a bearer token into an actor.
    ///
    /// Returns `Ok(None)` for an unknown token; an authenticated session
    /// with no active person resolves to an actor with `person_id: None`,
    /// which is a valid state.
    ///
    /// # Errors
    ///
    /// Returns an error if the session backend cannot be reached.
    async fn resolve(&self, token: &str) -> Result<Option<CurrentActor>>;
}

/// Session authentication backed by a static token table from the config.
#[derive(Debug, Default)]
pub struct StaticSessionAuth {
    tokens: HashMap<String, CurrentActor>,
}

impl StaticSessionAuth {
    /// Build the token table from the auth configuration.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        let tokens = config
            .tokens
            .iter()
            .map(|entry| {
                (
                    entry.token.clone(),
                    CurrentActor {
                        person_id: entry.person_id,
                        is_system_admin: entry.is_system_admin,
                    },
                )
            })
            .collect();
        Self { tokens }
    }

    /// Number of configured tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no tokens are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl SessionAuth for StaticSessionAuth {
    async fn resolve(&self, token: &str) -> Result<Option<CurrentActor>> {
        Ok(self.tokens.get(token).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionTokenConfig;

    fn auth_config() -> AuthConfig {
        AuthConfig {
            tokens: vec![
                SessionTokenConfig {
                    token: "ada-token".to_string(),
                    person_id: Some(1),
                    is_system_admin: false,
                },
                SessionTokenConfig {
                    token: "admin-token".to_string(),
                    person_id: Some(2),
                    is_system_admin: true,
                },
                SessionTokenConfig {
                    token: "fresh-token".to_string(),
                    person_id: None,
                    is_system_admin: false,
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_known_token_resolves() {
        let auth = StaticSessionAuth::from_config(&auth_config());
        let actor = auth.resolve("ada-token").await.unwrap().unwrap();
        assert_eq!(actor.person_id, Some(1));
        assert!(!actor.is_system_admin);
    }

    #[tokio::test]
    async fn test_admin_token_resolves_with_flag() {
        let auth = StaticSessionAuth::from_config(&auth_config());
        let actor = auth.resolve("admin-token").await.unwrap().unwrap();
        assert!(actor.is_system_admin);
    }

    #[tokio::test]
    async fn test_unknown_token_resolves_to_none() {
        let auth = StaticSessionAuth::from_config(&auth_config());
        assert!(auth.resolve("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_token_without_active_profile() {
        let auth = StaticSessionAuth::from_config(&auth_config());
        let actor = auth.resolve("fresh-token").await.unwrap().unwrap();
        assert_eq!(actor.person_id, None);
    }

    #[test]
    fn test_len_and_is_empty() {
        let auth = StaticSessionAuth::from_config(&auth_config());
        assert_eq!(auth.len(), 3);
        assert!(!auth.is_empty());
        assert!(StaticSessionAuth::default().is_empty());
    }
}
