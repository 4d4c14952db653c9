//! Process-wide bearer token storage.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;

use crate::{Error, Result};

/// Client identifiers accepted by [`ClientId::new`].
pub const ALLOWED_CLIENT_IDS: &[&str] = &["rest"];

/// Deployment environment an API root belongs to.
///
/// The environment partitions the [`TokenStore`]: a token stored for
/// `Stage` is never attached to a `Live` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Environment {
    /// Production deployment.
    #[default]
    Live,
    /// Staging deployment.
    Stage,
    /// Nightly deployment.
    Nightly,
    /// Development deployment.
    Develop,
}

impl Environment {
    /// The environment's canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Live => "live",
            Environment::Stage => "stage",
            Environment::Nightly => "nightly",
            Environment::Develop => "develop",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated client identifier.
///
/// Only allow-listed identifiers can be constructed, so every value of
/// this type is known-good before it reaches the token store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    /// Create a client id, checking it against the fixed allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for any identifier not on the list.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if !ALLOWED_CLIENT_IDS.contains(&id.as_str()) {
            return Err(Error::Config(format!(
                "unknown client id '{}'; allowed: {}",
                id,
                ALLOWED_CLIENT_IDS.join(", ")
            )));
        }
        Ok(Self(id))
    }

    /// The default `rest` client id.
    pub fn rest() -> Self {
        Self("rest".to_string())
    }

    /// The client id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// In-memory bearer token store keyed by `(environment, client id)`.
///
/// Storing or clearing a token never performs network I/O; the stored
/// token is attached as a bearer credential on outbound requests of the
/// owning [`Core`](crate::Core). Tokens are never expired client-side.
///
/// # Thread Safety
///
/// The store is `Clone` and shareable across tasks. Reads and writes
/// are atomic at single-key granularity only; concurrent writers for
/// the same key race last-write-wins.
#[derive(Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<HashMap<(Environment, ClientId), SecretString>>>,
}

impl TokenStore {
    /// Create an empty token store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a token for `(environment, client_id)`, replacing any
    /// previous one.
    pub async fn set(
        &self,
        environment: Environment,
        client_id: &ClientId,
        token: impl Into<String>,
    ) {
        let mut inner = self.inner.write().await;
        inner.insert(
            (environment, client_id.clone()),
            SecretString::from(token.into()),
        );
    }

    /// Current token for `(environment, client_id)`, if any.
    pub async fn get(
        &self,
        environment: Environment,
        client_id: &ClientId,
    ) -> Option<SecretString> {
        let inner = self.inner.read().await;
        inner.get(&(environment, client_id.clone())).cloned()
    }

    /// Whether a token is stored for `(environment, client_id)`.
    pub async fn has(&self, environment: Environment, client_id: &ClientId) -> bool {
        let inner = self.inner.read().await;
        inner.contains_key(&(environment, client_id.clone()))
    }

    /// Remove the token for `(environment, client_id)`.
    ///
    /// Returns `true` if a token was present.
    pub async fn del(&self, environment: Environment, client_id: &ClientId) -> bool {
        let mut inner = self.inner.write().await;
        inner.remove(&(environment, client_id.clone())).is_some()
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_allow_list() {
        assert!(ClientId::new("rest").is_ok());
        let err = ClientId::new("mobile").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_token_roundtrip() {
        let store = TokenStore::new();
        let client_id = ClientId::rest();

        assert!(!store.has(Environment::Stage, &client_id).await);

        store.set(Environment::Stage, &client_id, "token-a").await;
        assert!(store.has(Environment::Stage, &client_id).await);
        // Keys are partitioned by environment
        assert!(!store.has(Environment::Live, &client_id).await);

        let token = store.get(Environment::Stage, &client_id).await.unwrap();
        assert_eq!(token.expose_secret(), "token-a");

        assert!(store.del(Environment::Stage, &client_id).await);
        assert!(!store.del(Environment::Stage, &client_id).await);
    }

    #[tokio::test]
    async fn test_set_replaces_previous_token() {
        let store = TokenStore::new();
        let client_id = ClientId::rest();

        store.set(Environment::Live, &client_id, "old").await;
        store.set(Environment::Live, &client_id, "new").await;

        let token = store.get(Environment::Live, &client_id).await.unwrap();
        assert_eq!(token.expose_secret(), "new");
    }

    #[test]
    fn test_debug_redacts_tokens() {
        // Ensure we don't leak tokens in debug output
        let store = TokenStore::new();
        let debug_str = format!("{:?}", store);
        assert!(debug_str.contains("REDACTED"));
    }
}
