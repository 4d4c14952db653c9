//! The per-API-root entry point.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use secrecy::ExposeSecret;
use serde_json::Value;
use url::Url;

use super::config::ClientConfig;
use super::transport::{HttpTransport, Method, Transport, TransportRequest, TransportResponse};
use crate::auth::{ClientId, Environment, TokenStore};
use crate::resource::{ListResource, Params, Representation, Resource};
use crate::{Error, Result};

/// A list-retrieval filter: field name → value.
///
/// String values are used verbatim; other JSON values are rendered
/// through their canonical JSON form.
pub type Filter = BTreeMap<String, Value>;

/// Typing information for a registered relation.
///
/// A binding declares how resources reached through `relation` behave
/// as lists: which embedded relation holds the items, where creations
/// are posted, and which single field makes a filter ambiguous.
#[derive(Debug, Clone)]
pub struct RelationBinding {
    /// The relation name this binding applies to.
    pub relation: String,
    /// Embedded relation holding the list items.
    pub item_relation: String,
    /// Relation creations are posted to; `self` when absent.
    pub creation_relation: Option<String>,
    /// Field that, alone in a filter, collapses the server response to
    /// a single resource. Filtering by it alone is rejected.
    pub identity_field: Option<String>,
    /// Call the ambiguous-filter error should redirect to.
    pub single_get_hint: Option<String>,
}

impl RelationBinding {
    /// Bind a relation to its embedded item relation.
    pub fn new(relation: impl Into<String>, item_relation: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            item_relation: item_relation.into(),
            creation_relation: None,
            identity_field: None,
            single_get_hint: None,
        }
    }

    /// Post creations to `relation` instead of the list's `self` link.
    pub fn with_creation_relation(mut self, relation: impl Into<String>) -> Self {
        self.creation_relation = Some(relation.into());
        self
    }

    /// Declare the identity field guarded against single-field filters.
    pub fn with_identity_field(mut self, field: impl Into<String>) -> Self {
        self.identity_field = Some(field.into());
        self
    }

    /// Name the single-get alternative used in the ambiguous-filter
    /// error message.
    pub fn with_single_get_hint(mut self, hint: impl Into<String>) -> Self {
        self.single_get_hint = Some(hint.into());
        self
    }
}

/// Entry point into one HAL API root.
///
/// A `Core` owns the token store, the transport and the relation
/// registry, and builds the initial traversal root. It is constructed
/// explicitly — there is no implicit process-wide default instance.
///
/// # Example
///
/// ```no_run
/// use hal_client::{ClientConfig, Core, Environment};
///
/// # async fn example() -> hal_client::Result<()> {
/// let core = Core::new(
///     Environment::Stage,
///     "https://api.example.com/",
///     ClientConfig::default(),
/// )?;
/// core.set_token("eyJhbGciOi...").await;
///
/// let root = core.root().await?;
/// let accounts = root.follow("ec:accounts", None).await?;
/// # Ok(())
/// # }
/// ```
pub struct Core {
    inner: Arc<CoreInner>,
}

pub(crate) struct CoreInner {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) tokens: TokenStore,
    pub(crate) client_id: ClientId,
    pub(crate) environment: Environment,
    pub(crate) api_root: Url,
    pub(crate) config: ClientConfig,
    registry: RwLock<HashMap<String, RelationBinding>>,
}

impl Core {
    /// Create a core with the reqwest-backed transport.
    pub fn new(
        environment: Environment,
        api_root: impl AsRef<str>,
        config: ClientConfig,
    ) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        Self::with_transport(environment, api_root, config, transport)
    }

    /// Create a core with an injected transport.
    ///
    /// This is the seam tests and alternative HTTP stacks plug into.
    pub fn with_transport(
        environment: Environment,
        api_root: impl AsRef<str>,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let api_root = Url::parse(api_root.as_ref())?;
        Ok(Self {
            inner: Arc::new(CoreInner {
                transport,
                tokens: TokenStore::new(),
                client_id: ClientId::rest(),
                environment,
                api_root,
                config,
                registry: RwLock::new(HashMap::new()),
            }),
        })
    }

    /// The environment this core talks to.
    pub fn environment(&self) -> Environment {
        self.inner.environment
    }

    /// The client id tokens are stored under.
    pub fn client_id(&self) -> &ClientId {
        &self.inner.client_id
    }

    /// The API root URL.
    pub fn api_root(&self) -> &Url {
        &self.inner.api_root
    }

    /// A handle to the token store.
    pub fn token_store(&self) -> TokenStore {
        self.inner.tokens.clone()
    }

    /// Store the bearer token for this core's `(environment, client id)`.
    ///
    /// The token is attached to every subsequent outbound request.
    /// Storing it performs no network I/O.
    pub async fn set_token(&self, token: impl Into<String>) {
        self.inner
            .tokens
            .set(self.inner.environment, &self.inner.client_id, token)
            .await;
    }

    /// Whether a token is currently stored for this core.
    pub async fn has_token(&self) -> bool {
        self.inner
            .tokens
            .has(self.inner.environment, &self.inner.client_id)
            .await
    }

    /// Clear the stored token. Returns `true` if one was present.
    pub async fn clear_token(&self) -> bool {
        self.inner
            .tokens
            .del(self.inner.environment, &self.inner.client_id)
            .await
    }

    /// Register a relation binding, replacing any previous binding for
    /// the same relation.
    pub fn register(&self, binding: RelationBinding) {
        let mut registry = self
            .inner
            .registry
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        registry.insert(binding.relation.clone(), binding);
    }

    /// Fetch the API root and wrap it as the traversal root.
    pub async fn root(&self) -> Result<Resource> {
        let url = self.inner.api_root.clone();
        let response = self
            .inner
            .execute(Method::Get, url.clone(), None)
            .await?;
        let representation = Representation::from_value(response.body)?;
        Ok(Resource::new(
            self.inner.clone(),
            representation,
            Some(url),
            None,
        ))
    }

    /// Fetch the root and follow `relation` in one call.
    pub async fn follow(&self, relation: &str, params: Option<&Params>) -> Result<Resource> {
        self.root().await?.follow(relation, params).await
    }

    /// Retrieve a registered list relation, applying `filter` as
    /// template variables or query parameters.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the relation is not registered, and
    /// [`Error::Validation`] if the filter contains only the binding's
    /// identity field — the wrapped API collapses such filters to a
    /// single-resource response, so the error names the single-get
    /// alternative instead.
    pub async fn list(&self, relation: &str, filter: Option<&Filter>) -> Result<ListResource> {
        let binding = self.inner.binding(relation).ok_or_else(|| {
            Error::Config(format!("relation '{}' has no registered binding", relation))
        })?;

        if let (Some(filter), Some(identity)) = (filter, binding.identity_field.as_deref()) {
            if filter.len() == 1 && filter.contains_key(identity) {
                let hint = binding
                    .single_get_hint
                    .clone()
                    .unwrap_or_else(|| format!("get('{}')", identity));
                return Err(Error::Validation(format!(
                    "filtering '{}' by {} alone yields a single resource, not a list; use {} instead",
                    relation, identity, hint
                )));
            }
        }

        let params = filter.map(filter_params);
        let resource = self.follow(relation, params.as_ref()).await?;
        ListResource::from_resource(resource)
    }
}

impl Clone for Core {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl std::fmt::Debug for Core {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Core")
            .field("environment", &self.inner.environment)
            .field("api_root", &self.inner.api_root.as_str())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl CoreInner {
    /// Look up the registered binding for a relation.
    pub(crate) fn binding(&self, relation: &str) -> Option<RelationBinding> {
        let registry = self
            .registry
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        registry.get(relation).cloned()
    }

    /// The single request choke point: header assembly, bearer token
    /// attachment, status mapping. Every I/O-bearing operation of the
    /// engine funnels through here and issues exactly one request.
    pub(crate) async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> Result<TransportResponse> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/hal+json, application/json"),
        );
        if body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        if let Some(token) = self.tokens.get(self.environment, &self.client_id).await {
            let value = format!("Bearer {}", token.expose_secret());
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&value)
                    .map_err(|_| Error::Config("stored token is not a valid header value".into()))?,
            );
        }

        tracing::debug!(method = %method, url = %url, "outbound request");

        let response = self
            .transport
            .request(TransportRequest {
                method,
                url,
                headers,
                body,
            })
            .await?;

        tracing::trace!(status = response.status, "response received");

        if response.is_success() {
            Ok(response)
        } else {
            Err(Error::from_status(response.status, response.body))
        }
    }
}

/// Render a filter into template parameters.
fn filter_params(filter: &Filter) -> Params {
    filter
        .iter()
        .map(|(name, value)| {
            let rendered = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            (name.clone(), rendered)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_relation_binding_builder() {
        let binding = RelationBinding::new("ec:accounts", "ec:account")
            .with_creation_relation("ec:accounts/create")
            .with_identity_field("accountID")
            .with_single_get_hint("account(accountID)");
        assert_eq!(binding.relation, "ec:accounts");
        assert_eq!(binding.item_relation, "ec:account");
        assert_eq!(binding.creation_relation.as_deref(), Some("ec:accounts/create"));
        assert_eq!(binding.identity_field.as_deref(), Some("accountID"));
    }

    #[test]
    fn test_filter_params_rendering() {
        let mut filter = Filter::new();
        filter.insert("name".into(), json!("ops"));
        filter.insert("active".into(), json!(true));
        filter.insert("page".into(), json!(2));

        let params = filter_params(&filter);
        assert_eq!(params.get("name").unwrap(), "ops");
        assert_eq!(params.get("active").unwrap(), "true");
        assert_eq!(params.get("page").unwrap(), "2");
    }

    #[test]
    fn test_core_rejects_invalid_root_url() {
        let result = Core::new(
            Environment::Live,
            "not a url",
            ClientConfig::default(),
        );
        assert!(matches!(result, Err(Error::UrlParse(_))));
    }
}
