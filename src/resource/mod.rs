//! The generic hypermedia resource engine.
//!
//! [`Resource`] wraps one HAL representation and provides property
//! access with dirty tracking, minimal-diff saves, deletion and link
//! following. [`ListResource`] specializes it over an embedded
//! collection with pagination and item creation. Concrete resource
//! types are thin layers over this engine: they declare a
//! [`FieldDescriptor`] table and reuse the generic accessors.
//!
//! Resources are ephemeral value wrappers. Every fetch produces a new
//! instance; nothing is cached by identity.

mod fields;
mod links;
mod list;
mod representation;
mod stream;

pub use fields::{Access, Codec, FieldDescriptor, FieldValue};
pub use links::{expand_template, Link, LinkIndex, Params};
pub use list::ListResource;
pub use representation::{Representation, EMBEDDED_KEY, LINKS_KEY};
pub use stream::ItemStream;

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use url::Url;

use crate::client::{CoreInner, Method, RelationBinding};
use crate::auth::Environment;
use crate::{Error, Result};

/// Write verb used by [`Resource::save`].
///
/// The body is the dirty-properties diff in both modes; the mode only
/// selects the verb it travels with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveMode {
    /// Full overwrite: PUT.
    #[default]
    Replace,
    /// Partial update: PATCH.
    Merge,
}

/// Per-call options for [`Resource::save_with`].
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// Write verb override; the configured default when `None`.
    pub mode: Option<SaveMode>,
    /// Select the `self` link with this profile instead of the first
    /// `self` link, for representations exposing alternate save
    /// endpoints.
    pub profile: Option<String>,
}

/// A mutable wrapper around one hypermedia item.
///
/// A resource owns exactly one [`Representation`], replaced wholesale
/// when a save or follow resolves new data — never merged
/// field-by-field. Property names changed since load form the dirty
/// set; [`save`](Self::save) sends exactly those properties.
///
/// The wrapper is not internally synchronized. Each fetch yields a
/// distinct instance, so sharing one across concurrent flows is only
/// possible deliberately; dirty-set updates in that case are
/// last-writer-wins.
pub struct Resource {
    ctx: Arc<CoreInner>,
    representation: Representation,
    saved: Representation,
    dirty: BTreeSet<String>,
    continuation: Option<Url>,
    binding: Option<RelationBinding>,
}

impl Resource {
    pub(crate) fn new(
        ctx: Arc<CoreInner>,
        representation: Representation,
        continuation: Option<Url>,
        binding: Option<RelationBinding>,
    ) -> Self {
        Self {
            ctx,
            saved: representation.clone(),
            representation,
            dirty: BTreeSet::new(),
            continuation,
            binding,
        }
    }

    pub(crate) fn context(&self) -> &Arc<CoreInner> {
        &self.ctx
    }

    pub(crate) fn with_binding(mut self, binding: Option<RelationBinding>) -> Self {
        self.binding = binding;
        self
    }

    /// The current representation.
    pub fn representation(&self) -> &Representation {
        &self.representation
    }

    /// The environment this resource was fetched from.
    pub fn environment(&self) -> Environment {
        self.ctx.environment
    }

    /// The relation binding attached when this resource was reached
    /// through a registered relation.
    pub fn binding(&self) -> Option<&RelationBinding> {
        self.binding.as_ref()
    }

    /// Continuation handle: the resolved URL this representation was
    /// fetched from, used as the base for relative follow-up requests.
    pub fn continuation(&self) -> Option<&Url> {
        self.continuation.as_ref()
    }

    // ---- properties & dirty tracking -------------------------------

    /// Current (possibly unsaved) value of a property.
    ///
    /// This is the read choke point all declared accessors go through.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.representation.property(name)
    }

    /// Set one property and mark it dirty.
    ///
    /// This is the write choke point all declared accessors go
    /// through, guaranteeing uniform dirty tracking.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] for reserved keys.
    pub fn set_property(&mut self, name: &str, value: Value) -> Result<()> {
        self.representation.set_property(name, value)?;
        self.dirty.insert(name.to_string());
        Ok(())
    }

    /// Merge a patch object into the representation.
    ///
    /// Every top-level key of the patch enters the dirty set. Unknown
    /// keys are accepted (forward-compatible).
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] if the patch is not a JSON object or
    /// touches a reserved key; nothing is applied in that case.
    pub fn set(&mut self, patch: Value) -> Result<()> {
        let Value::Object(patch) = patch else {
            return Err(Error::Validation(
                "a patch must be a JSON object".to_string(),
            ));
        };
        if let Some(reserved) = patch.keys().find(|name| Representation::is_reserved(name)) {
            return Err(Error::Validation(format!(
                "'{}' is a reserved key and cannot be set as a property",
                reserved
            )));
        }
        for (name, value) in patch {
            self.representation.set_property(&name, value)?;
            self.dirty.insert(name);
        }
        Ok(())
    }

    /// Whether any property changed since load or last save.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Names of the properties changed since load or last save.
    pub fn dirty_properties(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    /// Discard uncommitted changes, restoring the last-saved
    /// representation and clearing the dirty set.
    pub fn reset(&mut self) {
        self.representation = self.saved.clone();
        self.dirty.clear();
    }

    // ---- declared fields -------------------------------------------

    /// Read a declared field through its codec.
    ///
    /// Returns `Ok(None)` when the property is absent.
    pub fn field(&self, descriptor: &FieldDescriptor) -> Result<Option<FieldValue>> {
        match self.property(descriptor.name) {
            Some(raw) => fields::decode(descriptor.codec, raw).map(Some),
            None => Ok(None),
        }
    }

    /// Write a declared field through its codec.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] for read-only fields and codec
    /// mismatches.
    pub fn set_field(&mut self, descriptor: &FieldDescriptor, value: FieldValue) -> Result<()> {
        if descriptor.access == Access::ReadOnly {
            return Err(Error::Validation(format!(
                "field '{}' is read-only",
                descriptor.name
            )));
        }
        let raw = fields::encode(descriptor.codec, value)?;
        self.set_property(descriptor.name, raw)
    }

    // ---- links -----------------------------------------------------

    /// Recompute the link index from the current representation.
    pub fn link_index(&self) -> LinkIndex {
        LinkIndex::from_representation(&self.representation)
    }

    /// Whether the representation has a link for `relation`.
    pub fn has_link(&self, relation: &str) -> bool {
        self.link_index().has(relation)
    }

    /// First declared link for `relation`.
    pub fn link(&self, relation: &str) -> Option<Link> {
        self.link_index().first(relation).cloned()
    }

    /// Embedded representations under `relation`, in order.
    pub fn embedded(&self, relation: &str) -> Vec<Representation> {
        self.representation.embedded(relation)
    }

    // ---- marshaling ------------------------------------------------

    /// Decode the representation into a caller-defined type.
    pub fn as_type<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.representation.to_value())?)
    }

    // ---- I/O operations --------------------------------------------

    /// Persist dirty properties with the configured default options.
    ///
    /// See [`save_with`](Self::save_with).
    pub async fn save(&mut self) -> Result<()> {
        self.save_with(SaveOptions::default()).await
    }

    /// Persist dirty properties.
    ///
    /// A clean resource saves without any network call. Otherwise the
    /// body contains the dirty properties only — even under
    /// [`SaveMode::Replace`] — so concurrently changed server fields
    /// are not clobbered. The write goes to the `self` link, or to the
    /// `self` link matching `options.profile`. On success the
    /// representation is replaced wholesale with the server's response
    /// and the dirty set is cleared; on failure the changes are
    /// retained and the error is returned without retry.
    ///
    /// # Errors
    ///
    /// [`Error::Resource`] without a matching `self` link,
    /// [`Error::Request`] on HTTP failure.
    pub async fn save_with(&mut self, options: SaveOptions) -> Result<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }

        let index = self.link_index();
        let link = match options.profile.as_deref() {
            Some(profile) => index.with_profile("self", profile).ok_or_else(|| {
                Error::Resource(format!("no self link with profile '{}'", profile))
            })?,
            None => index
                .first("self")
                .ok_or_else(|| Error::Resource("cannot save without a self link".to_string()))?,
        };
        let url = link.resolve(self.continuation.as_ref(), None)?;

        let mut body = Map::new();
        for name in &self.dirty {
            let value = self
                .representation
                .property(name)
                .cloned()
                .unwrap_or(Value::Null);
            body.insert(name.clone(), value);
        }

        let mode = options.mode.unwrap_or(self.ctx.config.default_save_mode);
        let method = match mode {
            SaveMode::Replace => Method::Put,
            SaveMode::Merge => Method::Patch,
        };

        let response = self
            .ctx
            .execute(method, url.clone(), Some(Value::Object(body)))
            .await?;

        if response.body.is_null() {
            // 204-style response: what we sent is now the saved state.
            self.saved = self.representation.clone();
        } else {
            let representation = Representation::from_value(response.body)?;
            self.saved = representation.clone();
            self.representation = representation;
        }
        self.dirty.clear();
        self.continuation = Some(url);
        Ok(())
    }

    /// Delete the resource on the server.
    ///
    /// Consumes the resource: a deleted instance is terminal, and
    /// taking `self` by value makes any further use a compile error
    /// rather than undefined behavior at runtime.
    ///
    /// # Errors
    ///
    /// [`Error::Resource`] without a `self` link, [`Error::Request`]
    /// on HTTP failure.
    pub async fn delete(self) -> Result<()> {
        let index = self.link_index();
        let link = index
            .first("self")
            .ok_or_else(|| Error::Resource("cannot delete without a self link".to_string()))?;
        let url = link.resolve(self.continuation.as_ref(), None)?;
        self.ctx.execute(Method::Delete, url, None).await?;
        Ok(())
    }

    /// Follow a relation to a new resource.
    ///
    /// Templated links are expanded from `params`; the response is
    /// wrapped as a fresh resource carrying a new continuation handle.
    /// Relations registered on the core re-attach their binding, so a
    /// followed list relation can be turned into a
    /// [`ListResource`] directly.
    ///
    /// # Errors
    ///
    /// [`Error::Navigation`] if the relation is absent,
    /// [`Error::Template`] on unresolved template variables.
    pub async fn follow(&self, relation: &str, params: Option<&Params>) -> Result<Resource> {
        let index = self.link_index();
        let link = index
            .first(relation)
            .ok_or_else(|| Error::Navigation(relation.to_string()))?;
        let url = link.resolve(self.continuation.as_ref(), params)?;

        let response = self.ctx.execute(Method::Get, url.clone(), None).await?;
        let representation = Representation::from_value(response.body)?;
        let binding = self.ctx.binding(relation);
        Ok(Resource::new(self.ctx.clone(), representation, Some(url), binding))
    }

    /// Follow a chain of relations in one logical call.
    ///
    /// Each step consumes the prior step's result; intermediate
    /// continuation handles are discarded once they have produced the
    /// next request. `params` are available to every templated step.
    pub async fn follow_path(&self, relations: &[&str], params: Option<&Params>) -> Result<Resource> {
        let (first, rest) = relations.split_first().ok_or_else(|| {
            Error::Validation("follow_path requires at least one relation".to_string())
        })?;
        let mut current = self.follow(first, params).await?;
        for relation in rest {
            current = current.follow(relation, params).await?;
        }
        Ok(current)
    }

    /// View this resource as a list over its binding's item relation.
    ///
    /// # Errors
    ///
    /// [`Error::Resource`] if no binding is attached; use
    /// [`ListResource::with_item_relation`] for unregistered
    /// relations.
    pub fn into_list(self) -> Result<ListResource> {
        ListResource::from_resource(self)
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("environment", &self.ctx.environment)
            .field("dirty", &self.dirty)
            .field(
                "continuation",
                &self.continuation.as_ref().map(Url::as_str),
            )
            .field("representation", &self.representation)
            .finish()
    }
}
