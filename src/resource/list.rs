//! Resource specialization over an embedded collection.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{ItemStream, Resource};
use crate::client::Method;
use crate::{Error, Result};

const FIRST: &str = "first";
const NEXT: &str = "next";
const PREV: &str = "prev";

/// A [`Resource`] whose embedded section under one declared item
/// relation holds the list's children.
///
/// Items are materialized from the embedded array on every access and
/// never cached across representation replacement; `items()` after a
/// page follow reflects the new page.
pub struct ListResource {
    inner: Resource,
    item_relation: String,
}

impl ListResource {
    /// Build a list view from a resource carrying a relation binding.
    ///
    /// # Errors
    ///
    /// [`Error::Resource`] if the resource has no binding.
    pub fn from_resource(resource: Resource) -> Result<Self> {
        let item_relation = resource
            .binding()
            .map(|binding| binding.item_relation.clone())
            .ok_or_else(|| {
                Error::Resource(
                    "resource carries no list binding; use with_item_relation".to_string(),
                )
            })?;
        Ok(Self {
            inner: resource,
            item_relation,
        })
    }

    /// Build a list view over an explicit item relation.
    pub fn with_item_relation(resource: Resource, item_relation: impl Into<String>) -> Self {
        Self {
            inner: resource,
            item_relation: item_relation.into(),
        }
    }

    /// The underlying resource.
    pub fn resource(&self) -> &Resource {
        &self.inner
    }

    /// Mutable access to the underlying resource.
    pub fn resource_mut(&mut self) -> &mut Resource {
        &mut self.inner
    }

    /// Unwrap into the underlying resource.
    pub fn into_resource(self) -> Resource {
        self.inner
    }

    /// The declared item relation.
    pub fn item_relation(&self) -> &str {
        &self.item_relation
    }

    /// Number of embedded items on this page.
    pub fn len(&self) -> usize {
        self.inner.embedded(&self.item_relation).len()
    }

    /// Whether this page has no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All items of this page as typed resources, in embedded order.
    ///
    /// Recomputed on each call. Children share the list's continuation
    /// handle, so their own `self` links resolve relative to it.
    pub fn items(&self) -> Vec<Resource> {
        let ctx = self.inner.context().clone();
        let binding = ctx.binding(&self.item_relation);
        self.inner
            .embedded(&self.item_relation)
            .into_iter()
            .map(|representation| {
                Resource::new(
                    ctx.clone(),
                    representation,
                    self.inner.continuation().cloned(),
                    binding.clone(),
                )
            })
            .collect()
    }

    /// The `n`-th item.
    ///
    /// # Errors
    ///
    /// [`Error::Index`] when out of bounds.
    pub fn item(&self, index: usize) -> Result<Resource> {
        let mut items = self.items();
        if index >= items.len() {
            return Err(Error::Index {
                index,
                len: items.len(),
            });
        }
        Ok(items.remove(index))
    }

    /// The first item.
    ///
    /// # Errors
    ///
    /// [`Error::Resource`] when the list is empty.
    pub fn first_item(&self) -> Result<Resource> {
        if self.is_empty() {
            return Err(Error::Resource("the list is empty".to_string()));
        }
        self.item(0)
    }

    /// All items decoded into a caller-defined type.
    pub fn items_as<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.inner
            .embedded(&self.item_relation)
            .into_iter()
            .map(|representation| Ok(serde_json::from_value(representation.into_value())?))
            .collect()
    }

    /// The `n`-th item decoded into a caller-defined type.
    pub fn item_as<T: DeserializeOwned>(&self, index: usize) -> Result<T> {
        let item = self.item(index)?;
        item.as_type()
    }

    /// Whether a `first` page link exists.
    pub fn has_first_link(&self) -> bool {
        self.inner.has_link(FIRST)
    }

    /// Whether a `next` page link exists.
    pub fn has_next_link(&self) -> bool {
        self.inner.has_link(NEXT)
    }

    /// Whether a `prev` page link exists.
    pub fn has_prev_link(&self) -> bool {
        self.inner.has_link(PREV)
    }

    /// Follow the `first` page link.
    pub async fn follow_first_link(&self) -> Result<ListResource> {
        self.follow_page(FIRST).await
    }

    /// Follow the `next` page link.
    pub async fn follow_next_link(&self) -> Result<ListResource> {
        self.follow_page(NEXT).await
    }

    /// Follow the `prev` page link.
    pub async fn follow_prev_link(&self) -> Result<ListResource> {
        self.follow_page(PREV).await
    }

    async fn follow_page(&self, relation: &str) -> Result<ListResource> {
        if !self.inner.has_link(relation) {
            return Err(Error::Navigation(relation.to_string()));
        }
        let followed = self
            .inner
            .follow(relation, None)
            .await?
            // Page links carry no registered relation; re-type the
            // page to this list's binding.
            .with_binding(self.inner.binding().cloned());
        Ok(ListResource {
            inner: followed,
            item_relation: self.item_relation.clone(),
        })
    }

    /// Create a new item in this list.
    ///
    /// The full payload is posted — creation is not a diff. The target
    /// is the binding's creation relation, falling back to the list's
    /// `self` link.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] if the payload is not a JSON object,
    /// [`Error::Navigation`] if the creation relation is absent.
    pub async fn create(&self, payload: Value) -> Result<Resource> {
        if !payload.is_object() {
            return Err(Error::Validation(
                "a creation payload must be a JSON object".to_string(),
            ));
        }

        let relation = self
            .inner
            .binding()
            .and_then(|binding| binding.creation_relation.clone())
            .unwrap_or_else(|| "self".to_string());
        let index = self.inner.link_index();
        let link = index
            .first(&relation)
            .ok_or_else(|| Error::Navigation(relation.clone()))?;
        let url = link.resolve(self.inner.continuation(), None)?;

        let ctx = self.inner.context().clone();
        let response = ctx.execute(Method::Post, url.clone(), Some(payload)).await?;
        let representation = super::Representation::from_value(response.body)?;
        let binding = ctx.binding(&self.item_relation);
        Ok(Resource::new(ctx, representation, Some(url), binding))
    }

    /// Turn this page into a lazy stream over all items of all
    /// following pages.
    pub fn stream(self) -> ItemStream {
        ItemStream::new(self)
    }
}

impl std::fmt::Debug for ListResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListResource")
            .field("item_relation", &self.item_relation)
            .field("len", &self.len())
            .field("resource", &self.inner)
            .finish()
    }
}
