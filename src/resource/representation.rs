//! The JSON body of a fetched or constructed resource.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Reserved key holding the link section of a representation.
pub const LINKS_KEY: &str = "_links";

/// Reserved key holding the embedded-resource section.
pub const EMBEDDED_KEY: &str = "_embedded";

/// A HAL representation: a mapping of property name to JSON value,
/// plus the reserved `_links` and `_embedded` sections.
///
/// The reserved sections are never exposed as user-settable properties;
/// [`property`](Self::property) and [`set_property`](Self::set_property)
/// skip them, and writes to them fail with [`Error::Validation`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Representation {
    map: Map<String, Value>,
}

impl Representation {
    /// Create an empty representation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap raw JSON received from the network or a constructor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the value is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self { map }),
            other => Err(Error::Validation(format!(
                "a representation must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// The representation as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.map.clone())
    }

    /// Consume the representation into its JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.map)
    }

    /// The underlying property map, reserved sections included.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.map
    }

    /// Whether `name` is one of the reserved HAL section keys.
    pub fn is_reserved(name: &str) -> bool {
        name == LINKS_KEY || name == EMBEDDED_KEY
    }

    /// Current value of a property. Reserved keys read as absent.
    pub fn property(&self, name: &str) -> Option<&Value> {
        if Self::is_reserved(name) {
            return None;
        }
        self.map.get(name)
    }

    /// Set a property, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for reserved keys.
    pub fn set_property(&mut self, name: &str, value: Value) -> Result<()> {
        if Self::is_reserved(name) {
            return Err(Error::Validation(format!(
                "'{}' is a reserved key and cannot be set as a property",
                name
            )));
        }
        self.map.insert(name.to_string(), value);
        Ok(())
    }

    /// Remove a property, returning its previous value.
    pub fn remove_property(&mut self, name: &str) -> Option<Value> {
        if Self::is_reserved(name) {
            return None;
        }
        self.map.remove(name)
    }

    /// Names of all non-reserved properties.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.map
            .keys()
            .map(String::as_str)
            .filter(|name| !Self::is_reserved(name))
    }

    /// Raw link section, if present.
    pub fn links_section(&self) -> Option<&Value> {
        self.map.get(LINKS_KEY)
    }

    /// Raw embedded section, if present.
    pub fn embedded_section(&self) -> Option<&Value> {
        self.map.get(EMBEDDED_KEY)
    }

    /// Embedded representations under `relation`, in declaration order.
    ///
    /// HAL allows a single object or an array under a relation; both
    /// shapes normalize to a vector here. Entries that are not objects
    /// are skipped.
    pub fn embedded(&self, relation: &str) -> Vec<Representation> {
        let Some(section) = self.embedded_section().and_then(Value::as_object) else {
            return Vec::new();
        };
        match section.get(relation) {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(|entry| entry.as_object().cloned())
                .map(|map| Representation { map })
                .collect(),
            Some(Value::Object(map)) => vec![Representation { map: map.clone() }],
            _ => Vec::new(),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Representation {
        Representation::from_value(json!({
            "name": "editors",
            "count": 2,
            "_links": { "self": { "href": "https://api.example.com/groups/g1" } },
            "_embedded": {
                "item": [
                    { "id": "a" },
                    { "id": "b" }
                ],
                "single": { "id": "c" }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Representation::from_value(json!([1, 2])).is_err());
        assert!(Representation::from_value(json!("text")).is_err());
        assert!(Representation::from_value(Value::Null).is_err());
    }

    #[test]
    fn test_reserved_keys_are_not_properties() {
        let mut repr = sample();
        assert!(repr.property(LINKS_KEY).is_none());
        assert!(repr.property(EMBEDDED_KEY).is_none());
        assert!(repr.set_property(LINKS_KEY, json!({})).is_err());

        let names: Vec<_> = repr.property_names().collect();
        assert_eq!(names, vec!["count", "name"]);
    }

    #[test]
    fn test_property_roundtrip() {
        let mut repr = sample();
        assert_eq!(repr.property("name"), Some(&json!("editors")));

        repr.set_property("name", json!("admins")).unwrap();
        assert_eq!(repr.property("name"), Some(&json!("admins")));

        assert_eq!(repr.remove_property("count"), Some(json!(2)));
        assert!(repr.property("count").is_none());
    }

    #[test]
    fn test_embedded_normalizes_shapes() {
        let repr = sample();

        let items = repr.embedded("item");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].property("id"), Some(&json!("a")));
        assert_eq!(items[1].property("id"), Some(&json!("b")));

        let single = repr.embedded("single");
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].property("id"), Some(&json!("c")));

        assert!(repr.embedded("missing").is_empty());
    }
}
