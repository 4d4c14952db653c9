//! Declarative field descriptors.
//!
//! Resource types declare their named accessors as a table of
//! [`FieldDescriptor`] values instead of wiring getter/setter pairs per
//! instance. One generic accessor pair on
//! [`Resource`](crate::Resource) — [`field`](crate::Resource::field)
//! and [`set_field`](crate::Resource::set_field) — consumes the table,
//! so dirty tracking stays centralized in the property choke points.
//!
//! ```
//! use hal_client::resource::{Access, Codec, FieldDescriptor};
//!
//! const TITLE: FieldDescriptor =
//!     FieldDescriptor::new("title", Access::ReadWrite, Codec::Identity);
//! const CREATED: FieldDescriptor =
//!     FieldDescriptor::new("created", Access::ReadOnly, Codec::Date);
//! const PERMISSIONS: FieldDescriptor =
//!     FieldDescriptor::new("permissions", Access::ReadWrite, Codec::StringArray);
//! ```

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{Error, Result};

/// Whether a declared field accepts writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The field can only be read; writes fail with
    /// [`Error::Validation`].
    ReadOnly,
    /// The field can be read and written.
    ReadWrite,
}

/// Wire ⇄ typed translation applied by a field descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    /// The raw JSON value, unchanged.
    Identity,
    /// An RFC 3339 date-time string ⇄ [`DateTime<Utc>`].
    Date,
    /// A JSON array of strings ⇄ `Vec<String>`.
    StringArray,
}

/// One entry of a resource type's field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Property name in the representation.
    pub name: &'static str,
    /// Read/write access of the field.
    pub access: Access,
    /// Codec translating between wire and typed form.
    pub codec: Codec,
}

impl FieldDescriptor {
    /// Declare a field.
    pub const fn new(name: &'static str, access: Access, codec: Codec) -> Self {
        Self {
            name,
            access,
            codec,
        }
    }
}

/// A typed field value produced or consumed by a [`Codec`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Raw JSON value ([`Codec::Identity`]).
    Value(Value),
    /// Parsed date-time ([`Codec::Date`]).
    Date(DateTime<Utc>),
    /// String array ([`Codec::StringArray`]).
    StringArray(Vec<String>),
}

/// Decode a raw property value through a codec.
pub(crate) fn decode(codec: Codec, raw: &Value) -> Result<FieldValue> {
    match codec {
        Codec::Identity => Ok(FieldValue::Value(raw.clone())),
        Codec::Date => {
            let text = raw.as_str().ok_or_else(|| {
                Error::Validation(format!("expected an RFC 3339 string, got {}", raw))
            })?;
            let parsed = DateTime::parse_from_rfc3339(text).map_err(|e| {
                Error::Validation(format!("invalid RFC 3339 date '{}': {}", text, e))
            })?;
            Ok(FieldValue::Date(parsed.with_timezone(&Utc)))
        }
        Codec::StringArray => {
            let entries = raw.as_array().ok_or_else(|| {
                Error::Validation(format!("expected an array of strings, got {}", raw))
            })?;
            let mut strings = Vec::with_capacity(entries.len());
            for entry in entries {
                let text = entry.as_str().ok_or_else(|| {
                    Error::Validation(format!("expected a string array entry, got {}", entry))
                })?;
                strings.push(text.to_string());
            }
            Ok(FieldValue::StringArray(strings))
        }
    }
}

/// Encode a typed field value through a codec into its wire form.
pub(crate) fn encode(codec: Codec, value: FieldValue) -> Result<Value> {
    match (codec, value) {
        (Codec::Identity, FieldValue::Value(raw)) => Ok(raw),
        (Codec::Date, FieldValue::Date(date)) => Ok(Value::String(date.to_rfc3339())),
        (Codec::StringArray, FieldValue::StringArray(strings)) => {
            Ok(Value::Array(strings.into_iter().map(Value::String).collect()))
        }
        (codec, value) => Err(Error::Validation(format!(
            "field value {:?} does not match codec {:?}",
            value, codec
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_codec() {
        let raw = json!({ "nested": true });
        assert_eq!(
            decode(Codec::Identity, &raw).unwrap(),
            FieldValue::Value(raw.clone())
        );
        assert_eq!(
            encode(Codec::Identity, FieldValue::Value(raw.clone())).unwrap(),
            raw
        );
    }

    #[test]
    fn test_date_codec_roundtrip() {
        let raw = json!("2024-03-01T12:30:00+02:00");
        let FieldValue::Date(date) = decode(Codec::Date, &raw).unwrap() else {
            panic!("expected a date");
        };
        // Normalized to UTC
        assert_eq!(date.to_rfc3339(), "2024-03-01T10:30:00+00:00");

        let encoded = encode(Codec::Date, FieldValue::Date(date)).unwrap();
        assert_eq!(encoded, json!("2024-03-01T10:30:00+00:00"));
    }

    #[test]
    fn test_date_codec_rejects_garbage() {
        assert!(decode(Codec::Date, &json!("not a date")).is_err());
        assert!(decode(Codec::Date, &json!(42)).is_err());
    }

    #[test]
    fn test_string_array_codec() {
        let raw = json!(["a", "b"]);
        assert_eq!(
            decode(Codec::StringArray, &raw).unwrap(),
            FieldValue::StringArray(vec!["a".into(), "b".into()])
        );
        assert!(decode(Codec::StringArray, &json!(["a", 1])).is_err());

        let encoded = encode(
            Codec::StringArray,
            FieldValue::StringArray(vec!["x".into()]),
        )
        .unwrap();
        assert_eq!(encoded, json!(["x"]));
    }

    #[test]
    fn test_codec_mismatch_is_rejected() {
        let err = encode(Codec::Date, FieldValue::Value(json!("2024-01-01"))).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
