//! Link parsing, relation lookup and URI template expansion.

use std::collections::{BTreeMap, HashMap};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::resource::Representation;
use crate::{Error, Result};

/// Parameter map supplied for template expansion and query filters.
pub type Params = BTreeMap<String, String>;

/// RFC 3986 unreserved characters pass through, everything else is
/// percent-encoded.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A single hypermedia link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Target URI, possibly an RFC 6570 template.
    pub href: String,
    /// Whether `href` contains template expressions.
    #[serde(default)]
    pub templated: bool,
    /// Profile URI disambiguating alternate links under one relation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

impl Link {
    /// Create an untemplated link.
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            templated: false,
            profile: None,
        }
    }

    /// Resolve this link into a concrete request URL.
    ///
    /// Templated hrefs are expanded from `params`; untemplated hrefs
    /// receive `params` as appended query pairs. Relative hrefs are
    /// joined against `base` (the continuation handle of the
    /// representation the link came from).
    ///
    /// # Errors
    ///
    /// [`Error::Template`] if a template variable is unresolved,
    /// [`Error::UrlParse`] if the final string is not a valid URL.
    pub fn resolve(&self, base: Option<&Url>, params: Option<&Params>) -> Result<Url> {
        let href = if self.templated {
            let empty = Params::new();
            expand_template(&self.href, params.unwrap_or(&empty))?
        } else {
            self.href.clone()
        };

        let mut url = match base {
            Some(base) => base.join(&href)?,
            None => Url::parse(&href)?,
        };

        if !self.templated {
            if let Some(params) = params.filter(|p| !p.is_empty()) {
                let mut pairs = url.query_pairs_mut();
                for (name, value) in params {
                    pairs.append_pair(name, value);
                }
            }
        }

        Ok(url)
    }
}

/// A navigable relation → links view derived from one representation.
///
/// The index is recomputed from the current representation on demand
/// and never persisted independently. Multiple links per relation keep
/// their declaration order.
#[derive(Debug, Clone, Default)]
pub struct LinkIndex {
    relations: HashMap<String, Vec<Link>>,
}

impl LinkIndex {
    /// Parse the link section of a representation.
    ///
    /// Both the single-object and the array form are accepted; entries
    /// that do not carry an `href` string are skipped.
    pub fn from_representation(representation: &Representation) -> Self {
        let mut relations = HashMap::new();

        let Some(section) = representation.links_section().and_then(Value::as_object) else {
            return Self { relations };
        };

        for (relation, value) in section {
            let links: Vec<Link> = match value {
                Value::Array(entries) => entries
                    .iter()
                    .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                    .collect(),
                Value::Object(_) => serde_json::from_value(value.clone())
                    .map(|link| vec![link])
                    .unwrap_or_default(),
                _ => Vec::new(),
            };
            if !links.is_empty() {
                relations.insert(relation.clone(), links);
            }
        }

        Self { relations }
    }

    /// Whether any link exists for `relation`.
    pub fn has(&self, relation: &str) -> bool {
        self.relations.contains_key(relation)
    }

    /// First declared link for `relation`.
    pub fn first(&self, relation: &str) -> Option<&Link> {
        self.relations.get(relation).and_then(|links| links.first())
    }

    /// All links for `relation`, in declaration order.
    pub fn all(&self, relation: &str) -> &[Link] {
        self.relations
            .get(relation)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The link under `relation` whose profile equals `profile`.
    pub fn with_profile(&self, relation: &str, profile: &str) -> Option<&Link> {
        self.all(relation)
            .iter()
            .find(|link| link.profile.as_deref() == Some(profile))
    }

    /// All known relation names.
    pub fn relations(&self) -> impl Iterator<Item = &str> {
        self.relations.keys().map(String::as_str)
    }
}

/// Expand an RFC 6570 template (subset) from a parameter map.
///
/// Supported expressions: simple `{var,var2}`, query `{?a,b}` and
/// query continuation `{&a,b}`. Values are percent-encoded. Every
/// variable listed in the template must be present in `params`; an
/// unresolved variable is [`Error::Template`] — a placeholder is never
/// silently retained in the URI.
pub fn expand_template(template: &str, params: &Params) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| Error::Template(after.to_string()))?;
        let expression = &after[..close];
        out.push_str(&expand_expression(expression, params)?);
        rest = &after[close + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

fn expand_expression(expression: &str, params: &Params) -> Result<String> {
    let (operator, variables) = match expression.chars().next() {
        Some('?') => (Some('?'), &expression[1..]),
        Some('&') => (Some('&'), &expression[1..]),
        _ => (None, expression),
    };

    let mut parts = Vec::new();
    for variable in variables.split(',') {
        // A trailing '*' (explode modifier) is accepted and ignored,
        // values are scalars here.
        let name = variable.trim_end_matches('*');
        if name.is_empty() {
            return Err(Error::Template(expression.to_string()));
        }
        let value = params
            .get(name)
            .ok_or_else(|| Error::Template(name.to_string()))?;
        let encoded = utf8_percent_encode(value, COMPONENT).to_string();
        match operator {
            Some(_) => parts.push(format!("{}={}", name, encoded)),
            None => parts.push(encoded),
        }
    }

    Ok(match operator {
        Some('?') => format!("?{}", parts.join("&")),
        Some('&') => format!("&{}", parts.join("&")),
        _ => parts.join(","),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_simple_expansion() {
        let expanded = expand_template(
            "https://api.example.com/accounts/{accountID}",
            &params(&[("accountID", "abc-123")]),
        )
        .unwrap();
        assert_eq!(expanded, "https://api.example.com/accounts/abc-123");
    }

    #[test]
    fn test_query_expansion_encodes_values() {
        let expanded = expand_template(
            "https://api.example.com/entries{?title,page}",
            &params(&[("title", "a b&c"), ("page", "2")]),
        )
        .unwrap();
        assert_eq!(
            expanded,
            "https://api.example.com/entries?title=a%20b%26c&page=2"
        );
    }

    #[test]
    fn test_continuation_and_explode_modifier() {
        let expanded = expand_template(
            "https://api.example.com/entries?size=5{&sort*}",
            &params(&[("sort", "name")]),
        )
        .unwrap();
        assert_eq!(expanded, "https://api.example.com/entries?size=5&sort=name");
    }

    #[test]
    fn test_unresolved_variable_is_an_error() {
        let err = expand_template(
            "https://api.example.com/accounts/{accountID}",
            &Params::new(),
        )
        .unwrap_err();
        match err {
            Error::Template(name) => assert_eq!(name, "accountID"),
            other => panic!("expected Template error, got {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_expression_is_an_error() {
        assert!(expand_template("https://api.example.com/{oops", &Params::new()).is_err());
    }

    #[test]
    fn test_link_index_normalizes_shapes_and_order() {
        let repr = Representation::from_value(json!({
            "_links": {
                "self": { "href": "https://api.example.com/thing" },
                "alternate": [
                    { "href": "https://api.example.com/thing.v1", "profile": "v1" },
                    { "href": "https://api.example.com/thing.v2", "profile": "v2" }
                ]
            }
        }))
        .unwrap();
        let index = LinkIndex::from_representation(&repr);

        assert!(index.has("self"));
        assert!(!index.has("missing"));
        assert_eq!(index.all("alternate").len(), 2);
        assert_eq!(index.all("alternate")[0].profile.as_deref(), Some("v1"));
        assert_eq!(
            index.with_profile("alternate", "v2").unwrap().href,
            "https://api.example.com/thing.v2"
        );
    }

    #[test]
    fn test_resolve_relative_href_against_continuation() {
        let base = Url::parse("https://api.example.com/groups/g1").unwrap();
        let link = Link::new("../g2");
        let url = link.resolve(Some(&base), None).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/g2");
    }

    #[test]
    fn test_resolve_appends_params_to_untemplated_links() {
        let link = Link::new("https://api.example.com/accounts");
        let url = link
            .resolve(None, Some(&params(&[("name", "ops"), ("page", "2")])))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/accounts?name=ops&page=2"
        );
    }
}
