//! Tokenized permission grammar.
//!
//! Permissions are plain `domain:action[,action…]` strings; matching
//! is a pure function over parsed values, with `*` as a wildcard for
//! the domain or an action.
//!
//! ```
//! use hal_client::permissions::{matches, Permission};
//!
//! # fn example() -> hal_client::Result<()> {
//! let granted = vec![
//!     Permission::parse("entries:read,write")?,
//!     Permission::parse("assets:*")?,
//! ];
//! let requested = Permission::parse("entries:write")?;
//! assert!(matches(&granted, &requested));
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A parsed permission: one domain and one or more actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    domain: String,
    actions: Vec<String>,
}

impl Permission {
    /// Parse a `domain:action[,action…]` string.
    ///
    /// Domain and actions consist of alphanumerics, `-`, `_` and `.`,
    /// or a single `*` wildcard.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] on any malformed input.
    pub fn parse(input: &str) -> Result<Self> {
        let (domain, actions) = input.split_once(':').ok_or_else(|| {
            Error::Validation(format!(
                "malformed permission '{}': expected domain:action[,action...]",
                input
            ))
        })?;

        if !is_token(domain) {
            return Err(Error::Validation(format!(
                "malformed permission domain '{}'",
                domain
            )));
        }

        let actions: Vec<String> = actions.split(',').map(str::to_string).collect();
        for action in &actions {
            if !is_token(action) {
                return Err(Error::Validation(format!(
                    "malformed permission action '{}'",
                    action
                )));
            }
        }

        Ok(Self {
            domain: domain.to_string(),
            actions,
        })
    }

    /// The permission's domain.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The permission's actions, in declaration order.
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    fn covers_domain(&self, domain: &str) -> bool {
        self.domain == "*" || self.domain == domain
    }

    fn covers_action(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == "*" || a == action)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.domain, self.actions.join(","))
    }
}

impl FromStr for Permission {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Whether the granted set covers the requested permission.
///
/// Every requested action must be covered by some grant whose domain
/// matches; different actions may be covered by different grants.
pub fn matches(granted: &[Permission], requested: &Permission) -> bool {
    requested.actions.iter().all(|action| {
        granted
            .iter()
            .any(|grant| grant.covers_domain(&requested.domain) && grant.covers_action(action))
    })
}

fn is_token(text: &str) -> bool {
    if text == "*" {
        return true;
    }
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Permission {
        Permission::parse(s).unwrap()
    }

    #[test]
    fn test_parse_and_display_roundtrip() {
        let perm = p("entries:read,write");
        assert_eq!(perm.domain(), "entries");
        assert_eq!(perm.actions(), &["read".to_string(), "write".to_string()]);
        assert_eq!(perm.to_string(), "entries:read,write");
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!(Permission::parse("no-colon").is_err());
        assert!(Permission::parse(":read").is_err());
        assert!(Permission::parse("entries:").is_err());
        assert!(Permission::parse("entries:read,").is_err());
        assert!(Permission::parse("en tries:read").is_err());
    }

    #[test]
    fn test_exact_match() {
        let granted = vec![p("entries:read,write")];
        assert!(matches(&granted, &p("entries:read")));
        assert!(matches(&granted, &p("entries:read,write")));
        assert!(!matches(&granted, &p("entries:delete")));
        assert!(!matches(&granted, &p("assets:read")));
    }

    #[test]
    fn test_wildcards() {
        assert!(matches(&[p("*:read")], &p("entries:read")));
        assert!(!matches(&[p("*:read")], &p("entries:write")));
        assert!(matches(&[p("entries:*")], &p("entries:delete")));
        assert!(matches(&[p("*:*")], &p("anything:at-all")));
    }

    #[test]
    fn test_actions_covered_across_grants() {
        let granted = vec![p("entries:read"), p("entries:write")];
        assert!(matches(&granted, &p("entries:read,write")));
        assert!(!matches(&granted, &p("entries:read,delete")));
    }
}
