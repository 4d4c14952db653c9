//! # hal-client-rs
//!
//! A generic client SDK for hypermedia-driven (HAL) web APIs.
//!
//! The crate implements the resource/traversal engine concrete SDKs
//! are generated on top of: link navigation, lazy resolution,
//! dirty-state tracking for partial updates, pagination, templated-link
//! expansion and request/response marshaling.
//!
//! ## Features
//!
//! - **Traversal**: follow relations and relation chains from one API
//!   root, with RFC 6570 template expansion
//! - **Dirty tracking**: in-memory mutation with minimal-diff saves
//! - **Lists**: typed item materialization, first/next/prev pagination
//!   and item creation over embedded collections
//! - **Tokens**: per-`(environment, client id)` bearer token storage,
//!   attached automatically to outbound requests
//! - **Transport seam**: all I/O behind the [`Transport`] trait,
//!   reqwest-backed by default
//! - **Async-first**: one outbound request per operation, no internal
//!   fan-out, no implicit retries
//!
//! ## Quick Start
//!
//! ```no_run
//! use hal_client::{ClientConfig, Core, Environment, RelationBinding};
//!
//! #[tokio::main]
//! async fn main() -> hal_client::Result<()> {
//!     let core = Core::new(
//!         Environment::Live,
//!         "https://api.example.com/",
//!         ClientConfig::default(),
//!     )?;
//!     core.set_token("my-bearer-token").await;
//!     core.register(
//!         RelationBinding::new("ec:accounts", "ec:account")
//!             .with_identity_field("accountID")
//!             .with_single_get_hint("account(accountID)"),
//!     );
//!
//!     // Traverse into a list
//!     let accounts = core.list("ec:accounts", None).await?;
//!     println!("{} accounts on this page", accounts.len());
//!
//!     // Mutate and save an item: only changed properties travel
//!     let mut account = accounts.first_item()?;
//!     account.set_property("name", "new name".into())?;
//!     assert!(account.is_dirty());
//!     account.save().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Pagination
//!
//! ```no_run
//! use futures_util::StreamExt;
//! # async fn example(core: hal_client::Core) -> hal_client::Result<()> {
//! let list = core.list("ec:entries", None).await?;
//! let mut stream = list.stream();
//! while let Some(entry) = stream.next().await {
//!     let entry = entry?;
//!     println!("{:?}", entry.property("title"));
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod client;
pub mod error;
pub mod permissions;
pub mod resource;

// Re-export primary types at crate root for convenience
pub use auth::{ClientId, Environment, TokenStore};
pub use client::{
    ClientConfig, Core, Filter, HttpTransport, Method, RelationBinding, Transport,
    TransportRequest, TransportResponse,
};
pub use error::{Error, Result};
pub use permissions::Permission;
pub use resource::{
    Access, Codec, FieldDescriptor, FieldValue, ItemStream, Link, LinkIndex, ListResource, Params,
    Representation, Resource, SaveMode, SaveOptions,
};

/// Prelude module for convenient imports.
///
/// ```rust
/// use hal_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::auth::{ClientId, Environment, TokenStore};
    pub use crate::client::{ClientConfig, Core, Filter, RelationBinding, Transport};
    pub use crate::error::{Error, Result};
    pub use crate::permissions::{matches, Permission};
    pub use crate::resource::{
        Access, Codec, FieldDescriptor, FieldValue, Link, LinkIndex, ListResource, Params,
        Representation, Resource, SaveMode, SaveOptions,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_display() {
        assert_eq!(Environment::Live.to_string(), "live");
        assert_eq!(Environment::Stage.to_string(), "stage");
    }

    #[test]
    fn test_client_id_allow_list() {
        assert!(ClientId::new("rest").is_ok());
        assert!(ClientId::new("browser").is_err());
    }

    #[test]
    fn test_core_construction() {
        let core = Core::new(
            Environment::Develop,
            "https://api.example.com/",
            ClientConfig::default(),
        )
        .unwrap();
        assert_eq!(core.environment(), Environment::Develop);
        assert_eq!(core.api_root().as_str(), "https://api.example.com/");
    }
}
