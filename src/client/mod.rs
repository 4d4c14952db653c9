//! Core entry point, configuration and the transport seam.
//!
//! [`Core`] is the per-API-root entry point: it owns the
//! [`TokenStore`](crate::auth::TokenStore), the [`Transport`] and the
//! relation registry, fetches the traversal root and hands out
//! [`Resource`](crate::Resource) values.
//!
//! # Example
//!
//! ```no_run
//! use hal_client::{ClientConfig, Core, Environment, RelationBinding};
//!
//! # async fn example() -> hal_client::Result<()> {
//! let core = Core::new(
//!     Environment::Live,
//!     "https://api.example.com/",
//!     ClientConfig::default(),
//! )?;
//! core.register(
//!     RelationBinding::new("ec:accounts", "ec:account")
//!         .with_identity_field("accountID"),
//! );
//!
//! let accounts = core.list("ec:accounts", None).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod core;
mod transport;

pub use config::ClientConfig;
pub use core::{Core, Filter, RelationBinding};
pub use transport::{HttpTransport, Method, Transport, TransportRequest, TransportResponse};

pub(crate) use core::CoreInner;
