//! Token storage and client identity.
//!
//! The engine does not implement an OAuth or JWT issuance protocol.
//! Callers obtain a bearer token through whatever flow their API uses
//! and hand it to the [`TokenStore`]; from then on it is attached as an
//! `Authorization: Bearer` header on every outbound request of the
//! owning [`Core`](crate::Core).
//!
//! ```
//! use hal_client::auth::{ClientId, Environment, TokenStore};
//!
//! # async fn example() -> hal_client::Result<()> {
//! let store = TokenStore::new();
//! let client_id = ClientId::new("rest")?;
//! store.set(Environment::Stage, &client_id, "eyJhbGciOi...").await;
//! assert!(store.has(Environment::Stage, &client_id).await);
//! # Ok(())
//! # }
//! ```

mod token_store;

pub use token_store::{ClientId, Environment, TokenStore, ALLOWED_CLIENT_IDS};
