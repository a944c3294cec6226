//! # Parlor
//!
//! A server for storyteller-hosted social-deduction parlor games. A host
//! creates a session and reads its 5-letter code to the room; players
//! join from their phones; the host deals roles and marks players
//! alive or dead; everyone follows along live over server-sent events.
//!
//! This crate is the thin outer shell: the axum router, the SSE plumbing,
//! and the process composition root. All game semantics live in
//! `parlor-session`; all wire shapes live in `parlor-protocol`.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use parlor::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), parlor::ServerError> {
//!     let server = Server::builder().bind("0.0.0.0:3000").build().await?;
//!     server.run().await
//! }
//! ```

mod error;
mod routes;
mod server;

pub use error::ServerError;
pub use routes::router;
pub use server::{AppState, Server, ServerBuilder};
