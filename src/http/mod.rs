//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, session id)
//!     → proxy.rs / auth.rs / health.rs (route handlers)
//!     → response.rs (error envelope)
//!     → Send to client
//! ```

pub mod auth;
pub mod health;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use request::{X_CACHE, X_REQUEST_ID, X_SESSION_ID};
pub use server::{AppState, HttpServer};
