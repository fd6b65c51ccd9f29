//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! /auth/login    → store.rs (issue state) → oauth.rs (authorize URL) → redirect
//! /auth/callback → store.rs (consume state) → oauth.rs (code exchange)
//!                → store.rs (session id → CredentialState)
//! proxy request  → store.rs (lookup by X-Session-Id)
//!                → credential.rs (validity / refresh via CredentialProvider)
//! ```
//!
//! # Security Constraints
//! - Client secret is never logged
//! - OAuth state values are single use and expire after ten minutes

pub mod credential;
pub mod oauth;
pub mod store;

pub use credential::{CredentialError, CredentialProvider, CredentialState};
pub use oauth::RedditOAuth;
pub use store::CredentialStore;
