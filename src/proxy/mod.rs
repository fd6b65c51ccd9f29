//! Reddit listing proxy.
//!
//! # Data Flow
//! ```text
//! ProxyRequest + Option<CredentialState>
//!     → handler.rs (mode selection, single refresh attempt)
//!     → plan.rs (RequestPlan: mode, url, headers, cacheable)
//!     → CacheStore lookup (public mode)
//!     → Transport fetch on miss
//!     → error.rs (normalize failures into {error, details})
//!     → CacheStore write (public mode, non-empty success)
//! ```

pub mod error;
pub mod handler;
pub mod plan;
pub mod request;

pub use error::ProxyError;
pub use handler::{CacheStatus, HandlerSettings, Proxied, ProxyHandler};
pub use plan::{cache_key, Mode, RequestPlan};
pub use request::ProxyRequest;
