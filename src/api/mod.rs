//! HTTP boundary.
//!
//! Exposes the analyzer and catalog maintenance as JSON endpoints under
//! `/api/`. Request shape is validated here; the analyzer never sees
//! malformed input.
//!
//! The router is composable: `api_router()` returns a `Router` that can
//! be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::{api_router, build_router};
pub use server::{start_api_server, ApiServer, ApiSession};
pub use types::{ApiContext, RequestLimits};
