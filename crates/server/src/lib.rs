//! Lead-Desk Server
//!
//! JSON HTTP endpoints for lead intake and the sales assistant.

pub mod http;
pub mod metrics;
pub mod state;

pub use http::create_router;
pub use metrics::{init_metrics, record_error, record_request};
pub use state::AppState;
