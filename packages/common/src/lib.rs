//! Common infrastructure shared by the cabinet crates
//!
//! - Error handling with context propagation
//! - Logging bootstrap
//! - Request-scoped authentication context

pub mod context;
pub mod error;
pub mod logging;

pub use context::{Claims, RequestContext};
pub use error::*;
pub use logging::LoggingTransformer;
