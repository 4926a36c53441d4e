//! Built-in interceptors.
//!
//! Interceptors are the right place for cross-cutting concerns such as
//! tracing, deadlines or authentication metadata. The chain
//! itself does none of these. Nothing here is installed unless you add it:
//!
//! ```rust
//! use std::time::Duration;
//! use weft::Chain;
//! use weft::interceptors::{Deadline, RequireMetadata, Trace};
//!
//! let chain: Chain<String, String> = Chain::builder()
//!     .with(Trace::new())
//!     .with(RequireMetadata::new("authorization"))
//!     .with(Deadline::new(Duration::from_secs(2)))
//!     .build();
//! ```
//!
//! - [`Trace`]: per-call span with method, status code, latency
//! - [`Deadline`]: bounds the rest of the chain and cancels it on expiry
//! - [`RequireMetadata`]: rejects calls missing a metadata entry

mod deadline;
mod metadata;
mod trace;

pub use deadline::Deadline;
pub use metadata::RequireMetadata;
pub use trace::Trace;
