//! Construction-time error type.

/// The error type returned by weft's fallible setup operations.
///
/// Failures *during* a call are expressed as [`Status`](crate::Status)
/// values, not as `Error`s. This type only surfaces problems found while
/// wiring a service up, before any request is served.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A full method name was not of the form `/service/method`.
    #[error("invalid method name `{0}`: expected `/service/method`")]
    InvalidMethodName(String),
}
