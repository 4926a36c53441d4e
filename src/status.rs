//! RPC status codes and the [`Status`] error every stage returns.
//!
//! The code set is the canonical gRPC one. A [`Status`] returned by any
//! interceptor or terminal handler travels back to the caller untouched.
//! The chain never translates or retries it.
//!
//! ```rust
//! use weft::{Code, Status};
//!
//! let err = Status::not_found("no such user");
//! assert_eq!(err.code(), Code::NotFound);
//! assert_eq!(err.to_string(), "NOT_FOUND: no such user");
//! ```

use std::fmt;
use std::str::FromStr;

// ── Code ──────────────────────────────────────────────────────────────────────

/// A canonical RPC status code.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Code {
    Ok,                 // 0
    Cancelled,          // 1
    Unknown,            // 2
    InvalidArgument,    // 3
    DeadlineExceeded,   // 4
    NotFound,           // 5
    AlreadyExists,      // 6
    PermissionDenied,   // 7
    ResourceExhausted,  // 8
    FailedPrecondition, // 9
    Aborted,            // 10
    OutOfRange,         // 11
    Unimplemented,      // 12
    Internal,           // 13
    Unavailable,        // 14
    DataLoss,           // 15
    Unauthenticated,    // 16
}

impl Code {
    /// Returns the upper-snake wire name (e.g. `"NOT_FOUND"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok                 => "OK",
            Self::Cancelled          => "CANCELLED",
            Self::Unknown            => "UNKNOWN",
            Self::InvalidArgument    => "INVALID_ARGUMENT",
            Self::DeadlineExceeded   => "DEADLINE_EXCEEDED",
            Self::NotFound           => "NOT_FOUND",
            Self::AlreadyExists      => "ALREADY_EXISTS",
            Self::PermissionDenied   => "PERMISSION_DENIED",
            Self::ResourceExhausted  => "RESOURCE_EXHAUSTED",
            Self::FailedPrecondition => "FAILED_PRECONDITION",
            Self::Aborted            => "ABORTED",
            Self::OutOfRange         => "OUT_OF_RANGE",
            Self::Unimplemented      => "UNIMPLEMENTED",
            Self::Internal           => "INTERNAL",
            Self::Unavailable        => "UNAVAILABLE",
            Self::DataLoss           => "DATA_LOSS",
            Self::Unauthenticated    => "UNAUTHENTICATED",
        }
    }
}

/// Parses an upper-snake code name (e.g. `"NOT_FOUND"`). Case-sensitive.
impl FromStr for Code {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OK"                  => Ok(Self::Ok),
            "CANCELLED"           => Ok(Self::Cancelled),
            "UNKNOWN"             => Ok(Self::Unknown),
            "INVALID_ARGUMENT"    => Ok(Self::InvalidArgument),
            "DEADLINE_EXCEEDED"   => Ok(Self::DeadlineExceeded),
            "NOT_FOUND"           => Ok(Self::NotFound),
            "ALREADY_EXISTS"      => Ok(Self::AlreadyExists),
            "PERMISSION_DENIED"   => Ok(Self::PermissionDenied),
            "RESOURCE_EXHAUSTED"  => Ok(Self::ResourceExhausted),
            "FAILED_PRECONDITION" => Ok(Self::FailedPrecondition),
            "ABORTED"             => Ok(Self::Aborted),
            "OUT_OF_RANGE"        => Ok(Self::OutOfRange),
            "UNIMPLEMENTED"       => Ok(Self::Unimplemented),
            "INTERNAL"            => Ok(Self::Internal),
            "UNAVAILABLE"         => Ok(Self::Unavailable),
            "DATA_LOSS"           => Ok(Self::DataLoss),
            "UNAUTHENTICATED"     => Ok(Self::Unauthenticated),
            _                     => Err(()),
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Code> for i32 {
    fn from(c: Code) -> i32 {
        match c {
            Code::Ok                 => 0,
            Code::Cancelled          => 1,
            Code::Unknown            => 2,
            Code::InvalidArgument    => 3,
            Code::DeadlineExceeded   => 4,
            Code::NotFound           => 5,
            Code::AlreadyExists      => 6,
            Code::PermissionDenied   => 7,
            Code::ResourceExhausted  => 8,
            Code::FailedPrecondition => 9,
            Code::Aborted            => 10,
            Code::OutOfRange         => 11,
            Code::Unimplemented      => 12,
            Code::Internal           => 13,
            Code::Unavailable        => 14,
            Code::DataLoss           => 15,
            Code::Unauthenticated    => 16,
        }
    }
}

// ── Status ────────────────────────────────────────────────────────────────────

/// The error half of every stage's result: a [`Code`] plus a human-readable
/// message.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct Status {
    code: Code,
    message: String,
}

impl Status {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn code(&self) -> Code { self.code }
    pub fn message(&self) -> &str { &self.message }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(Code::Cancelled, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Code::InvalidArgument, message)
    }

    pub fn deadline_exceeded(message: impl Into<String>) -> Self {
        Self::new(Code::DeadlineExceeded, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Code::NotFound, message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(Code::PermissionDenied, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Code::Internal, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(Code::Unavailable, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(Code::Unauthenticated, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Code; 17] = [
        Code::Ok,
        Code::Cancelled,
        Code::Unknown,
        Code::InvalidArgument,
        Code::DeadlineExceeded,
        Code::NotFound,
        Code::AlreadyExists,
        Code::PermissionDenied,
        Code::ResourceExhausted,
        Code::FailedPrecondition,
        Code::Aborted,
        Code::OutOfRange,
        Code::Unimplemented,
        Code::Internal,
        Code::Unavailable,
        Code::DataLoss,
        Code::Unauthenticated,
    ];

    #[test]
    fn codes_are_numbered_in_declaration_order() {
        for (i, code) in ALL.into_iter().enumerate() {
            assert_eq!(i32::from(code), i as i32);
        }
    }

    #[test]
    fn code_names_parse_back() {
        for code in ALL {
            assert_eq!(code.as_str().parse::<Code>(), Ok(code));
        }
        assert!("not_found".parse::<Code>().is_err());
    }

    #[test]
    fn status_displays_code_and_message() {
        let status = Status::unauthenticated("missing token");
        assert_eq!(status.code(), Code::Unauthenticated);
        assert_eq!(status.message(), "missing token");
        assert_eq!(status.to_string(), "UNAUTHENTICATED: missing token");
    }
}
