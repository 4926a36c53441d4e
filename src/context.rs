//! Request-scoped context.
//!
//! Every stage receives the [`Context`] by value. A stage that wants to hand
//! something down (a tighter deadline, an authenticated principal) modifies
//! its own copy before calling `next`. Changes never flow back up to the
//! stages above it.
//!
//! Cancellation is cooperative. The chain itself never cancels anything; a
//! stage checks [`Context::is_cancelled`] or awaits [`Context::cancelled`]
//! and decides what to do.

use std::time::Duration;

use http::Extensions;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Cancellation, deadline, metadata, and typed extensions for one call.
#[derive(Clone, Debug, Default)]
pub struct Context {
    cancel: CancellationToken,
    deadline: Option<Instant>,
    metadata: Vec<(String, String)>,
    extensions: Extensions,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Deadline ──────────────────────────────────────────────────────────────

    /// Sets the deadline, keeping the existing one if it is earlier.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Sets the deadline to `now + timeout`, keeping the existing one if it is
    /// earlier. A timeout too large to represent leaves the deadline as is.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    pub fn deadline(&self) -> Option<Instant> { self.deadline }

    /// Time left until the deadline. `Some(ZERO)` once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(Instant::now()))
    }

    // ── Cancellation ──────────────────────────────────────────────────────────

    /// A copy of this context whose cancellation token is a child of this
    /// one: cancelling the child leaves the caller's token untouched, while
    /// cancelling the caller still reaches the child.
    pub fn child(&self) -> Self {
        Self { cancel: self.cancel.child_token(), ..self.clone() }
    }

    pub fn cancellation_token(&self) -> &CancellationToken { &self.cancel }

    pub fn cancel(&self) { self.cancel.cancel() }

    pub fn is_cancelled(&self) -> bool { self.cancel.is_cancelled() }

    /// Resolves once this context is cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }

    // ── Metadata ──────────────────────────────────────────────────────────────

    /// Appends a metadata entry. Returns `self` for chaining.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_metadata(key, value);
        self
    }

    pub fn insert_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.push((key.into(), value.into()));
    }

    /// Case-insensitive metadata lookup. Returns the first matching entry.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn metadata_entries(&self) -> &[(String, String)] { &self.metadata }

    // ── Extensions ────────────────────────────────────────────────────────────

    /// Stores a typed value, replacing and returning any previous value of the
    /// same type.
    pub fn insert<T: Clone + Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.extensions.insert(value)
    }

    pub fn with_extension<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.extensions.insert(value);
        self
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }
}
