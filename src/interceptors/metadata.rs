use std::sync::Arc;

use crate::context::Context;
use crate::handler::{BoxFuture, CallResult};
use crate::info::CallInfo;
use crate::interceptor::{Interceptor, Next};
use crate::status::Status;

/// Rejects calls whose context lacks a metadata entry.
///
/// Missing entries, or entries that differ from the expected value when one
/// is set, fail with `UNAUTHENTICATED` and the rest of the chain never runs.
///
/// ```rust
/// use weft::interceptors::RequireMetadata;
///
/// let auth = RequireMetadata::new("authorization").equal_to("Bearer s3cret");
/// ```
#[derive(Clone, Debug)]
pub struct RequireMetadata {
    key: Arc<str>,
    expected: Option<Arc<str>>,
}

impl RequireMetadata {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into().into(), expected: None }
    }

    /// Also require the entry's value to equal `value` exactly.
    pub fn equal_to(mut self, value: impl Into<String>) -> Self {
        self.expected = Some(value.into().into());
        self
    }
}

impl<Req, Res> Interceptor<Req, Res> for RequireMetadata
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn intercept(
        &self,
        ctx: Context,
        req: Req,
        _info: Arc<CallInfo>,
        next: Next<Req, Res>,
    ) -> BoxFuture<CallResult<Res>> {
        let verdict = match (ctx.metadata(&self.key), self.expected.as_deref()) {
            (None, _) => Err(format!("missing `{}` metadata", self.key)),
            (Some(found), Some(expected)) if found != expected => {
                Err(format!("invalid `{}` metadata", self.key))
            }
            (Some(_), _) => Ok(()),
        };

        match verdict {
            Ok(()) => next.run(ctx, req),
            Err(message) => Box::pin(async move { Err(Status::unauthenticated(message)) }),
        }
    }
}
