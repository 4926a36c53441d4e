use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::context::Context;
use crate::handler::{BoxFuture, CallResult};
use crate::info::CallInfo;
use crate::interceptor::{Interceptor, Next};
use crate::status::Status;

/// Bounds the rest of the chain by a timeout.
///
/// The stages below see a child context whose deadline is the earlier of the
/// caller's deadline and `now + timeout`. If that deadline passes first, the
/// child context is cancelled and the call fails with `DEADLINE_EXCEEDED`.
/// A call whose context is already cancelled fails with `CANCELLED` without
/// running the rest of the chain. A timeout too large to represent as an
/// instant adds no deadline of its own.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    timeout: Duration,
}

impl Deadline {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration { self.timeout }
}

impl<Req, Res> Interceptor<Req, Res> for Deadline
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn intercept(
        &self,
        ctx: Context,
        req: Req,
        info: Arc<CallInfo>,
        next: Next<Req, Res>,
    ) -> BoxFuture<CallResult<Res>> {
        let timeout = self.timeout;

        Box::pin(async move {
            if ctx.is_cancelled() {
                return Err(Status::cancelled("call cancelled before it started"));
            }

            let limit = Instant::now().checked_add(timeout);
            let deadline = match (ctx.deadline(), limit) {
                (Some(current), Some(limit)) => current.min(limit),
                (Some(current), None) => current,
                (None, Some(limit)) => limit,
                (None, None) => return next.run(ctx.child(), req).await,
            };
            let ctx = ctx.child().with_deadline(deadline);
            let token = ctx.cancellation_token().clone();

            match tokio::time::timeout_at(deadline, next.run(ctx, req)).await {
                Ok(result) => result,
                Err(_) => {
                    token.cancel();
                    debug!(method = %info.full_method(), ?timeout, "deadline exceeded, downstream cancelled");
                    Err(Status::deadline_exceeded("deadline exceeded"))
                }
            }
        })
    }
}
