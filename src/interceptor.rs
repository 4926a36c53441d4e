//! The interceptor contract.
//!
//! An interceptor sees every call before and after the stages below it:
//!
//! ```text
//! (ctx, req, info, next) -> Result<Res, Status>
//! ```
//!
//! Call `next.run(ctx, req).await` to continue down the chain. Skip it to
//! short-circuit: nothing below runs, and whatever you return is the result.
//! Code placed after the `await` post-processes the response.
//!
//! Closures and `async` blocks implement [`Interceptor`] through a blanket
//! impl. Structs implement it directly:
//!
//! ```rust
//! use std::sync::Arc;
//! use weft::{BoxFuture, CallInfo, CallResult, Context, Interceptor, Next, Status};
//!
//! struct DenyAll;
//!
//! impl<Req: Send + 'static, Res: Send + 'static> Interceptor<Req, Res> for DenyAll {
//!     fn intercept(
//!         &self,
//!         _ctx: Context,
//!         _req: Req,
//!         info: Arc<CallInfo>,
//!         _next: Next<Req, Res>,
//!     ) -> BoxFuture<CallResult<Res>> {
//!         Box::pin(async move { Err(Status::permission_denied(info.full_method())) })
//!     }
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use crate::context::Context;
use crate::handler::{BoxFuture, BoxedHandler, CallResult};
use crate::info::CallInfo;

/// A middleware unit wrapped around the rest of the chain.
///
/// The returned future must own what it needs: clone configuration out of
/// `&self` before the `async move` block.
pub trait Interceptor<Req, Res>: Send + Sync + 'static {
    fn intercept(
        &self,
        ctx: Context,
        req: Req,
        info: Arc<CallInfo>,
        next: Next<Req, Res>,
    ) -> BoxFuture<CallResult<Res>>;
}

/// A type-erased interceptor, as stored in a [`Chain`](crate::Chain).
pub type BoxedInterceptor<Req, Res> = Arc<dyn Interceptor<Req, Res>>;

impl<F, Fut, Req, Res> Interceptor<Req, Res> for F
where
    F: Fn(Context, Req, Arc<CallInfo>, Next<Req, Res>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallResult<Res>> + Send + 'static,
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
        Box::pin(self(ctx, req, info, next))
    }
}

// ── Next ──────────────────────────────────────────────────────────────────────

/// The rest of the chain, as seen from one interceptor.
///
/// Running it invokes exactly the next interceptor, or the terminal handler
/// when the current interceptor is the last one. It may be run more than
/// once (a retrying interceptor does), or not at all.
pub struct Next<Req, Res> {
    handler: BoxedHandler<Req, Res>,
}

impl<Req, Res> Next<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    /// Wraps a handler so it can be passed to an interceptor as its successor.
    pub fn new(handler: BoxedHandler<Req, Res>) -> Self {
        Self { handler }
    }

    /// Continues down the chain.
    pub fn run(&self, ctx: Context, req: Req) -> BoxFuture<CallResult<Res>> {
        self.handler.call(ctx, req)
    }

    /// The successor as a plain handler.
    pub fn into_handler(self) -> BoxedHandler<Req, Res> {
        self.handler
    }
}

impl<Req, Res> Clone for Next<Req, Res> {
    fn clone(&self) -> Self {
        Self { handler: Arc::clone(&self.handler) }
    }
}
