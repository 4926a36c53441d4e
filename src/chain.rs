//! Interceptor chain builder.
//!
//! A [`Chain`] is an ordered, immutable list of interceptors. Applying it to a
//! terminal handler nests them right-to-left so that the first interceptor
//! is outermost:
//!
//! ```text
//! [A, B] around T   →   A( B( T ) )
//!
//! A before → B before → T → B after → A after
//! ```
//!
//! Build the chain once at startup, then [`wrap`](Chain::wrap) each terminal
//! handler with it. The result is a plain [`BoxedHandler`]; the framework
//! calls it exactly as it would call the bare handler.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::context::Context;
use crate::handler::{BoxFuture, BoxedHandler, CallResult, ErasedHandler, Handler};
use crate::info::CallInfo;
use crate::interceptor::{BoxedInterceptor, Interceptor, Next};

/// An ordered interceptor list, fixed at build time.
///
/// Cloning shares the list. Nothing in a chain is mutated after it is built,
/// so one chain and every handler it composes may be used from any number of
/// tasks at once.
pub struct Chain<Req, Res> {
    interceptors: Arc<[BoxedInterceptor<Req, Res>]>,
}

impl<Req, Res> Chain<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    /// Builds a chain from interceptors in outermost-first order.
    pub fn new(interceptors: Vec<BoxedInterceptor<Req, Res>>) -> Self {
        debug!(interceptors = interceptors.len(), "interceptor chain built");
        Self { interceptors: interceptors.into() }
    }

    /// Starts an empty [`ChainBuilder`].
    pub fn builder() -> ChainBuilder<Req, Res> {
        ChainBuilder { interceptors: Vec::new() }
    }

    /// Number of interceptors in the chain.
    pub fn len(&self) -> usize { self.interceptors.len() }

    /// `true` for a chain that forwards straight to the terminal handler.
    pub fn is_empty(&self) -> bool { self.interceptors.is_empty() }

    /// Wraps `terminal` in every interceptor of the chain.
    ///
    /// With no interceptors the terminal handler itself is returned.
    pub fn wrap(&self, terminal: impl Handler<Req, Res>, info: CallInfo) -> BoxedHandler<Req, Res> {
        self.compose(terminal.into_boxed_handler(), Arc::new(info))
    }

    /// Like [`wrap`](Chain::wrap), for a terminal that is already boxed
    /// (another composed chain, for instance).
    pub fn wrap_boxed(
        &self,
        terminal: BoxedHandler<Req, Res>,
        info: Arc<CallInfo>,
    ) -> BoxedHandler<Req, Res> {
        self.compose(terminal, info)
    }

    /// Stage `i` wraps stage `i + 1`; the stage past the last interceptor is
    /// `terminal`.
    fn compose(&self, terminal: BoxedHandler<Req, Res>, info: Arc<CallInfo>) -> BoxedHandler<Req, Res> {
        self.interceptors
            .iter()
            .rev()
            .fold(terminal, |next, interceptor| -> BoxedHandler<Req, Res> {
                Arc::new(Stage {
                    interceptor: Arc::clone(interceptor),
                    next,
                    info: Arc::clone(&info),
                })
            })
    }
}

/// A chain is itself an interceptor: installing it splices its interceptors
/// into the outer chain at that position.
impl<Req, Res> Interceptor<Req, Res> for Chain<Req, Res>
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
        self.compose(next.into_handler(), info).call(ctx, req)
    }
}

impl<Req, Res> Clone for Chain<Req, Res> {
    fn clone(&self) -> Self {
        Self { interceptors: Arc::clone(&self.interceptors) }
    }
}

impl<Req, Res> fmt::Debug for Chain<Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

// ── Stage ─────────────────────────────────────────────────────────────────────

/// One interceptor bound to its successor.
struct Stage<Req, Res> {
    interceptor: BoxedInterceptor<Req, Res>,
    next: BoxedHandler<Req, Res>,
    info: Arc<CallInfo>,
}

impl<Req, Res> ErasedHandler<Req, Res> for Stage<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn call(&self, ctx: Context, req: Req) -> BoxFuture<CallResult<Res>> {
        let next = Next::new(Arc::clone(&self.next));
        self.interceptor.intercept(ctx, req, Arc::clone(&self.info), next)
    }
}

// ── ChainBuilder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Chain`].
///
/// Obtain via [`Chain::builder()`]. Interceptors run in the order they are
/// added.
pub struct ChainBuilder<Req, Res> {
    interceptors: Vec<BoxedInterceptor<Req, Res>>,
}

impl<Req, Res> ChainBuilder<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    /// Appends an interceptor; it runs after every one added before it.
    pub fn with(mut self, interceptor: impl Interceptor<Req, Res>) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Appends an interceptor that is already boxed.
    pub fn with_boxed(mut self, interceptor: BoxedInterceptor<Req, Res>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Freezes the interceptor list into a [`Chain`].
    pub fn build(self) -> Chain<Req, Res> {
        Chain::new(self.interceptors)
    }
}
