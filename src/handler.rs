//! Handler trait and type erasure.
//!
//! # How handlers are stored
//!
//! A chain nests stages of *different* concrete types: user closures, the
//! terminal `async fn`, and the internal stage wrappers the chain builds.
//! They all hide behind one trait object, `dyn ErasedHandler`, so that every
//! stage can hold its successor without knowing what it is.
//!
//! ```text
//! async fn say_hello(ctx, req) -> Result<Res, Status> { … }  ← user writes this
//!        ↓ chain.wrap(say_hello, info)
//! say_hello.into_boxed_handler()                          ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(say_hello))                          ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(ctx, req)  at request time                 ← one vtable dispatch
//! ```
//!
//! The cost per stage per request is one virtual call and one boxed future.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::status::Status;

// ── Shared types ──────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future.
///
/// `Send + 'static` lets tokio move the future across worker threads; it
/// therefore owns everything it touches.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// What every stage of a chain produces.
pub type CallResult<Res> = Result<Res, Status>;

/// Dispatch interface shared by terminal handlers and composed stages.
///
/// `#[doc(hidden)] pub` because it appears in [`BoxedHandler`], the type the
/// chain hands back. Call it through [`BoxedHandler`]; implement
/// [`Handler`] instead.
#[doc(hidden)]
pub trait ErasedHandler<Req, Res>: Send + Sync + 'static {
    fn call(&self, ctx: Context, req: Req) -> BoxFuture<CallResult<Res>>;
}

/// A type-erased handler shared across concurrent calls.
///
/// Cloning is one atomic increment. A composed chain is returned as this
/// type, so it drops in anywhere a bare handler would go.
pub type BoxedHandler<Req, Res> = Arc<dyn ErasedHandler<Req, Res>>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid terminal handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` or closure with the signature:
///
/// ```text
/// async fn name(ctx: Context, req: Req) -> Result<Res, Status>
/// ```
///
/// The trait is **sealed**: only the blanket impl below can satisfy it.
pub trait Handler<Req, Res>: private::Sealed<Req, Res> + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler<Req, Res>;
}

mod private {
    pub trait Sealed<Req, Res> {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, Req, Res> private::Sealed<Req, Res> for F
where
    F: Fn(Context, Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallResult<Res>> + Send + 'static,
    Req: Send + 'static,
    Res: Send + 'static,
{
}

impl<F, Fut, Req, Res> Handler<Req, Res> for F
where
    F: Fn(Context, Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallResult<Res>> + Send + 'static,
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler<Req, Res> {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype bridging a concrete handler `F` to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, Req, Res> ErasedHandler<Req, Res> for FnHandler<F>
where
    F: Fn(Context, Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallResult<Res>> + Send + 'static,
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn call(&self, ctx: Context, req: Req) -> BoxFuture<CallResult<Res>> {
        Box::pin((self.0)(ctx, req))
    }
}
