//! # weft
//!
//! Interceptor chains for unary RPC handlers. Nothing more. Nothing less.
//!
//! ## The contract
//!
//! Your RPC framework owns the transport, the routing, and the codec. It
//! decodes a request, picks the handler, and calls it. weft does not touch
//! any of that.
//!
//! What's left for weft is the one piece that sits between the framework and
//! your business logic:
//!
//! - An ordered list of interceptors, built once at startup
//! - Wrapped around a terminal handler, first interceptor outermost
//! - Returned as a plain handler the framework calls like the bare one
//!
//! The chain adds no logging, retries, timeouts, or error translation of its
//! own. Interceptors that want those behaviours implement them; a few common
//! ones ship in [`interceptors`].
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use weft::{CallInfo, CallResult, Chain, Context, Next, Status};
//! use weft::interceptors::Trace;
//!
//! async fn say_hello(_ctx: Context, name: String) -> CallResult<String> {
//!     Ok(format!("Hello {name}"))
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let chain = Chain::builder()
//!     .with(Trace::new())
//!     .with(|ctx: Context, name: String, _info: Arc<CallInfo>, next: Next<String, String>| async move {
//!         if name.is_empty() {
//!             return Err(Status::invalid_argument("name is required"));
//!         }
//!         next.run(ctx, name).await
//!     })
//!     .build();
//!
//! let info = CallInfo::new("/helloworld.Greeter/SayHello").unwrap();
//! let handler = chain.wrap(say_hello, info);
//!
//! let reply = handler.call(Context::new(), "alice".to_owned()).await;
//! assert_eq!(reply.as_deref(), Ok("Hello alice"));
//! # }
//! ```

mod chain;
mod context;
mod error;
mod handler;
mod info;
mod interceptor;
mod status;

pub mod interceptors;

pub use chain::{Chain, ChainBuilder};
pub use context::Context;
pub use error::Error;
pub use handler::{BoxFuture, BoxedHandler, CallResult, ErasedHandler, Handler};
pub use info::CallInfo;
pub use interceptor::{BoxedInterceptor, Interceptor, Next};
pub use status::{Code, Status};
