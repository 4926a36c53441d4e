use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, info, info_span, warn};

use crate::context::Context;
use crate::handler::{BoxFuture, CallResult};
use crate::info::CallInfo;
use crate::interceptor::{Interceptor, Next};
use crate::status::Code;

/// Wraps each call in an `rpc` span and logs its outcome.
///
/// One `info` event per successful call, one `warn` event per failed call,
/// both with the status code and latency. The result is returned unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl Trace {
    pub fn new() -> Self {
        Self
    }
}

impl<Req, Res> Interceptor<Req, Res> for Trace
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
        let span = info_span!("rpc", method = %info.full_method());

        Box::pin(
            async move {
                let started = Instant::now();
                let result = next.run(ctx, req).await;
                let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

                match &result {
                    Ok(_) => info!(code = %Code::Ok, latency_ms, "call completed"),
                    Err(status) => {
                        warn!(code = %status.code(), error = %status, latency_ms, "call failed")
                    }
                }
                result
            }
            .instrument(span),
        )
    }
}
