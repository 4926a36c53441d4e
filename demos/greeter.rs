//! Greeter service behind an interceptor chain.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example greeter
//!
//! There is no transport here: the loop in `main` stands in for the RPC
//! framework, decoding nothing and calling the composed handler directly,
//! once per simulated request, all of them concurrently.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use weft::interceptors::{Deadline, RequireMetadata, Trace};
use weft::{CallInfo, CallResult, Chain, Context, Next, Status};

struct HelloRequest {
    name: String,
}

#[derive(Debug)]
struct HelloReply {
    message: String,
}

/// The business logic. Knows nothing about tracing, auth, or deadlines.
struct Greeter;

impl Greeter {
    async fn say_hello(&self, _ctx: Context, req: HelloRequest) -> CallResult<HelloReply> {
        info!(name = %req.name, "received");
        if req.name == "slowpoke" {
            tokio::time::sleep(Duration::from_secs(2)).await;
        }
        Ok(HelloReply { message: format!("Hello {}", req.name) })
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let chain = Chain::builder()
        .with(Trace::new())
        .with(RequireMetadata::new("authorization").equal_to("Bearer s3cret"))
        .with(
            |ctx: Context,
             req: HelloRequest,
             info: Arc<CallInfo>,
             next: Next<HelloRequest, HelloReply>| async move {
                if req.name.is_empty() {
                    return Err(Status::invalid_argument("name must not be empty"));
                }
                info!(service = info.service(), method = info.method(), "passing through");
                next.run(ctx, req).await
            },
        )
        .with(Deadline::new(Duration::from_millis(500)))
        .build();

    let greeter = Arc::new(Greeter);
    let say_hello = move |ctx: Context, req: HelloRequest| {
        let greeter = Arc::clone(&greeter);
        async move { greeter.say_hello(ctx, req).await }
    };

    let info = match CallInfo::new("/helloworld.Greeter/SayHello") {
        Ok(info) => info.with_types::<HelloRequest, HelloReply>(),
        Err(e) => {
            tracing::error!("{e}");
            return;
        }
    };
    let handler = chain.wrap(say_hello, info);

    let requests = [
        ("alice", Some("Bearer s3cret")),
        ("bob", Some("Bearer guess")),
        ("carol", None),
        ("", Some("Bearer s3cret")),
        ("slowpoke", Some("Bearer s3cret")),
    ];

    let mut calls = tokio::task::JoinSet::new();
    for (name, token) in requests {
        let handler = Arc::clone(&handler);
        calls.spawn(async move {
            let mut ctx = Context::new();
            if let Some(token) = token {
                ctx.insert_metadata("authorization", token);
            }
            let reply = handler.call(ctx, HelloRequest { name: name.to_owned() }).await;
            (name, reply)
        });
    }

    while let Some(joined) = calls.join_next().await {
        match joined {
            Ok((name, Ok(reply))) => info!(name, message = %reply.message, "reply"),
            Ok((name, Err(status))) => info!(name, %status, "error"),
            Err(e) => tracing::error!("call task failed: {e}"),
        }
    }
}
