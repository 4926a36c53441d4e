use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use weft::{BoxFuture, CallInfo, CallResult, Chain, Code, Context, Interceptor, Next, Status};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Per-call observation log, carried in the request context.
#[derive(Clone, Default)]
struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

fn log_of(ctx: &Context) -> Log {
    ctx.get::<Log>().cloned().expect("log missing from context")
}

/// Records `"{name} before"` / `"{name} after"` around the rest of the chain.
struct Marker {
    name: &'static str,
}

impl Interceptor<String, String> for Marker {
    fn intercept(
        &self,
        ctx: Context,
        req: String,
        _info: Arc<CallInfo>,
        next: Next<String, String>,
    ) -> BoxFuture<CallResult<String>> {
        let name = self.name;
        Box::pin(async move {
            let log = log_of(&ctx);
            log.push(format!("{name} before"));
            let result = next.run(ctx, format!("{req}>{name}")).await;
            log.push(format!("{name} after"));
            result
        })
    }
}

/// Returns its own reply without calling `next`.
struct ShortCircuit {
    name: &'static str,
}

impl Interceptor<String, String> for ShortCircuit {
    fn intercept(
        &self,
        ctx: Context,
        _req: String,
        _info: Arc<CallInfo>,
        _next: Next<String, String>,
    ) -> BoxFuture<CallResult<String>> {
        let name = self.name;
        Box::pin(async move {
            log_of(&ctx).push(format!("{name} returns"));
            Err(Status::permission_denied(format!("stopped by {name}")))
        })
    }
}

fn marker(name: &'static str) -> Marker {
    Marker { name }
}

fn info() -> CallInfo {
    CallInfo::new("/helloworld.Greeter/SayHello")
        .unwrap()
        .with_types::<String, String>()
}

async fn terminal(ctx: Context, req: String) -> CallResult<String> {
    log_of(&ctx).push("T");
    Ok(format!("{req}>T"))
}

fn call_context() -> (Context, Log) {
    let log = Log::default();
    (Context::new().with_extension(log.clone()), log)
}

// ── Cardinality ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn zero_interceptors_forward_to_terminal() {
    let handler = Chain::builder().build().wrap(terminal, info());

    for req in ["", "a", "hello world"] {
        let (ctx, log) = call_context();
        let (bare_ctx, _) = call_context();
        assert_eq!(
            handler.call(ctx, req.to_owned()).await,
            terminal(bare_ctx, req.to_owned()).await
        );
        assert_eq!(log.entries(), ["T"]);
    }
}

#[tokio::test]
async fn one_interceptor_matches_direct_invocation() {
    let handler = Chain::builder().with(marker("A")).build().wrap(terminal, info());

    let (ctx, chained_log) = call_context();
    let chained = handler.call(ctx, "req".to_owned()).await;

    let (ctx, direct_log) = call_context();
    let next = Next::new(Chain::builder().build().wrap(terminal, info()));
    let direct = marker("A")
        .intercept(ctx, "req".to_owned(), Arc::new(info()), next)
        .await;

    assert_eq!(chained, direct);
    assert_eq!(chained.as_deref(), Ok("req>A>T"));
    assert_eq!(chained_log.entries(), direct_log.entries());
}

#[tokio::test]
async fn before_in_declaration_order_after_in_reverse() {
    let handler = Chain::builder()
        .with(marker("A"))
        .with(marker("B"))
        .with(marker("C"))
        .with(marker("D"))
        .build()
        .wrap(terminal, info());

    let (ctx, log) = call_context();
    let reply = handler.call(ctx, "req".to_owned()).await;

    assert_eq!(reply.as_deref(), Ok("req>A>B>C>D>T"));
    assert_eq!(
        log.entries(),
        [
            "A before", "B before", "C before", "D before", "T",
            "D after", "C after", "B after", "A after",
        ]
    );
}

#[tokio::test]
async fn two_interceptor_flow() {
    let handler = Chain::builder()
        .with(marker("A"))
        .with(marker("B"))
        .build()
        .wrap(terminal, info());

    let (ctx, log) = call_context();
    handler.call(ctx, String::new()).await.unwrap();
    assert_eq!(log.entries(), ["A before", "B before", "T", "B after", "A after"]);
}

// ── Short-circuiting ──────────────────────────────────────────────────────────

#[tokio::test]
async fn short_circuit_skips_the_rest() {
    let terminal_calls = Arc::new(AtomicUsize::new(0));
    let counted = {
        let terminal_calls = Arc::clone(&terminal_calls);
        move |ctx: Context, req: String| {
            terminal_calls.fetch_add(1, Ordering::SeqCst);
            terminal(ctx, req)
        }
    };

    let handler = Chain::builder()
        .with(marker("A"))
        .with(ShortCircuit { name: "B" })
        .with(marker("C"))
        .build()
        .wrap(counted, info());

    let (ctx, log) = call_context();
    let reply = handler.call(ctx, "req".to_owned()).await;

    assert_eq!(reply, Err(Status::permission_denied("stopped by B")));
    assert_eq!(log.entries(), ["A before", "B returns", "A after"]);
    assert_eq!(terminal_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn first_interceptor_can_short_circuit() {
    let handler = Chain::builder()
        .with(ShortCircuit { name: "A" })
        .with(marker("B"))
        .build()
        .wrap(terminal, info());

    let (ctx, log) = call_context();
    let err = handler.call(ctx, "req".to_owned()).await.unwrap_err();

    assert_eq!(err.code(), Code::PermissionDenied);
    assert_eq!(log.entries(), ["A returns"]);
}

#[tokio::test]
async fn terminal_errors_propagate_unchanged() {
    async fn failing(_ctx: Context, _req: String) -> CallResult<String> {
        Err(Status::new(Code::DataLoss, "disk on fire"))
    }

    let handler = Chain::builder()
        .with(marker("A"))
        .with(marker("B"))
        .build()
        .wrap(failing, info());

    let (ctx, log) = call_context();
    assert_eq!(
        handler.call(ctx, "req".to_owned()).await,
        Err(Status::new(Code::DataLoss, "disk on fire"))
    );
    assert_eq!(log.entries(), ["A before", "B before", "B after", "A after"]);
}

// ── Interceptor capabilities ──────────────────────────────────────────────────

#[tokio::test]
async fn next_may_run_more_than_once() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let flaky = {
        let attempts = Arc::clone(&attempts);
        move |_ctx: Context, req: String| {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(Status::unavailable("try again"))
                } else {
                    Ok(req)
                }
            }
        }
    };

    let retry = |ctx: Context, req: String, _info: Arc<CallInfo>, next: Next<String, String>| async move {
        let mut last = Err(Status::internal("no attempts made"));
        for _ in 0..3 {
            last = next.run(ctx.clone(), req.clone()).await;
            if last.is_ok() {
                break;
            }
        }
        last
    };

    let handler = Chain::builder().with(retry).build().wrap(flaky, info());
    assert_eq!(handler.call(Context::new(), "ok".to_owned()).await.as_deref(), Ok("ok"));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn context_changes_flow_downstream_only() {
    #[derive(Clone)]
    struct Principal(&'static str);

    let authenticate = |mut ctx: Context, req: String, _info: Arc<CallInfo>, next: Next<String, String>| async move {
        ctx.insert(Principal("alice"));
        next.run(ctx, req).await
    };
    let whoami = |ctx: Context, _req: String| async move {
        Ok::<_, Status>(ctx.get::<Principal>().map_or("anonymous", |p| p.0).to_owned())
    };

    let handler = Chain::builder().with(authenticate).build().wrap(whoami, info());
    let ctx = Context::new();
    assert_eq!(handler.call(ctx.clone(), String::new()).await.as_deref(), Ok("alice"));
    assert!(ctx.get::<Principal>().is_none());
}

#[tokio::test]
async fn every_stage_sees_the_same_call_info() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let record = |seen: Arc<Mutex<Vec<String>>>| {
        move |ctx: Context, req: String, info: Arc<CallInfo>, next: Next<String, String>| {
            seen.lock().unwrap().push(info.full_method().to_owned());
            next.run(ctx, req)
        }
    };

    let handler = Chain::builder()
        .with(record(Arc::clone(&seen)))
        .with(record(Arc::clone(&seen)))
        .build()
        .wrap(terminal, info());

    let (ctx, _) = call_context();
    handler.call(ctx, String::new()).await.unwrap();
    assert_eq!(*seen.lock().unwrap(), ["/helloworld.Greeter/SayHello"; 2]);
}

// ── Chains as interceptors ────────────────────────────────────────────────────

#[tokio::test]
async fn nested_chain_splices_in_place() {
    let inner = Chain::builder().with(marker("B")).with(marker("C")).build();
    let handler = Chain::builder()
        .with(marker("A"))
        .with(inner)
        .with(marker("D"))
        .build()
        .wrap(terminal, info());

    let (ctx, log) = call_context();
    let reply = handler.call(ctx, "req".to_owned()).await;

    assert_eq!(reply.as_deref(), Ok("req>A>B>C>D>T"));
    assert_eq!(
        log.entries(),
        [
            "A before", "B before", "C before", "D before", "T",
            "D after", "C after", "B after", "A after",
        ]
    );
}

#[tokio::test]
async fn empty_nested_chain_is_transparent() {
    let handler = Chain::builder()
        .with(Chain::builder().build())
        .build()
        .wrap(terminal, info());

    let (ctx, log) = call_context();
    assert_eq!(handler.call(ctx, "req".to_owned()).await.as_deref(), Ok("req>T"));
    assert_eq!(log.entries(), ["T"]);
}

// ── Concurrency ───────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_calls_do_not_share_state() {
    let handler = Chain::builder()
        .with(marker("A"))
        .with(marker("B"))
        .build()
        .wrap(terminal, info());

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..64 {
        let handler = Arc::clone(&handler);
        tasks.spawn(async move {
            let (ctx, log) = call_context();
            let reply = handler.call(ctx, format!("req{i}")).await;
            (i, reply, log.entries())
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (i, reply, entries) = joined.unwrap();
        assert_eq!(reply, Ok(format!("req{i}>A>B>T")));
        assert_eq!(entries, ["A before", "B before", "T", "B after", "A after"]);
    }
}
