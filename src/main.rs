use clap::Parser; // for cli
use event_counter::{
    AppState, CounterStore, FileSink, RateLimiter, RequestSimulator, Sink, SnapshotPublisher,
    config::Args,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // parse cli arguments
    let args = Args::parse();

    let counters = Arc::new(CounterStore::new());
    let sink: Arc<dyn Sink> = Arc::new(FileSink::new(&args.output));

    // background snapshot loop, stopped after the server drains
    let publisher =
        SnapshotPublisher::new(counters.clone(), sink.clone(), args.snapshot_interval()).spawn();

    let state = Arc::new(AppState::new(
        counters.clone(),
        sink,
        RateLimiter::new(args.rate_num, args.rate_time()),
        RequestSimulator::new(counters, args.click_probability, args.max_latency()),
    ));

    let app = event_counter::app(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    info!("Event counter running on http://{}", addr);
    info!(
        "Snapshots written to {} every {} seconds",
        args.output.display(),
        args.snapshot_interval
    );
    info!(
        "Stats rate limit: {} requests per {} seconds",
        args.rate_num, args.rate_time
    );

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "server error");
    }

    publisher.stop().await;
    info!("Shutdown complete");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
