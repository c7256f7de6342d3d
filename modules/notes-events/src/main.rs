//! Notes Events Service: consumer for note change events.
//!
//! The notes backend publishes an event whenever a note is created, edited,
//! viewed or deleted. This service accepts those events over RPC, queues them
//! and drains the queue from a background poller that logs and acknowledges
//! each one.
//!
//! Default: http://127.0.0.1:9110/

mod consumer;
mod routes;

use consumer::{ConsumerStats, PollerConfig};
use routes::AppState;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let port: u16 = std::env::var("NOTES_EVENTS_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9110);

    let poll_interval_secs: u64 = std::env::var("NOTES_EVENTS_POLL_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5);

    let max_batch: usize = std::env::var("NOTES_EVENTS_MAX_BATCH")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(10);

    let queue_capacity: usize = std::env::var("NOTES_EVENTS_QUEUE_CAPACITY")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1000);

    let (tx, rx) = consumer::queue(queue_capacity);
    let stats = Arc::new(ConsumerStats::default());

    log::info!("Starting event consumer (queue capacity {})", queue_capacity);
    tokio::spawn(consumer::run_poller(
        rx,
        stats.clone(),
        PollerConfig {
            poll_interval: Duration::from_secs(poll_interval_secs),
            max_batch,
        },
    ));

    let state = Arc::new(AppState {
        queue: tx,
        stats,
        start_time: Instant::now(),
    });

    let cors = tower_http::cors::CorsLayer::permissive();

    let app = axum::Router::new()
        .route("/rpc/events", axum::routing::post(routes::publish))
        .route("/rpc/status", axum::routing::get(routes::status))
        .with_state(state)
        .layer(cors);

    let addr = format!("127.0.0.1:{}", port);
    log::info!("Notes Events Service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server error");
}
