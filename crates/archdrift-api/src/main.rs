use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, Request};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

mod error;
mod repo;
mod routes;
mod state;

use state::AppState;

#[derive(Clone, Default)]
struct SequentialRequestId(Arc<AtomicU64>);

impl MakeRequestId for SequentialRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = self.0.fetch_add(1, Ordering::Relaxed);
        HeaderValue::from_str(&id.to_string()).ok().map(RequestId::new)
    }
}

fn data_dir() -> PathBuf {
    std::env::var_os("ARCHDRIFT_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".archdrift"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let state = Arc::new(AppState::new(data_dir()));
    let request_id_header = HeaderName::from_static("x-request-id");

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/baselines/{repo_id}/generate", post(routes::baselines::generate))
        .route("/baselines/{repo_id}/status", get(routes::baselines::status))
        .route("/baselines/{repo_id}/approve", post(routes::baselines::approve))
        .route("/analysis/{repo_id}/commit/{sha}", post(routes::analysis::analyze_commit))
        .route("/snapshots/{repo_id}", post(routes::snapshots::create).get(routes::snapshots::list))
        .route("/snapshots/{repo_id}/{snapshot_id}", get(routes::snapshots::get))
        .layer(SetRequestIdLayer::new(request_id_header.clone(), SequentialRequestId::default()))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = std::env::var("ARCHDRIFT_API_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "archdrift-api listening");
    axum::serve(listener, app).await?;
    Ok(())
}
