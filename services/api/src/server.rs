use crate::cli::ServeArgs;
use crate::infra::{seed_listings, AppState, InMemoryListingRepository, InMemoryObjectStore};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use homehunt::config::AppConfig;
use homehunt::error::AppError;
use homehunt::telemetry;
use homehunt::{api_router, ApiState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryListingRepository::with_listings(seed_listings()));
    let uploader = Arc::new(InMemoryObjectStore::new(config.storage.public_bucket()));

    let app = with_operational_routes(api_router(ApiState::new(repository, uploader)))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        bucket = config.storage.bucket.as_str(),
        "homehunt listing service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
