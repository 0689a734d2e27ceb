use crate::cli::ServeArgs;
use crate::infra::{AppState, FixtureDataFeed, InMemoryCloseStore};
use crate::routes::with_close_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use revcycle::config::AppConfig;
use revcycle::error::AppError;
use revcycle::telemetry;
use revcycle::workflows::close::MonthEndCloseService;
use std::sync::atomic::Ordering;
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
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    // The fixture feed stands in for the claims/payments/denials
    // subsystem; a settled month keeps every workflow path reachable
    // over HTTP.
    let store = Arc::new(InMemoryCloseStore::default());
    let feed = Arc::new(FixtureDataFeed::settled());
    let close_service = Arc::new(MonthEndCloseService::new(store, feed));

    let app = with_close_routes(close_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "month-end close service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
