use crate::cli::ServeArgs;
use crate::infra::{open_store, AppState};
use crate::routes::court_data_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use maat_court_data::config::AppConfig;
use maat_court_data::consumer::MessageDispatcher;
use maat_court_data::error::AppError;
use maat_court_data::telemetry;
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

    let store = open_store(&config.database)?;
    let dispatcher = MessageDispatcher::new(store, config.processing.clone());

    let app = court_data_routes(&dispatcher)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        db_user = config.processing.db_user(),
        "court data service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
