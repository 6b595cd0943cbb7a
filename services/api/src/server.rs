use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryDecisionStore};
use crate::routes::with_receipt_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use keycred::config::AppConfig;
use keycred::error::AppError;
use keycred::workflows::receipt::ReceiptService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut config: AppConfig, mut args: ServeArgs) -> Result<(), AppError> {
    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryDecisionStore::default());
    let receipt_service = Arc::new(ReceiptService::new(
        store,
        config.certificates.clone(),
        config.uploads.max_bytes,
    ));

    let app = with_receipt_routes(receipt_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        max_upload_bytes = config.uploads.max_bytes,
        "receipt scoring service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
