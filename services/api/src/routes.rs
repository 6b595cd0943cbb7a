use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use keycred::workflows::receipt::{receipt_router, DecisionStore, ReceiptService};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_receipt_routes<S>(service: Arc<ReceiptService<S>>) -> axum::Router
where
    S: DecisionStore + 'static,
{
    receipt_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::one_page_statement_pdf;
    use crate::infra::InMemoryDecisionStore;
    use axum::body::Body;
    use axum::http::Request;
    use keycred::config::CertificateConfig;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn app(ready: bool) -> axum::Router {
        let service = Arc::new(ReceiptService::new(
            Arc::new(InMemoryDecisionStore::default()),
            CertificateConfig::default(),
            1024 * 1024,
        ));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_receipt_routes(service).layer(Extension(state))
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let response = app(false)
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_tracks_the_flag() {
        let response = app(false)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["status"], "initializing");

        let response = app(true)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_render_as_prometheus_text() {
        let response = app(true)
            .oneshot(Request::get("/metrics").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).map(|value| value.as_bytes()),
            Some(b"text/plain; version=0.0.4".as_slice())
        );
    }

    #[tokio::test]
    async fn receipt_routes_are_mounted() {
        let router = app(true);
        let upload = Request::post("/api/v1/tenants/tenant-42/receipts")
            .header(header::CONTENT_TYPE, "application/pdf")
            .body(Body::from(one_page_statement_pdf()))
            .expect("request");

        let response = router.clone().oneshot(upload).await.expect("upload");
        assert_eq!(response.status(), StatusCode::CREATED);
        let record = json_body(response).await;
        assert_eq!(record["tenant_id"], "tenant-42");
        assert_eq!(record["pages_parsed"], 1);

        let response = router
            .oneshot(
                Request::get("/api/v1/tenants/tenant-42/receipts")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("history");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await.as_array().map(Vec::len), Some(1));
    }
}
