use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use super::domain::{RawDocument, ReceiptId, TenantId};
use super::repository::DecisionStore;
use super::service::ReceiptService;
use crate::error::AppError;

/// Router exposing upload, lookup and certificate endpoints.
pub fn receipt_router<S>(service: Arc<ReceiptService<S>>) -> Router
where
    S: DecisionStore + 'static,
{
    let body_limit = service.max_upload_bytes();
    Router::new()
        .route(
            "/api/v1/tenants/:tenant_id/receipts",
            post(upload_handler::<S>).get(history_handler::<S>),
        )
        .route("/api/v1/receipts/:receipt_id", get(decision_handler::<S>))
        .route(
            "/api/v1/receipts/:receipt_id/certificate",
            get(certificate_handler::<S>),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(service)
}

pub(crate) async fn upload_handler<S>(
    State(service): State<Arc<ReceiptService<S>>>,
    Path(tenant_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError>
where
    S: DecisionStore + 'static,
{
    let media_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let document = RawDocument::new(body.to_vec(), media_type);

    let record = service.submit(TenantId(tenant_id), document)?;
    let status = if record.is_failed() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(record)).into_response())
}

pub(crate) async fn history_handler<S>(
    State(service): State<Arc<ReceiptService<S>>>,
    Path(tenant_id): Path<String>,
) -> Result<Response, AppError>
where
    S: DecisionStore + 'static,
{
    let records = service.history(&TenantId(tenant_id))?;
    Ok(Json(records).into_response())
}

pub(crate) async fn decision_handler<S>(
    State(service): State<Arc<ReceiptService<S>>>,
    Path(receipt_id): Path<String>,
) -> Result<Response, AppError>
where
    S: DecisionStore + 'static,
{
    let record = service.get(&ReceiptId(receipt_id))?;
    Ok(Json(record).into_response())
}

pub(crate) async fn certificate_handler<S>(
    State(service): State<Arc<ReceiptService<S>>>,
    Path(receipt_id): Path<String>,
) -> Result<Response, AppError>
where
    S: DecisionStore + 'static,
{
    let ticket = service.certificate(&ReceiptId(receipt_id), Utc::now())?;
    Ok(Json(ticket).into_response())
}
