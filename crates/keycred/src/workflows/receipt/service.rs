use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::certificate::{CertificateError, CertificateTicket};
use super::domain::{DecisionRecord, RawDocument, ReceiptId, TenantId};
use super::pipeline::{ReceiptScorer, ScoreRequest};
use super::repository::{DecisionStore, DecisionStoreError};
use crate::config::CertificateConfig;

/// Service composing the scorer, the decision store and certificate issuing.
pub struct ReceiptService<S> {
    scorer: ReceiptScorer,
    store: Arc<S>,
    certificates: CertificateConfig,
    max_upload_bytes: usize,
    sequence: AtomicU64,
}

impl<S> ReceiptService<S>
where
    S: DecisionStore + 'static,
{
    pub fn new(store: Arc<S>, certificates: CertificateConfig, max_upload_bytes: usize) -> Self {
        Self {
            scorer: ReceiptScorer::new(),
            store,
            certificates,
            max_upload_bytes,
            sequence: AtomicU64::new(1),
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    fn next_receipt_id(&self) -> ReceiptId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        ReceiptId(format!("rcpt-{id:06}"))
    }

    /// Score an uploaded document and persist the decision. An unreadable
    /// document is stored as a failed record, not returned as an error.
    pub fn submit(
        &self,
        tenant_id: TenantId,
        document: RawDocument,
    ) -> Result<DecisionRecord, ReceiptServiceError> {
        if document.bytes.len() > self.max_upload_bytes {
            return Err(ReceiptServiceError::PayloadTooLarge {
                limit: self.max_upload_bytes,
                actual: document.bytes.len(),
            });
        }

        let receipt_id = self.next_receipt_id();
        let record = self.scorer.score(ScoreRequest {
            tenant_id,
            receipt_id,
            document,
        });

        Ok(self.store.insert(record)?)
    }

    pub fn get(&self, receipt_id: &ReceiptId) -> Result<DecisionRecord, ReceiptServiceError> {
        let record = self
            .store
            .fetch(receipt_id)?
            .ok_or_else(|| DecisionStoreError::NotFound(receipt_id.0.clone()))?;
        Ok(record)
    }

    pub fn history(&self, tenant_id: &TenantId) -> Result<Vec<DecisionRecord>, ReceiptServiceError> {
        Ok(self.store.for_tenant(tenant_id)?)
    }

    pub fn certificate(
        &self,
        receipt_id: &ReceiptId,
        issued_at: DateTime<Utc>,
    ) -> Result<CertificateTicket, ReceiptServiceError> {
        let record = self.get(receipt_id)?;
        let ticket = CertificateTicket::issue(&record, issued_at, &self.certificates)?;
        Ok(ticket)
    }
}

/// Error raised by the receipt service.
#[derive(Debug, thiserror::Error)]
pub enum ReceiptServiceError {
    #[error("upload of {actual} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize, actual: usize },
    #[error(transparent)]
    Store(#[from] DecisionStoreError),
    #[error(transparent)]
    Certificate(#[from] CertificateError),
}
