use keycred::workflows::receipt::{
    DecisionRecord, DecisionStore, DecisionStoreError, ReceiptId, TenantId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct DecisionLedger {
    records: HashMap<ReceiptId, DecisionRecord>,
    /// Receipt ids in insertion order, so history reads oldest first.
    order: Vec<ReceiptId>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryDecisionStore {
    ledger: Arc<Mutex<DecisionLedger>>,
}

impl DecisionStore for InMemoryDecisionStore {
    fn insert(&self, record: DecisionRecord) -> Result<DecisionRecord, DecisionStoreError> {
        let mut guard = self.ledger.lock().expect("decision store mutex poisoned");
        if guard.records.contains_key(&record.receipt_id) {
            return Err(DecisionStoreError::Conflict(record.receipt_id.0.clone()));
        }
        guard.order.push(record.receipt_id.clone());
        guard
            .records
            .insert(record.receipt_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ReceiptId) -> Result<Option<DecisionRecord>, DecisionStoreError> {
        let guard = self.ledger.lock().expect("decision store mutex poisoned");
        Ok(guard.records.get(id).cloned())
    }

    fn for_tenant(&self, tenant: &TenantId) -> Result<Vec<DecisionRecord>, DecisionStoreError> {
        let guard = self.ledger.lock().expect("decision store mutex poisoned");
        Ok(guard
            .order
            .iter()
            .filter_map(|id| guard.records.get(id))
            .filter(|record| &record.tenant_id == tenant)
            .cloned()
            .collect())
    }
}

/// Media type guessed from a file extension, `application/octet-stream` when unknown.
pub(crate) fn media_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
