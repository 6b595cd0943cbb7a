use super::domain::{DecisionRecord, ReceiptId, TenantId};

/// Persistence collaborator; receives finished records by value.
pub trait DecisionStore: Send + Sync {
    fn insert(&self, record: DecisionRecord) -> Result<DecisionRecord, DecisionStoreError>;
    fn fetch(&self, id: &ReceiptId) -> Result<Option<DecisionRecord>, DecisionStoreError>;
    /// Records for one tenant, oldest receipt first.
    fn for_tenant(&self, tenant: &TenantId) -> Result<Vec<DecisionRecord>, DecisionStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DecisionStoreError {
    #[error("receipt {0} already has a decision")]
    Conflict(String),
    #[error("receipt {0} not found")]
    NotFound(String),
    #[error("decision store unavailable: {0}")]
    Unavailable(String),
}
