//! Receipt-to-score pipeline: a bank statement PDF goes in, an auditable
//! decision record comes out.
//!
//! Stages run leaf-first: document extraction, feature aggregation, rule-based
//! scoring, rent limit and eligibility, then assembly of the `DecisionRecord`.
//! Only an unreadable document fails the run; everything else degrades into
//! excluded lines or absent feature groups.

pub mod certificate;
pub mod document;
pub mod domain;
pub mod eligibility;
pub mod features;
pub mod pipeline;
pub mod rent;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use certificate::{CertificateError, CertificateTicket};
pub use document::{extract_pages, ExtractedDocument, UnreadableDocument};
pub use domain::{
    DecisionRecord, DecisionStatus, ExtractedPage, RawDocument, ReceiptId, TenantId,
};
pub use eligibility::{is_approved, RiskLevel, APPROVAL_THRESHOLD};
pub use features::{
    extract_features, ActivitySignals, BalanceSignals, ExtractionDiagnostics, FinancialFeatures,
    IncomeSignals, TransactionCategory,
};
pub use pipeline::{ReceiptEvaluation, ReceiptScorer, ScoreRequest};
pub use rent::max_rent_limit;
pub use repository::{DecisionStore, DecisionStoreError};
pub use router::receipt_router;
pub use scoring::{
    ScoreBreakdown, ScoreContribution, ScoreEngine, ScoreFactor, ScoreOutcome, BASELINE_SCORE,
};
pub use service::{ReceiptService, ReceiptServiceError};
