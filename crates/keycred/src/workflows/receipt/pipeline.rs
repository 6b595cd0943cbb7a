use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::document::{extract_pages, UnreadableDocument};
use super::domain::{DecisionRecord, DecisionStatus, RawDocument, ReceiptId, TenantId};
use super::eligibility::{is_approved, RiskLevel};
use super::features::{extract_features, ExtractionDiagnostics, FinancialFeatures};
use super::rent::max_rent_limit;
use super::scoring::{ScoreBreakdown, ScoreEngine};

/// One uploaded receipt awaiting a decision.
#[derive(Debug, Clone)]
pub struct ScoreRequest {
    pub tenant_id: TenantId,
    pub receipt_id: ReceiptId,
    pub document: RawDocument,
}

/// The decision together with the intermediate records that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptEvaluation {
    pub record: DecisionRecord,
    /// `None` when the document never got past extraction.
    pub features: Option<FinancialFeatures>,
    pub diagnostics: ExtractionDiagnostics,
}

/// Runs extraction, feature aggregation, scoring, rent and eligibility in a
/// single synchronous pass. Holds no mutable state.
#[derive(Debug, Clone, Default)]
pub struct ReceiptScorer {
    engine: ScoreEngine,
}

impl ReceiptScorer {
    pub fn new() -> Self {
        Self {
            engine: ScoreEngine::new(),
        }
    }

    pub fn score(&self, request: ScoreRequest) -> DecisionRecord {
        self.evaluate(request).record
    }

    pub fn evaluate(&self, request: ScoreRequest) -> ReceiptEvaluation {
        let ScoreRequest {
            tenant_id,
            receipt_id,
            document,
        } = request;

        let extracted = match extract_pages(&document) {
            Ok(extracted) => extracted,
            Err(err) => {
                warn!(
                    tenant = %tenant_id.0,
                    receipt = %receipt_id.0,
                    error = %err,
                    "receipt could not be processed"
                );
                return ReceiptEvaluation {
                    record: failed_record(tenant_id, receipt_id, &err),
                    features: None,
                    diagnostics: ExtractionDiagnostics::default(),
                };
            }
        };

        let (features, diagnostics) = extract_features(&extracted.pages);
        let outcome = self.engine.score(&features);
        let status = DecisionStatus::Completed;
        let approved = is_approved(status, outcome.score);

        let record = DecisionRecord {
            tenant_id,
            receipt_id,
            score: outcome.score,
            max_rent_limit: max_rent_limit(outcome.score, &features),
            pages_parsed: extracted.pages_parsed(),
            is_approved: approved,
            status,
            risk_level: RiskLevel::assess(status, outcome.score),
            breakdown: outcome.breakdown,
            failure_reason: None,
        };

        info!(
            tenant = %record.tenant_id.0,
            receipt = %record.receipt_id.0,
            pages = record.pages_parsed,
            transactions = diagnostics.parsed_transactions,
            unparsed = diagnostics.unparsed_line_count,
            score = record.score,
            rent_limit = record.max_rent_limit,
            approved = record.is_approved,
            "receipt scored"
        );

        ReceiptEvaluation {
            record,
            features: Some(features),
            diagnostics,
        }
    }
}

fn failed_record(
    tenant_id: TenantId,
    receipt_id: ReceiptId,
    reason: &UnreadableDocument,
) -> DecisionRecord {
    DecisionRecord {
        tenant_id,
        receipt_id,
        score: 0,
        max_rent_limit: 0,
        pages_parsed: 0,
        is_approved: false,
        status: DecisionStatus::Failed,
        risk_level: RiskLevel::assess(DecisionStatus::Failed, 0),
        breakdown: ScoreBreakdown::empty(),
        failure_reason: Some(reason.to_string()),
    }
}
