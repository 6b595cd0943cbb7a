use serde::{Deserialize, Serialize};

use super::eligibility::RiskLevel;
use super::scoring::ScoreBreakdown;

/// Caller-supplied tenant identifier, echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantId(pub String);

/// Caller-assigned receipt identifier, treated as an opaque label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReceiptId(pub String);

/// Uploaded bytes together with the media type the uploader declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl RawDocument {
    pub fn new(bytes: impl Into<Vec<u8>>, media_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            media_type: media_type.into(),
        }
    }

    /// Convenience constructor for callers that already know they hold a PDF.
    pub fn pdf(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(bytes, mime::APPLICATION_PDF.essence_str())
    }
}

/// Text decoded from a single physical page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPage {
    /// 1-based position in the document.
    pub number: u32,
    pub text: String,
    /// The page carries images but no fonts, typically a scan.
    pub image_only: bool,
}

impl ExtractedPage {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }

    pub fn is_blank(&self) -> bool {
        self.lines().next().is_none()
    }
}

/// Terminal state of a scoring run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Completed,
    Failed,
}

impl DecisionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DecisionStatus::Completed => "completed",
            DecisionStatus::Failed => "failed",
        }
    }
}

/// Final, immutable outcome of scoring one uploaded receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub tenant_id: TenantId,
    pub receipt_id: ReceiptId,
    pub score: u16,
    pub max_rent_limit: u32,
    pub pages_parsed: u32,
    pub is_approved: bool,
    pub status: DecisionStatus,
    pub risk_level: RiskLevel,
    pub breakdown: ScoreBreakdown,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl DecisionRecord {
    pub fn is_failed(&self) -> bool {
        self.status == DecisionStatus::Failed
    }

    /// Human readable one-liner suitable for dashboards and CLI output.
    pub fn summary(&self) -> String {
        match (&self.status, &self.failure_reason) {
            (DecisionStatus::Failed, Some(reason)) => {
                format!("could not process this document: {reason}")
            }
            (DecisionStatus::Failed, None) => "could not process this document".to_string(),
            (DecisionStatus::Completed, _) if self.is_approved => format!(
                "approved with score {} (rent limit {} TL, {} risk)",
                self.score,
                self.max_rent_limit,
                self.risk_level.label()
            ),
            (DecisionStatus::Completed, _) => format!(
                "not approved: score {} below threshold",
                self.score
            ),
        }
    }
}
