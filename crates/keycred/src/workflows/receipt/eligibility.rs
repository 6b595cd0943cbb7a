use super::domain::DecisionStatus;
use serde::{Deserialize, Serialize};

/// Minimum score that qualifies a completed decision for a certificate.
pub const APPROVAL_THRESHOLD: u16 = 650;
const LOW_RISK_THRESHOLD: u16 = 750;

pub fn is_approved(status: DecisionStatus, score: u16) -> bool {
    status == DecisionStatus::Completed && score >= APPROVAL_THRESHOLD
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn assess(status: DecisionStatus, score: u16) -> Self {
        match status {
            DecisionStatus::Failed => RiskLevel::High,
            DecisionStatus::Completed if score >= LOW_RISK_THRESHOLD => RiskLevel::Low,
            DecisionStatus::Completed if score >= APPROVAL_THRESHOLD => RiskLevel::Medium,
            DecisionStatus::Completed => RiskLevel::High,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}
