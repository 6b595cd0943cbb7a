mod rules;

pub use rules::{ScoreRule, RULES};

use super::features::FinancialFeatures;
use serde::{Deserialize, Serialize};

pub const BASELINE_SCORE: i32 = 500;
pub const MIN_SCORE: u16 = 0;
pub const MAX_SCORE: u16 = 1000;

/// Named contribution kinds, in the order they appear in a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    Baseline,
    IncomePresence,
    IncomeStability,
    IncomeLevel,
    TransactionVolume,
    BalanceHealth,
    Overdraft,
    UtilityBills,
    CardRepayment,
    CashAdvance,
    HighRisk,
    ReturnedItems,
}

impl ScoreFactor {
    pub const fn label(self) -> &'static str {
        match self {
            ScoreFactor::Baseline => "baseline",
            ScoreFactor::IncomePresence => "income_presence",
            ScoreFactor::IncomeStability => "income_stability",
            ScoreFactor::IncomeLevel => "income_level",
            ScoreFactor::TransactionVolume => "transaction_volume",
            ScoreFactor::BalanceHealth => "balance_health",
            ScoreFactor::Overdraft => "overdraft",
            ScoreFactor::UtilityBills => "utility_bills",
            ScoreFactor::CardRepayment => "card_repayment",
            ScoreFactor::CashAdvance => "cash_advance",
            ScoreFactor::HighRisk => "high_risk",
            ScoreFactor::ReturnedItems => "returned_items",
        }
    }
}

/// Discrete contribution to a score, kept for audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreContribution {
    pub factor: ScoreFactor,
    pub points: i32,
    pub note: String,
}

/// Ordered contributions; the first entry is always the baseline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreBreakdown(Vec<ScoreContribution>);

impl ScoreBreakdown {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ScoreContribution] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, factor: ScoreFactor) -> Option<&ScoreContribution> {
        self.0.iter().find(|entry| entry.factor == factor)
    }

    /// Unclamped sum of all contributions.
    pub fn total(&self) -> i32 {
        self.0.iter().map(|entry| entry.points).sum()
    }

    pub fn clamped(&self) -> u16 {
        let total = self.total().clamp(i32::from(MIN_SCORE), i32::from(MAX_SCORE));
        u16::try_from(total).unwrap_or(MAX_SCORE)
    }

    fn push(&mut self, contribution: ScoreContribution) {
        self.0.push(contribution);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreOutcome {
    pub score: u16,
    pub breakdown: ScoreBreakdown,
}

/// Stateless evaluator that walks the rule list over a feature record.
#[derive(Debug, Clone, Copy)]
pub struct ScoreEngine {
    rules: &'static [ScoreRule],
}

impl Default for ScoreEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreEngine {
    pub const fn new() -> Self {
        Self { rules: RULES }
    }

    pub fn score(&self, features: &FinancialFeatures) -> ScoreOutcome {
        let mut breakdown = ScoreBreakdown::default();
        breakdown.push(ScoreContribution {
            factor: ScoreFactor::Baseline,
            points: BASELINE_SCORE,
            note: "starting score".to_string(),
        });

        for rule in self.rules {
            let (points, note) = (rule.evaluate)(features);
            debug_assert!(
                (rule.min..=rule.max).contains(&points),
                "{} returned {points} outside {}..={}",
                rule.factor.label(),
                rule.min,
                rule.max
            );
            breakdown.push(ScoreContribution {
                factor: rule.factor,
                points: points.clamp(rule.min, rule.max),
                note,
            });
        }

        ScoreOutcome {
            score: breakdown.clamped(),
            breakdown,
        }
    }
}
