use super::super::features::FinancialFeatures;
use super::ScoreFactor;

/// A named, bounded contribution computed purely from the feature record.
#[derive(Debug, Clone, Copy)]
pub struct ScoreRule {
    pub factor: ScoreFactor,
    pub min: i32,
    pub max: i32,
    pub evaluate: fn(&FinancialFeatures) -> (i32, String),
}

pub const RULES: &[ScoreRule] = &[
    ScoreRule {
        factor: ScoreFactor::IncomePresence,
        min: -50,
        max: 60,
        evaluate: income_presence,
    },
    ScoreRule {
        factor: ScoreFactor::IncomeStability,
        min: 0,
        max: 120,
        evaluate: income_stability,
    },
    ScoreRule {
        factor: ScoreFactor::IncomeLevel,
        min: 0,
        max: 100,
        evaluate: income_level,
    },
    ScoreRule {
        factor: ScoreFactor::TransactionVolume,
        min: 0,
        max: 80,
        evaluate: transaction_volume,
    },
    ScoreRule {
        factor: ScoreFactor::BalanceHealth,
        min: 0,
        max: 80,
        evaluate: balance_health,
    },
    ScoreRule {
        factor: ScoreFactor::Overdraft,
        min: -100,
        max: 0,
        evaluate: overdraft,
    },
    ScoreRule {
        factor: ScoreFactor::UtilityBills,
        min: 0,
        max: 30,
        evaluate: utility_bills,
    },
    ScoreRule {
        factor: ScoreFactor::CardRepayment,
        min: 0,
        max: 30,
        evaluate: card_repayment,
    },
    ScoreRule {
        factor: ScoreFactor::CashAdvance,
        min: -100,
        max: 0,
        evaluate: cash_advance,
    },
    ScoreRule {
        factor: ScoreFactor::HighRisk,
        min: -160,
        max: 0,
        evaluate: high_risk,
    },
    ScoreRule {
        factor: ScoreFactor::ReturnedItems,
        min: -300,
        max: 0,
        evaluate: returned_items,
    },
];

/// Income tiers on stable monthly income, highest first. The lowest tier is
/// the 2025 gross minimum wage.
const INCOME_TIERS: &[(f64, i32)] = &[(60_000.0, 100), (35_000.0, 70), (17_002.0, 40)];
const BALANCE_TIERS: &[(f64, i32)] = &[(50_000.0, 80), (20_000.0, 50), (5_000.0, 20)];

fn income_presence(features: &FinancialFeatures) -> (i32, String) {
    match &features.income {
        Some(income) => (
            60,
            format!(
                "income observed in {} month(s) ({} salary, {} recurring credits)",
                income.months, income.salary_transactions, income.recurring_transactions
            ),
        ),
        None => (-50, "no salary or recurring income observed".to_string()),
    }
}

fn income_stability(features: &FinancialFeatures) -> (i32, String) {
    let Some(income) = &features.income else {
        return (0, "no income to assess".to_string());
    };

    match income.variation {
        Some(cv) if income.months >= 3 && cv <= 0.10 => (
            120,
            format!("steady income over {} months (cv {cv:.2})", income.months),
        ),
        Some(cv) if income.months >= 2 && cv <= 0.25 => (
            70,
            format!("mostly steady income over {} months (cv {cv:.2})", income.months),
        ),
        Some(cv) => (20, format!("irregular income (cv {cv:.2})")),
        None => (20, "income observed in a single month".to_string()),
    }
}

fn income_level(features: &FinancialFeatures) -> (i32, String) {
    let Some(stable) = features.stable_monthly_income() else {
        return (0, "no income to assess".to_string());
    };

    let points = INCOME_TIERS
        .iter()
        .find(|(floor, _)| stable >= *floor)
        .map(|(_, points)| *points)
        .unwrap_or(if stable > 0.0 { 10 } else { 0 });

    (points, format!("stable monthly income {stable:.2} TL"))
}

fn transaction_volume(features: &FinancialFeatures) -> (i32, String) {
    let transactions = features
        .activity
        .as_ref()
        .map(|activity| activity.transactions)
        .unwrap_or_default();

    let first = transactions.min(20) as i32;
    let next = transactions.saturating_sub(20).min(20) as i32;
    (first * 3 + next, format!("{transactions} transaction(s) parsed"))
}

fn balance_health(features: &FinancialFeatures) -> (i32, String) {
    let Some(balance) = &features.balance else {
        return (0, "no balance information".to_string());
    };

    let points = BALANCE_TIERS
        .iter()
        .find(|(floor, _)| balance.ending >= *floor)
        .map(|(_, points)| *points)
        .unwrap_or_default();

    (
        points,
        format!(
            "ending balance {:.2} TL, minimum {:.2} TL",
            balance.ending, balance.minimum
        ),
    )
}

fn overdraft(features: &FinancialFeatures) -> (i32, String) {
    let rows = features
        .balance
        .as_ref()
        .map(|balance| balance.overdrawn_rows)
        .unwrap_or_default();
    (
        capped_penalty(rows, 25, 100),
        format!("{rows} overdrawn balance row(s)"),
    )
}

fn utility_bills(features: &FinancialFeatures) -> (i32, String) {
    let months = features
        .activity
        .as_ref()
        .map(|activity| activity.bill_payment_months)
        .unwrap_or_default();
    (
        months.min(3) as i32 * 10,
        format!("bills paid in {months} month(s)"),
    )
}

fn card_repayment(features: &FinancialFeatures) -> (i32, String) {
    let months = features
        .activity
        .as_ref()
        .map(|activity| activity.card_repayment_months)
        .unwrap_or_default();
    (
        months.min(3) as i32 * 10,
        format!("credit card repaid in {months} month(s)"),
    )
}

fn cash_advance(features: &FinancialFeatures) -> (i32, String) {
    let count = activity_count(features, |activity| activity.cash_advances);
    (
        capped_penalty(count, 25, 100),
        format!("{count} cash advance(s)"),
    )
}

fn high_risk(features: &FinancialFeatures) -> (i32, String) {
    let count = activity_count(features, |activity| activity.high_risk);
    (
        capped_penalty(count, 40, 160),
        format!("{count} gambling or betting transaction(s)"),
    )
}

fn returned_items(features: &FinancialFeatures) -> (i32, String) {
    let count = activity_count(features, |activity| activity.returned_items);
    (
        capped_penalty(count, 75, 300),
        format!("{count} returned or bounced item(s)"),
    )
}

fn activity_count(
    features: &FinancialFeatures,
    pick: impl Fn(&super::super::features::ActivitySignals) -> u32,
) -> u32 {
    features.activity.as_ref().map(pick).unwrap_or_default()
}

fn capped_penalty(occurrences: u32, each: i32, cap: i32) -> i32 {
    let occurrences = i32::try_from(occurrences).unwrap_or(i32::MAX);
    -(occurrences.saturating_mul(each).min(cap))
}
