//! Turns decoded page text into the grouped financial signals the scorer reads.

mod classifier;
mod normalizer;
mod parser;

pub use classifier::{classify, Classification, TransactionCategory};
pub use parser::{Direction, UnparsedReason};

#[cfg(test)]
pub(crate) use classifier::pattern_count_for_tests;
pub(crate) use normalizer::normalize_description;

use super::domain::ExtractedPage;
use chrono::{Datelike, NaiveDate};
use parser::{parse_line, LineKind, StatementLine};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const RECURRING_MIN_AMOUNT: f64 = 1_000.0;
const RECURRING_TOLERANCE: f64 = 0.05;
const RECURRING_MIN_MONTHS: usize = 3;
const MAX_UNPARSED_SAMPLES: usize = 20;

/// Income credits observed on the statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeSignals {
    pub total: f64,
    /// Total income divided by the months the statement spans.
    pub average_monthly: f64,
    /// Median of the per-month income totals.
    pub stable_monthly: f64,
    pub months: u32,
    /// Coefficient of variation of monthly totals; needs two or more months.
    pub variation: Option<f64>,
    pub salary_transactions: u32,
    pub recurring_transactions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySignals {
    pub transactions: u32,
    pub statement_months: u32,
    pub total_credits: f64,
    pub total_debits: f64,
    pub transfers: u32,
    pub bill_payments: u32,
    pub bill_payment_months: u32,
    pub card_repayment_months: u32,
    pub cash_advances: u32,
    pub high_risk: u32,
    pub returned_items: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSignals {
    pub minimum: f64,
    pub ending: f64,
    pub overdrawn_rows: u32,
}

/// Everything the scorer knows about a statement. A `None` group was never
/// observed, which is not the same as a group reporting zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialFeatures {
    pub income: Option<IncomeSignals>,
    pub activity: Option<ActivitySignals>,
    pub balance: Option<BalanceSignals>,
}

impl FinancialFeatures {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn stable_monthly_income(&self) -> Option<f64> {
        self.income.as_ref().map(|income| income.stable_monthly)
    }
}

/// A date-led line that was dropped from the aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnparsedLine {
    pub page: u32,
    pub reason: UnparsedReason,
    pub text: String,
}

/// Parser bookkeeping kept out of the decision record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionDiagnostics {
    pub candidate_lines: u32,
    pub parsed_transactions: u32,
    pub unparsed_line_count: u32,
    pub closing_balance_lines: u32,
    /// First few unparsed lines, for error reports.
    pub unparsed_samples: Vec<UnparsedLine>,
    pub pages_with_transactions: Vec<u32>,
}

#[derive(Debug, Clone)]
struct StatementEntry {
    line: StatementLine,
    category: TransactionCategory,
}

impl StatementEntry {
    fn month(&self) -> (i32, u32) {
        month_key(self.line.date)
    }

    fn is_credit(&self) -> bool {
        self.line.direction == Direction::Credit
    }
}

/// Aggregates every page into one feature record.
pub fn extract_features(pages: &[ExtractedPage]) -> (FinancialFeatures, ExtractionDiagnostics) {
    let mut diagnostics = ExtractionDiagnostics::default();
    let mut entries: Vec<StatementEntry> = Vec::new();
    let mut closing_balance: Option<f64> = None;

    for page in pages {
        let mut page_had_transactions = false;
        for line in page.lines() {
            match parse_line(line) {
                LineKind::Transaction(parsed) => {
                    diagnostics.candidate_lines += 1;
                    diagnostics.parsed_transactions += 1;
                    page_had_transactions = true;
                    let category = classify(&parsed.description).category;
                    tracing::trace!(
                        page = page.number,
                        category = category.label(),
                        amount = parsed.amount,
                        "statement line classified"
                    );
                    entries.push(StatementEntry {
                        line: parsed,
                        category,
                    });
                }
                LineKind::ClosingBalance(amount) => {
                    diagnostics.closing_balance_lines += 1;
                    closing_balance = Some(amount);
                }
                LineKind::Unparsed(reason) => {
                    diagnostics.candidate_lines += 1;
                    diagnostics.unparsed_line_count += 1;
                    if diagnostics.unparsed_samples.len() < MAX_UNPARSED_SAMPLES {
                        diagnostics.unparsed_samples.push(UnparsedLine {
                            page: page.number,
                            reason,
                            text: line.to_string(),
                        });
                    }
                }
                LineKind::Skipped => {}
            }
        }
        if page_had_transactions {
            diagnostics.pages_with_transactions.push(page.number);
        }
    }

    if diagnostics.unparsed_line_count > 0 {
        tracing::debug!(
            unparsed = diagnostics.unparsed_line_count,
            candidates = diagnostics.candidate_lines,
            "statement lines excluded from aggregates"
        );
    }

    let features = FinancialFeatures {
        income: income_signals(&entries),
        activity: activity_signals(&entries),
        balance: balance_signals(&entries, closing_balance),
    };

    (features, diagnostics)
}

fn income_signals(entries: &[StatementEntry]) -> Option<IncomeSignals> {
    if entries.is_empty() {
        return None;
    }

    let recurring = recurring_credit_flags(entries);
    let mut monthly: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    let mut salary_transactions = 0u32;
    let mut recurring_transactions = 0u32;

    for (entry, is_recurring) in entries.iter().zip(&recurring) {
        if !entry.is_credit() {
            continue;
        }
        let is_salary = entry.category == TransactionCategory::Salary;
        if !is_salary && !is_recurring {
            continue;
        }
        if is_salary {
            salary_transactions += 1;
        } else {
            recurring_transactions += 1;
        }
        *monthly.entry(entry.month()).or_default() += entry.line.amount;
    }

    if monthly.is_empty() {
        return None;
    }

    let totals: Vec<f64> = monthly.values().copied().collect();
    let total: f64 = totals.iter().sum();
    let span = statement_months(entries).max(1);

    Some(IncomeSignals {
        total: round_currency(total),
        average_monthly: round_currency(total / f64::from(span)),
        stable_monthly: round_currency(median(&totals)),
        months: count(totals.len()),
        variation: coefficient_of_variation(&totals),
        salary_transactions,
        recurring_transactions,
    })
}

/// Flags incoming transfers that repeat at a similar amount across months.
fn recurring_credit_flags(entries: &[StatementEntry]) -> Vec<bool> {
    let candidates: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| {
            entry.is_credit()
                && matches!(
                    entry.category,
                    TransactionCategory::Transfer | TransactionCategory::Other
                )
                && entry.line.amount >= RECURRING_MIN_AMOUNT
        })
        .map(|(index, _)| index)
        .collect();

    let mut flagged = vec![false; entries.len()];

    for &anchor_index in &candidates {
        if flagged[anchor_index] {
            continue;
        }
        let anchor = entries[anchor_index].line.amount;
        let cluster: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&index| {
                !flagged[index]
                    && (entries[index].line.amount - anchor).abs() <= anchor * RECURRING_TOLERANCE
            })
            .collect();
        let months: BTreeSet<(i32, u32)> =
            cluster.iter().map(|&index| entries[index].month()).collect();
        if months.len() >= RECURRING_MIN_MONTHS {
            for index in cluster {
                flagged[index] = true;
            }
        }
    }

    flagged
}

fn activity_signals(entries: &[StatementEntry]) -> Option<ActivitySignals> {
    if entries.is_empty() {
        return None;
    }

    let mut signals = ActivitySignals {
        transactions: count(entries.len()),
        statement_months: statement_months(entries),
        total_credits: 0.0,
        total_debits: 0.0,
        transfers: 0,
        bill_payments: 0,
        bill_payment_months: 0,
        card_repayment_months: 0,
        cash_advances: 0,
        high_risk: 0,
        returned_items: 0,
    };
    let mut bill_months = BTreeSet::new();
    let mut card_months = BTreeSet::new();

    for entry in entries {
        if entry.is_credit() {
            signals.total_credits += entry.line.amount;
        } else {
            signals.total_debits += entry.line.amount;
        }

        match entry.category {
            TransactionCategory::Transfer => signals.transfers += 1,
            TransactionCategory::BillPayment if !entry.is_credit() => {
                signals.bill_payments += 1;
                bill_months.insert(entry.month());
            }
            TransactionCategory::CardRepayment if !entry.is_credit() => {
                card_months.insert(entry.month());
            }
            TransactionCategory::CashAdvance => signals.cash_advances += 1,
            TransactionCategory::HighRisk => signals.high_risk += 1,
            TransactionCategory::Returned => signals.returned_items += 1,
            _ => {}
        }
    }

    signals.total_credits = round_currency(signals.total_credits);
    signals.total_debits = round_currency(signals.total_debits);
    signals.bill_payment_months = count(bill_months.len());
    signals.card_repayment_months = count(card_months.len());

    Some(signals)
}

fn balance_signals(entries: &[StatementEntry], closing: Option<f64>) -> Option<BalanceSignals> {
    let running: Vec<(NaiveDate, f64)> = entries
        .iter()
        .filter_map(|entry| entry.line.balance.map(|balance| (entry.line.date, balance)))
        .collect();

    if running.is_empty() && closing.is_none() {
        return None;
    }

    // Later rows win ties on date, so keep the last maximum.
    let latest_running = running
        .iter()
        .fold(None::<(NaiveDate, f64)>, |latest, &(date, balance)| match latest {
            Some((latest_date, _)) if latest_date > date => latest,
            _ => Some((date, balance)),
        })
        .map(|(_, balance)| balance);

    let ending = closing.or(latest_running).unwrap_or_default();
    let minimum = running
        .iter()
        .map(|(_, balance)| *balance)
        .chain(closing)
        .fold(f64::INFINITY, f64::min);
    let overdrawn_rows = count(running.iter().filter(|(_, balance)| *balance < 0.0).count());

    Some(BalanceSignals {
        minimum: round_currency(minimum.max(0.0)),
        ending: round_currency(ending.max(0.0)),
        overdrawn_rows,
    })
}

fn statement_months(entries: &[StatementEntry]) -> u32 {
    let first = entries.iter().map(|entry| entry.line.date).min();
    let last = entries.iter().map(|entry| entry.line.date).max();
    match (first, last) {
        (Some(first), Some(last)) => {
            let span = (last.year() - first.year()) * 12 + last.month() as i32
                - first.month() as i32
                + 1;
            u32::try_from(span).unwrap_or(1)
        }
        _ => 0,
    }
}

fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let middle = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[middle - 1] + sorted[middle]) / 2.0
    } else {
        sorted[middle]
    }
}

fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean <= 0.0 {
        return None;
    }
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    Some((variance.sqrt() / mean * 10_000.0).round() / 10_000.0)
}

fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
