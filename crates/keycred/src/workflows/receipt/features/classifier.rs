use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Coarse purpose of a statement line, derived from its description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionCategory {
    Salary,
    Transfer,
    BillPayment,
    CardRepayment,
    CashAdvance,
    HighRisk,
    Returned,
    Other,
}

impl TransactionCategory {
    pub const fn label(self) -> &'static str {
        match self {
            TransactionCategory::Salary => "salary",
            TransactionCategory::Transfer => "transfer",
            TransactionCategory::BillPayment => "bill_payment",
            TransactionCategory::CardRepayment => "card_repayment",
            TransactionCategory::CashAdvance => "cash_advance",
            TransactionCategory::HighRisk => "high_risk",
            TransactionCategory::Returned => "returned",
            TransactionCategory::Other => "other",
        }
    }
}

/// Outcome of running a normalized description through the pattern table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: TransactionCategory,
    /// Index into the pattern table of the winning entry, `None` for `Other`.
    pub rule: Option<usize>,
    pub specificity: u8,
}

/// Ordered `{pattern, category, specificity}` table. Higher specificity wins;
/// on a tie the entry listed first wins. Patterns run against descriptions
/// already folded by `normalize_description`.
const PATTERN_TABLE: &[(&str, TransactionCategory, u8)] = &[
    // Returned and bounced items
    (r"\bKARSILIKSIZ\b", TransactionCategory::Returned, 3),
    (
        r"\b(EFT|HAVALE|FAST|TALIMAT|OTOMATIK ODEME|ODEME)\s+IADE",
        TransactionCategory::Returned,
        3,
    ),
    (r"\bYETERSIZ BAKIYE\b", TransactionCategory::Returned, 3),
    (r"\bGERI DONEN\b", TransactionCategory::Returned, 2),
    (r"\b(RETURNED|BOUNCED)\b", TransactionCategory::Returned, 2),
    // Payroll
    (
        r"\bMAAS\s+(ODEMESI|ODEME|YATIRMA)\b",
        TransactionCategory::Salary,
        3,
    ),
    (r"\bEMEKLI\s+(AYLIGI|MAASI)\b", TransactionCategory::Salary, 3),
    (r"\bMAAS\b", TransactionCategory::Salary, 2),
    (
        r"\b(BORDRO|PERSONEL ODEMESI|UCRET ODEMESI|PAYROLL|SALARY)\b",
        TransactionCategory::Salary,
        2,
    ),
    // Credit products
    (
        r"\bKREDI KARTI\s+(BORC\s+)?ODEME",
        TransactionCategory::CardRepayment,
        3,
    ),
    (r"\bKK\s+ODEME", TransactionCategory::CardRepayment, 2),
    (r"\bNAKIT AVANS\b", TransactionCategory::CashAdvance, 3),
    // Gambling and betting
    (
        r"\b(IDDAA|BAHIS|CASINO|BETTING|KUMAR)\b",
        TransactionCategory::HighRisk,
        3,
    ),
    (r"\b(MISLI|NESINE|BILYONER)\b", TransactionCategory::HighRisk, 2),
    // Utilities
    (r"\bFATURA(SI)?\b", TransactionCategory::BillPayment, 2),
    (
        r"\b(ELEKTRIK|DOGALGAZ|ENERJISA|IGDAS|ISKI|TURKCELL|VODAFONE|TURK TELEKOM|SUPERONLINE|TTNET)\b",
        TransactionCategory::BillPayment,
        1,
    ),
    (r"\bOTOMATIK ODEME\b", TransactionCategory::BillPayment, 1),
    // Transfers
    (
        r"\b(GELEN|GIDEN)\s+(EFT|HAVALE|FAST)\b",
        TransactionCategory::Transfer,
        2,
    ),
    (r"\b(EFT|HAVALE|FAST|VIRMAN)\b", TransactionCategory::Transfer, 1),
];

struct CompiledPattern {
    index: usize,
    regex: Regex,
    category: TransactionCategory,
    specificity: u8,
}

static COMPILED_PATTERNS: OnceLock<Vec<CompiledPattern>> = OnceLock::new();

fn compiled_patterns() -> &'static [CompiledPattern] {
    COMPILED_PATTERNS.get_or_init(|| {
        PATTERN_TABLE
            .iter()
            .enumerate()
            .filter_map(|(index, (pattern, category, specificity))| {
                match Regex::new(pattern) {
                    Ok(regex) => Some(CompiledPattern {
                        index,
                        regex,
                        category: *category,
                        specificity: *specificity,
                    }),
                    Err(err) => {
                        tracing::error!(index, pattern, error = %err, "classification pattern rejected");
                        None
                    }
                }
            })
            .collect()
    })
}

/// Classify an already-normalized description.
pub fn classify(normalized_description: &str) -> Classification {
    let mut best: Option<&CompiledPattern> = None;

    for pattern in compiled_patterns() {
        if !pattern.regex.is_match(normalized_description) {
            continue;
        }
        match best {
            Some(current) if current.specificity >= pattern.specificity => {}
            _ => best = Some(pattern),
        }
    }

    match best {
        Some(pattern) => Classification {
            category: pattern.category,
            rule: Some(pattern.index),
            specificity: pattern.specificity,
        },
        None => Classification {
            category: TransactionCategory::Other,
            rule: None,
            specificity: 0,
        },
    }
}

#[cfg(test)]
pub(crate) fn pattern_count_for_tests() -> (usize, usize) {
    (PATTERN_TABLE.len(), compiled_patterns().len())
}
