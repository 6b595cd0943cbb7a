use super::normalizer::normalize_description;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Money movement relative to the account holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Credit,
    Debit,
}

/// One statement row that parsed cleanly.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StatementLine {
    pub(crate) date: NaiveDate,
    pub(crate) description: String,
    /// Always non-negative; see `direction`.
    pub(crate) amount: f64,
    pub(crate) direction: Direction,
    /// Running balance printed on the row, signed.
    pub(crate) balance: Option<f64>,
}

/// Why a date-led line was excluded from the aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnparsedReason {
    Date,
    Amount,
    Balance,
    Shape,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LineKind {
    Transaction(StatementLine),
    ClosingBalance(f64),
    Unparsed(UnparsedReason),
    Skipped,
}

const DATE_LED_LINE: &str = r"^(?P<date>\d{4}-\d{2}-\d{2}|\d{1,2}[./-]\d{1,2}[./-]\d{2,4})(?:\s+\d{1,2}:\d{2}(?::\d{2})?)?(?:\s+(?P<body>.*\S))?\s*$";

// The amount must carry a sign or be followed by a direction token; the lazy
// description makes the left-most such amount win.
const TRANSACTION_BODY: &str = r"^(?P<desc>\S.*?)\s+(?:(?P<signed>[+-]\s?\d[\d.,]*)(?:\s*(?:TL|TRY|₺))?(?:\s+(?P<sdir>\(?(?:ALACAK|BORC|CR|DR|A|B)\)?))?|(?P<unsigned>\d[\d.,]*)(?:\s*(?:TL|TRY|₺))?\s+(?P<dir>\(?(?:ALACAK|BORC|CR|DR|A|B)\)?))(?:\s+(?P<balance>-?\d[\d.,]*)(?:\s*(?:TL|TRY|₺))?(?:\s+(?P<bdir>\(?(?:A|B)\)?))?)?$";

const CLOSING_BALANCE: &str = r"\b(?:KAPANIS BAKIYESI|DONEM SONU BAKIYES?I?|SON BAKIYE|GUNCEL BAKIYE)\s*:?\s*(?P<amount>[+-]?\d[\d.,]*)";

struct LinePatterns {
    date_led: Regex,
    body: Regex,
    closing: Regex,
}

static LINE_PATTERNS: OnceLock<Option<LinePatterns>> = OnceLock::new();

fn line_patterns() -> Option<&'static LinePatterns> {
    LINE_PATTERNS
        .get_or_init(|| {
            let compiled = (|| {
                Some(LinePatterns {
                    date_led: Regex::new(DATE_LED_LINE).ok()?,
                    body: Regex::new(TRANSACTION_BODY).ok()?,
                    closing: Regex::new(CLOSING_BALANCE).ok()?,
                })
            })();
            if compiled.is_none() {
                tracing::error!("statement line patterns failed to compile");
            }
            compiled
        })
        .as_ref()
}

pub(crate) fn parse_line(line: &str) -> LineKind {
    let Some(patterns) = line_patterns() else {
        return LineKind::Skipped;
    };
    let normalized = normalize_description(line);
    if normalized.is_empty() {
        return LineKind::Skipped;
    }

    if let Some(captures) = patterns.closing.captures(&normalized) {
        return match parse_try_amount(&captures["amount"]) {
            Some(amount) => LineKind::ClosingBalance(amount),
            None => LineKind::Unparsed(UnparsedReason::Amount),
        };
    }

    let Some(captures) = patterns.date_led.captures(&normalized) else {
        return LineKind::Skipped;
    };

    let Some(date) = parse_date(&captures["date"]) else {
        return LineKind::Unparsed(UnparsedReason::Date);
    };

    let Some(body) = captures.name("body") else {
        return LineKind::Unparsed(UnparsedReason::Shape);
    };

    let Some(body) = patterns.body.captures(body.as_str()) else {
        return LineKind::Unparsed(UnparsedReason::Shape);
    };

    let (raw_amount, direction_token) = match (body.name("signed"), body.name("unsigned")) {
        (Some(signed), _) => (signed.as_str(), body.name("sdir")),
        (None, Some(unsigned)) => (unsigned.as_str(), body.name("dir")),
        (None, None) => return LineKind::Unparsed(UnparsedReason::Shape),
    };

    let Some(signed_amount) = parse_try_amount(raw_amount) else {
        return LineKind::Unparsed(UnparsedReason::Amount);
    };

    let explicit_sign = raw_amount.trim_start().starts_with(['+', '-']);
    let direction = if explicit_sign {
        if signed_amount < 0.0 {
            Direction::Debit
        } else {
            Direction::Credit
        }
    } else {
        match direction_token.and_then(|token| direction_from_token(token.as_str())) {
            Some(direction) => direction,
            None => return LineKind::Unparsed(UnparsedReason::Shape),
        }
    };

    let balance = match body.name("balance") {
        Some(raw) => match parse_try_amount(raw.as_str()) {
            Some(value) => Some(signed_balance(value, body.name("bdir").map(|m| m.as_str()))),
            None => return LineKind::Unparsed(UnparsedReason::Balance),
        },
        None => None,
    };

    LineKind::Transaction(StatementLine {
        date,
        description: body["desc"].trim().to_string(),
        amount: signed_amount.abs(),
        direction,
        balance,
    })
}

/// A trailing `B` (borçlu) marks an overdrawn balance printed without a sign.
fn signed_balance(value: f64, suffix: Option<&str>) -> f64 {
    match suffix.and_then(direction_from_token) {
        Some(Direction::Debit) if value > 0.0 => -value,
        _ => value,
    }
}

fn direction_from_token(token: &str) -> Option<Direction> {
    match token.trim_matches(|c| c == '(' || c == ')') {
        "A" | "ALACAK" | "CR" => Some(Direction::Credit),
        "B" | "BORC" | "DR" => Some(Direction::Debit),
        _ => None,
    }
}

/// Parses a Turkish-locale amount (`.` thousands, `,` decimals). Grouped
/// thousands must be exactly three digits and decimals at most two.
pub(crate) fn parse_try_amount(raw: &str) -> Option<f64> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let (negative, unsigned) = match compact.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, compact.strip_prefix('+').unwrap_or(&compact)),
    };

    let (integer, fraction) = match unsigned.split_once(',') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    if !valid_integer_part(integer) {
        return None;
    }

    let mut minor_units = integer
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse::<i64>()
        .ok()?
        .checked_mul(100)?;

    if let Some(fraction) = fraction {
        if fraction.is_empty() || fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }
        let cents = fraction.parse::<i64>().ok()?;
        let cents = if fraction.len() == 1 { cents * 10 } else { cents };
        minor_units = minor_units.checked_add(cents)?;
    }

    let value = minor_units as f64 / 100.0;
    Some(if negative { -value } else { value })
}

fn valid_integer_part(integer: &str) -> bool {
    if integer.is_empty() {
        return false;
    }

    let mut groups = integer.split('.');
    let Some(leading) = groups.next() else {
        return false;
    };
    let all_digits = |group: &str| group.chars().all(|c| c.is_ascii_digit());

    if !integer.contains('.') {
        return all_digits(leading);
    }

    (1..=3).contains(&leading.len())
        && all_digits(leading)
        && groups.all(|group| group.len() == 3 && all_digits(group))
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.len() == 10 && trimmed.as_bytes().get(4) == Some(&b'-') {
        return NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok();
    }

    let separator = trimmed.chars().find(|c| matches!(c, '.' | '/' | '-'))?;
    let year_digits = trimmed.rsplit(separator).next()?.len();
    let format = match (separator, year_digits) {
        ('.', 4) => "%d.%m.%Y",
        ('.', 2) => "%d.%m.%y",
        ('/', 4) => "%d/%m/%Y",
        ('/', 2) => "%d/%m/%y",
        ('-', 4) => "%d-%m-%Y",
        ('-', 2) => "%d-%m-%y",
        _ => return None,
    };

    NaiveDate::parse_from_str(trimmed, format).ok()
}
