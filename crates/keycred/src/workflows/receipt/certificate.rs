use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::domain::{DecisionRecord, ReceiptId, TenantId};
use super::eligibility::RiskLevel;
use super::scoring::ScoreBreakdown;
use crate::config::CertificateConfig;

const CERTIFICATE_ID_PREFIX: &str = "KC-";
const CERTIFICATE_ID_DIGITS: usize = 8;
const VERIFICATION_HASH_DIGITS: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CertificateError {
    #[error("receipt {receipt_id} is not approved (status {status}, score {score})")]
    NotApproved {
        receipt_id: String,
        status: &'static str,
        score: u16,
    },
    #[error("certificate validity of {days} day(s) overflows the calendar")]
    ValidityOutOfRange { days: u32 },
}

/// Everything a renderer needs to print and later verify a certificate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateTicket {
    pub certificate_id: String,
    pub verification_hash: String,
    pub tenant_id: TenantId,
    pub receipt_id: ReceiptId,
    pub score: u16,
    pub max_rent_limit: u32,
    pub risk_level: RiskLevel,
    pub breakdown: ScoreBreakdown,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub verify_url: String,
}

impl CertificateTicket {
    pub fn issue(
        record: &DecisionRecord,
        issued_at: DateTime<Utc>,
        config: &CertificateConfig,
    ) -> Result<Self, CertificateError> {
        if !record.is_approved {
            return Err(CertificateError::NotApproved {
                receipt_id: record.receipt_id.0.clone(),
                status: record.status.label(),
                score: record.score,
            });
        }

        let expires_at = issued_at
            .checked_add_signed(Duration::days(i64::from(config.validity_days)))
            .ok_or(CertificateError::ValidityOutOfRange {
                days: config.validity_days,
            })?;

        let certificate_id = certificate_id(&record.tenant_id, &record.receipt_id, record.score);
        let verification_hash =
            verification_hash(&certificate_id, record.score, &record.tenant_id, issued_at);
        let verify_url = verify_url(
            &config.verify_base_url,
            &certificate_id,
            &verification_hash,
            record.score,
        );

        tracing::info!(
            certificate = %certificate_id,
            receipt = %record.receipt_id.0,
            expires_at = %expires_at,
            "certificate ticket issued"
        );

        Ok(Self {
            certificate_id,
            verification_hash,
            tenant_id: record.tenant_id.clone(),
            receipt_id: record.receipt_id.clone(),
            score: record.score,
            max_rent_limit: record.max_rent_limit,
            risk_level: record.risk_level,
            breakdown: record.breakdown.clone(),
            issued_at,
            expires_at,
            verify_url,
        })
    }

    /// Recomputes the hash from the printed fields; used by verifiers.
    pub fn verifies(&self) -> bool {
        verification_hash(
            &self.certificate_id,
            self.score,
            &self.tenant_id,
            self.issued_at,
        ) == self.verification_hash
    }
}

fn certificate_id(tenant: &TenantId, receipt: &ReceiptId, score: u16) -> String {
    let mut hasher = Sha256::new();
    hasher.update(tenant.0.as_bytes());
    hasher.update(b":");
    hasher.update(receipt.0.as_bytes());
    hasher.update(b":");
    hasher.update(score.to_string().as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!(
        "{CERTIFICATE_ID_PREFIX}{}",
        digest[..CERTIFICATE_ID_DIGITS].to_ascii_uppercase()
    )
}

fn verification_hash(
    certificate_id: &str,
    score: u16,
    tenant: &TenantId,
    issued_at: DateTime<Utc>,
) -> String {
    let payload = format!(
        "{certificate_id}:{score}:{}:{}",
        tenant.0,
        issued_at.format("%Y-%m-%d")
    );
    let digest = format!("{:x}", Sha256::digest(payload.as_bytes()));
    digest[..VERIFICATION_HASH_DIGITS].to_string()
}

fn verify_url(base: &str, certificate_id: &str, hash: &str, score: u16) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}id={certificate_id}&hash={hash}&score={score}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn certificate_id_is_prefixed_upper_hex() {
        let id = certificate_id(&TenantId("t-1".into()), &ReceiptId("r-1".into()), 700);
        assert_eq!(id.len(), CERTIFICATE_ID_PREFIX.len() + CERTIFICATE_ID_DIGITS);
        assert!(id.starts_with("KC-"));
        assert!(id[3..]
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn verification_hash_depends_on_issue_date_only() {
        let tenant = TenantId("t-1".into());
        let morning = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).single().expect("valid");
        let evening = Utc.with_ymd_and_hms(2025, 3, 1, 22, 0, 0).single().expect("valid");
        let next_day = Utc.with_ymd_and_hms(2025, 3, 2, 8, 0, 0).single().expect("valid");

        let first = verification_hash("KC-00000000", 700, &tenant, morning);
        assert_eq!(first.len(), VERIFICATION_HASH_DIGITS);
        assert_eq!(first, verification_hash("KC-00000000", 700, &tenant, evening));
        assert_ne!(first, verification_hash("KC-00000000", 700, &tenant, next_day));
    }

    #[test]
    fn verify_url_respects_existing_query() {
        assert_eq!(
            verify_url("https://keycred.io/verify", "KC-1", "abc", 700),
            "https://keycred.io/verify?id=KC-1&hash=abc&score=700"
        );
        assert_eq!(
            verify_url("https://example.test/v?lang=tr", "KC-1", "abc", 700),
            "https://example.test/v?lang=tr&id=KC-1&hash=abc&score=700"
        );
    }
}
