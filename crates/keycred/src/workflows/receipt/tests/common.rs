use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::config::CertificateConfig;
use crate::workflows::receipt::domain::{DecisionRecord, ExtractedPage, ReceiptId, TenantId};
use crate::workflows::receipt::features::{
    ActivitySignals, BalanceSignals, FinancialFeatures, IncomeSignals,
};
use crate::workflows::receipt::repository::{DecisionStore, DecisionStoreError};
use crate::workflows::receipt::service::ReceiptService;

#[allow(dead_code)]
#[path = "../../../../tests/common/pdf.rs"]
mod pdf;

pub(super) fn page(number: u32, lines: &[&str]) -> ExtractedPage {
    ExtractedPage {
        number,
        text: lines.join("\n"),
        image_only: false,
    }
}

/// Three months of salary, bills and card repayments with a healthy balance.
pub(super) fn steady_salary_statement() -> Vec<ExtractedPage> {
    vec![
        page(
            1,
            &[
                "XYZ BANKASI A.Ş. HESAP ÖZETİ",
                "Tarih Açıklama Tutar Bakiye",
                "05.01.2025 MAAŞ ÖDEMESİ ACME A.Ş. +45.000,00 50.000,00",
                "10.01.2025 ENERJISA ELEKTRİK FATURASI -800,00 49.200,00",
                "15.01.2025 KREDİ KARTI ÖDEMESİ -5.000,00 44.200,00",
                "05.02.2025 MAAŞ ÖDEMESİ ACME A.Ş. +45.000,00 89.200,00",
                "10.02.2025 ENERJISA ELEKTRİK FATURASI -800,00 88.400,00",
            ],
        ),
        page(
            2,
            &[
                "15.02.2025 KREDİ KARTI ÖDEMESİ -5.000,00 83.400,00",
                "05.03.2025 MAAŞ ÖDEMESİ ACME A.Ş. +45.000,00 128.400,00",
                "10.03.2025 ENERJISA ELEKTRİK FATURASI -800,00 127.600,00",
                "15.03.2025 KREDİ KARTI ÖDEMESİ -5.000,00 122.600,00",
                "Sayfa 2 / 2",
            ],
        ),
    ]
}

pub(super) fn income(stable: f64, months: u32, variation: Option<f64>) -> IncomeSignals {
    IncomeSignals {
        total: stable * f64::from(months),
        average_monthly: stable,
        stable_monthly: stable,
        months,
        variation,
        salary_transactions: months,
        recurring_transactions: 0,
    }
}

pub(super) fn quiet_activity() -> ActivitySignals {
    ActivitySignals {
        transactions: 0,
        statement_months: 1,
        total_credits: 0.0,
        total_debits: 0.0,
        transfers: 0,
        bill_payments: 0,
        bill_payment_months: 0,
        card_repayment_months: 0,
        cash_advances: 0,
        high_risk: 0,
        returned_items: 0,
    }
}

/// Deterministic LCG so randomized properties replay identically.
pub(super) struct SeededRng(u64);

impl SeededRng {
    pub(super) fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub(super) fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 33) as u32
    }

    pub(super) fn below(&mut self, bound: u32) -> u32 {
        self.next_u32() % bound.max(1)
    }

    pub(super) fn chance(&mut self, percent: u32) -> bool {
        self.below(100) < percent
    }

    pub(super) fn amount(&mut self, max_lira: u32) -> f64 {
        f64::from(self.below(max_lira)) + f64::from(self.below(100)) / 100.0
    }
}

pub(super) fn random_features(rng: &mut SeededRng) -> FinancialFeatures {
    let income = rng.chance(70).then(|| {
        let months = 1 + rng.below(6);
        IncomeSignals {
            total: rng.amount(600_000),
            average_monthly: rng.amount(100_000),
            stable_monthly: rng.amount(120_000),
            months,
            variation: (months >= 2).then(|| f64::from(rng.below(100)) / 100.0),
            salary_transactions: rng.below(12),
            recurring_transactions: rng.below(6),
        }
    });

    let activity = rng.chance(80).then(|| ActivitySignals {
        transactions: rng.below(400),
        statement_months: 1 + rng.below(12),
        total_credits: rng.amount(1_000_000),
        total_debits: rng.amount(1_000_000),
        transfers: rng.below(50),
        bill_payments: rng.below(20),
        bill_payment_months: rng.below(12),
        card_repayment_months: rng.below(12),
        cash_advances: rng.below(10),
        high_risk: rng.below(10),
        returned_items: rng.below(20),
    });

    let balance = rng.chance(75).then(|| BalanceSignals {
        minimum: rng.amount(10_000),
        ending: rng.amount(200_000),
        overdrawn_rows: rng.below(15),
    });

    FinancialFeatures {
        income,
        activity,
        balance,
    }
}

pub(super) fn statement_pdf(pages: &[&[&str]]) -> Vec<u8> {
    let pages: Vec<pdf::PageSpec<'_>> = pages.iter().map(|lines| pdf::PageSpec::Text(*lines)).collect();
    pdf::statement_pdf(&pages)
}

/// ASCII rendering of `steady_salary_statement`, as a bank would print it.
pub(super) fn steady_salary_pdf() -> Vec<u8> {
    statement_pdf(&[
        &[
            "XYZ BANKASI HESAP OZETI",
            "05.01.2025 MAAS ODEMESI ACME AS +45.000,00 50.000,00",
            "10.01.2025 ENERJISA ELEKTRIK FATURASI -800,00 49.200,00",
            "15.01.2025 KREDI KARTI ODEMESI -5.000,00 44.200,00",
            "05.02.2025 MAAS ODEMESI ACME AS +45.000,00 89.200,00",
            "10.02.2025 ENERJISA ELEKTRIK FATURASI -800,00 88.400,00",
        ],
        &[
            "15.02.2025 KREDI KARTI ODEMESI -5.000,00 83.400,00",
            "05.03.2025 MAAS ODEMESI ACME AS +45.000,00 128.400,00",
            "10.03.2025 ENERJISA ELEKTRIK FATURASI -800,00 127.600,00",
            "15.03.2025 KREDI KARTI ODEMESI -5.000,00 122.600,00",
        ],
    ])
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) records: Arc<Mutex<BTreeMap<ReceiptId, DecisionRecord>>>,
}

impl DecisionStore for MemoryStore {
    fn insert(&self, record: DecisionRecord) -> Result<DecisionRecord, DecisionStoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        if guard.contains_key(&record.receipt_id) {
            return Err(DecisionStoreError::Conflict(record.receipt_id.0.clone()));
        }
        guard.insert(record.receipt_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ReceiptId) -> Result<Option<DecisionRecord>, DecisionStoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn for_tenant(&self, tenant: &TenantId) -> Result<Vec<DecisionRecord>, DecisionStoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.tenant_id == tenant)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableStore;

impl DecisionStore for UnavailableStore {
    fn insert(&self, _record: DecisionRecord) -> Result<DecisionRecord, DecisionStoreError> {
        Err(DecisionStoreError::Unavailable("maintenance".to_string()))
    }

    fn fetch(&self, _id: &ReceiptId) -> Result<Option<DecisionRecord>, DecisionStoreError> {
        Err(DecisionStoreError::Unavailable("maintenance".to_string()))
    }

    fn for_tenant(&self, _tenant: &TenantId) -> Result<Vec<DecisionRecord>, DecisionStoreError> {
        Err(DecisionStoreError::Unavailable("maintenance".to_string()))
    }
}

pub(super) const TEST_UPLOAD_LIMIT: usize = 256 * 1024;

pub(super) fn receipt_service<S: DecisionStore + 'static>(store: S) -> Arc<ReceiptService<S>> {
    Arc::new(ReceiptService::new(
        Arc::new(store),
        CertificateConfig::default(),
        TEST_UPLOAD_LIMIT,
    ))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
