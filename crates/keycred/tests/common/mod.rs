#![allow(dead_code)]

mod pdf;

pub use pdf::{empty_page_tree_pdf, statement_pdf, PageSpec};

use keycred::workflows::receipt::{RawDocument, ReceiptId, ScoreRequest, TenantId};

pub fn request(bytes: Vec<u8>) -> ScoreRequest {
    ScoreRequest {
        tenant_id: TenantId("tenant-integration".to_string()),
        receipt_id: ReceiptId("rcpt-000100".to_string()),
        document: RawDocument::pdf(bytes),
    }
}

pub const JANUARY: &[&str] = &[
    "GARANTI BANKASI HESAP HAREKETLERI",
    "Tarih Aciklama Tutar Bakiye",
    "05.01.2025 MAAS ODEMESI DELTA YAZILIM +38.000,00 41.000,00",
    "08.01.2025 IGDAS DOGALGAZ FATURASI -1.150,00 39.850,00",
    "12.01.2025 KREDI KARTI ODEMESI -6.000,00 33.850,00",
    "20.01.2025 GIDEN HAVALE KIRA -15.000,00 18.850,00",
];

pub const MARCH: &[&str] = &[
    "05.03.2025 MAAS ODEMESI DELTA YAZILIM +38.000,00 44.700,00",
    "08.03.2025 IGDAS DOGALGAZ FATURASI -1.050,00 43.650,00",
    "12.03.2025 KREDI KARTI ODEMESI -6.000,00 37.650,00",
    "20.03.2025 GIDEN HAVALE KIRA -15.000,00 22.650,00",
    "Donem Sonu Bakiyesi: 22.650,00 TL",
];

pub const FEBRUARY: &[&str] = &[
    "05.02.2025 MAAS ODEMESI DELTA YAZILIM +38.000,00 56.850,00",
    "08.02.2025 IGDAS DOGALGAZ FATURASI -1.300,00 55.550,00",
    "12.02.2025 KREDI KARTI ODEMESI -6.000,00 49.550,00",
    "20.02.2025 GIDEN HAVALE KIRA -15.000,00 34.550,00",
    "27.02.2025 MARKET ALISVERIS -3.000,00 31.550,00",
];
