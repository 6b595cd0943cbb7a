mod cli;
mod infra;
mod routes;
mod score;
mod server;

use keycred::error::AppError;

#[cfg(test)]
#[allow(dead_code)]
#[path = "../../../crates/keycred/tests/common/pdf.rs"]
mod statement_fixture;

#[cfg(test)]
pub(crate) fn one_page_statement_pdf() -> Vec<u8> {
    statement_fixture::statement_pdf(&[statement_fixture::PageSpec::Text(&[
        "HESAP OZETI",
        "05.01.2025 MAAS ODEMESI ACME +30.000,00 32.000,00",
        "09.01.2025 TURKCELL FATURA -450,00 31.550,00",
    ])])
}

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
