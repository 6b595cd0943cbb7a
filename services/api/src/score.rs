use std::path::{Path, PathBuf};

use clap::Args;
use keycred::config::AppConfig;
use keycred::error::AppError;
use keycred::workflows::receipt::{
    DecisionRecord, RawDocument, ReceiptId, ReceiptScorer, ReceiptServiceError, ScoreRequest,
    TenantId,
};
use tracing::info;

use crate::infra::media_type_for;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Receipt file to score; the media type is guessed from the extension
    pub(crate) file: PathBuf,
    /// Tenant identifier echoed into the decision record
    #[arg(long)]
    pub(crate) tenant: String,
    /// Receipt identifier (defaults to one derived from the file name)
    #[arg(long)]
    pub(crate) receipt: Option<String>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pub(crate) pretty: bool,
}

pub(crate) fn run_score(config: &AppConfig, args: ScoreArgs) -> Result<(), AppError> {
    let record = score_file(&args, config.uploads.max_bytes)?;
    let output = if args.pretty {
        serde_json::to_string_pretty(&record)?
    } else {
        serde_json::to_string(&record)?
    };
    println!("{output}");
    Ok(())
}

pub(crate) fn score_file(args: &ScoreArgs, max_bytes: usize) -> Result<DecisionRecord, AppError> {
    let bytes = std::fs::read(&args.file)?;
    if bytes.len() > max_bytes {
        return Err(ReceiptServiceError::PayloadTooLarge {
            limit: max_bytes,
            actual: bytes.len(),
        }
        .into());
    }

    let media_type = media_type_for(&args.file);
    let receipt_id = args
        .receipt
        .clone()
        .unwrap_or_else(|| local_receipt_id(&args.file));
    info!(file = %args.file.display(), %media_type, receipt = %receipt_id, "scoring local receipt");

    Ok(ReceiptScorer::new().score(ScoreRequest {
        tenant_id: TenantId(args.tenant.clone()),
        receipt_id: ReceiptId(receipt_id),
        document: RawDocument::new(bytes, media_type),
    }))
}

fn local_receipt_id(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("receipt");
    format!("local-{stem}")
}
