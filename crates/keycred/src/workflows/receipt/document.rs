use lopdf::{Dictionary, Document, ObjectId};
use tracing::{debug, info, warn};

use super::domain::{ExtractedPage, RawDocument};

const ACCEPTED_MEDIA_TYPES: &[&str] = &["application/pdf", "application/x-pdf"];

/// The single fatal failure of the pipeline: the upload is not a processable document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnreadableDocument {
    #[error("declared media type '{declared}' is not a PDF")]
    UnsupportedMediaType { declared: String },
    #[error("byte stream is not a parseable PDF: {0}")]
    Malformed(String),
    #[error("PDF is encrypted and exposes no text layer")]
    Encrypted,
    #[error("PDF has no pages")]
    NoPages,
    #[error("none of the {total} page(s) could be decoded")]
    NoReadablePages { total: usize },
}

/// Pages decoded from one document plus the bookkeeping the assembler reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub pages: Vec<ExtractedPage>,
    pub physical_pages: usize,
}

impl ExtractedDocument {
    pub fn pages_parsed(&self) -> u32 {
        u32::try_from(self.pages.len()).unwrap_or(u32::MAX)
    }
}

/// Turns raw PDF bytes into page text in physical order.
pub fn extract_pages(document: &RawDocument) -> Result<ExtractedDocument, UnreadableDocument> {
    ensure_pdf_media_type(&document.media_type)?;

    let doc = Document::load_mem(&document.bytes)
        .map_err(|err| UnreadableDocument::Malformed(err.to_string()))?;

    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(UnreadableDocument::NoPages);
    }

    let encrypted = doc.is_encrypted();
    let mut extracted = Vec::with_capacity(pages.len());

    for (&number, &object_id) in &pages {
        match doc.extract_text(&[number]) {
            Ok(text) => {
                let image_only = page_is_image_only(&doc, object_id);
                debug!(page = number, chars = text.len(), image_only, "decoded page");
                extracted.push(ExtractedPage {
                    number,
                    text,
                    image_only,
                });
            }
            Err(err) => {
                warn!(page = number, error = %err, "page content could not be decoded; skipping");
            }
        }
    }

    if extracted.is_empty() {
        return Err(if encrypted {
            UnreadableDocument::Encrypted
        } else {
            UnreadableDocument::NoReadablePages { total: pages.len() }
        });
    }

    info!(
        physical_pages = pages.len(),
        decoded_pages = extracted.len(),
        image_only = extracted.iter().filter(|page| page.image_only).count(),
        "document extracted"
    );

    Ok(ExtractedDocument {
        pages: extracted,
        physical_pages: pages.len(),
    })
}

fn ensure_pdf_media_type(declared: &str) -> Result<(), UnreadableDocument> {
    let essence = declared
        .parse::<mime::Mime>()
        .map(|parsed| parsed.essence_str().to_ascii_lowercase())
        .unwrap_or_default();

    if ACCEPTED_MEDIA_TYPES.contains(&essence.as_str()) {
        Ok(())
    } else {
        Err(UnreadableDocument::UnsupportedMediaType {
            declared: declared.to_string(),
        })
    }
}

/// A page that references image XObjects but no fonts cannot carry a text layer.
fn page_is_image_only(doc: &Document, page_id: ObjectId) -> bool {
    let Some(resources) = page_resources(doc, page_id) else {
        return false;
    };

    let has_fonts = resource_entry_is_populated(doc, resources, b"Font");
    let has_images = resource_entry_is_populated(doc, resources, b"XObject");
    has_images && !has_fonts
}

fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    doc.get_object(page_id)
        .ok()
        .and_then(|page| page.as_dict().ok())
        .and_then(|page| page.get(b"Resources").ok())
        .and_then(|resources| doc.dereference(resources).ok())
        .and_then(|(_, resolved)| resolved.as_dict().ok())
}

fn resource_entry_is_populated(doc: &Document, resources: &Dictionary, key: &[u8]) -> bool {
    resources
        .get(key)
        .ok()
        .and_then(|entry| doc.dereference(entry).ok())
        .and_then(|(_, resolved)| resolved.as_dict().ok())
        .is_some_and(|entries| !entries.is_empty())
}
