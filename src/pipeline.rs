//! Sequential batch processing over an external OCR collaborator.
//!
//! Images in a batch are handled one at a time: OCR, layout reconstruction,
//! then field extraction, before the next image starts. Sequential execution
//! bounds peak memory and keeps progress reporting strictly ordered; the
//! extractors themselves are pure functions of their text input, so a caller
//! that wants parallelism can spread images across threads instead.

use anyhow::Result;

use crate::layout;
use crate::models::{ParsedProof, ParsedReceipt, TextFragment};
use crate::parse::{proof, receipt};

/// What an OCR engine produced for one image: positioned fragments, or text
/// it already joined itself (in which case layout reconstruction is skipped).
#[derive(Debug, Clone)]
pub enum OcrOutput {
    Fragments(Vec<TextFragment>),
    Text(String),
}

impl OcrOutput {
    /// Reading-order text for the extractors.
    pub fn into_text(self) -> String {
        match self {
            OcrOutput::Fragments(fragments) => layout::reconstruct(&fragments),
            OcrOutput::Text(text) => text,
        }
    }
}

/// The external OCR collaborator: image bytes in, recognized text out.
pub trait OcrSource {
    fn recognize(&self, image: &[u8]) -> Result<OcrOutput>;
}

/// OCR and extract a batch of receipt images, in order.
///
/// `on_progress(index, total)` fires before work on each image begins. An
/// OCR failure degrades that image to an empty record rather than aborting
/// the batch.
pub fn run_receipt_batch<S, I, F>(ocr: &S, images: &[I], mut on_progress: F) -> Vec<ParsedReceipt>
where
    S: OcrSource,
    I: AsRef<[u8]>,
    F: FnMut(usize, usize),
{
    let total = images.len();
    let mut receipts = Vec::with_capacity(total);
    for (index, image) in images.iter().enumerate() {
        on_progress(index, total);
        let text = recognize_or_empty(ocr, image.as_ref(), index);
        receipts.push(receipt::extract_receipt(&text));
    }
    receipts
}

/// OCR and extract a batch of payment-proof images, in order.
pub fn run_proof_batch<S, I, F>(ocr: &S, images: &[I], mut on_progress: F) -> Vec<ParsedProof>
where
    S: OcrSource,
    I: AsRef<[u8]>,
    F: FnMut(usize, usize),
{
    let total = images.len();
    let mut proofs = Vec::with_capacity(total);
    for (index, image) in images.iter().enumerate() {
        on_progress(index, total);
        let text = recognize_or_empty(ocr, image.as_ref(), index);
        proofs.push(proof::extract_proof(&text));
    }
    proofs
}

fn recognize_or_empty<S: OcrSource>(ocr: &S, image: &[u8], index: usize) -> String {
    match ocr.recognize(image) {
        Ok(output) => output.into_text(),
        Err(error) => {
            tracing::warn!(%error, index, "OCR failed, extracting from empty text");
            String::new()
        }
    }
}
