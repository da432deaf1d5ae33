//! Field extraction and verification for photographed receipts and
//! payment-proof slips.
//!
//! The crate is a text-to-structure pipeline: an external OCR engine turns an
//! image into text fragments, [`layout::reconstruct`] puts them into reading
//! order, [`extract_receipt`] / [`extract_proof`] pull structured fields out
//! of the text, and [`verify_payment`] decides whether a proof corroborates a
//! recorded order. Extraction is heuristic and best-effort: fields the text
//! does not support come back empty/zero/absent for manual correction, never
//! as errors.
//!
//! Amount and date handling follow Indonesian and English conventions, where
//! `25.000` is twenty-five thousand rupiah and `38,000.00` is the same figure
//! written US-style.

pub mod layout;
pub mod models;
pub mod parse;
pub mod pipeline;
pub mod verify;

pub use models::{
    BoundingBox, LineItem, Order, OrderFilter, ParsedProof, ParsedReceipt, TextFragment,
    VerificationStatus,
};
pub use parse::proof::extract_proof;
pub use parse::receipt::extract_receipt;
pub use parse::{find_date, parse_date, parse_price, same_calendar_day};
pub use pipeline::{run_proof_batch, run_receipt_batch, OcrOutput, OcrSource};
pub use verify::{price_matches, verify_payment, PRICE_TOLERANCE};
