//! Field extraction for payment-proof slips: bank transfer screenshots,
//! e-wallet confirmations, mobile banking receipts.
//!
//! A proof carries exactly one authoritative payment amount, so the scan is a
//! single forward pass that stops once a date and a nonzero amount are both
//! in hand; the first confident match wins.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{find_date, parse_date, parse_price};
use crate::models::ParsedProof;

const DATE_KEYWORDS: &[&str] = &["Date:", "Transaction Date:", "Tanggal:", "Waktu:", "Time:"];

// Known issuer names seen on Indonesian payment proofs, banks first.
const BANK_NAMES: &[&str] = &[
    "BCA", "BNI", "BRI", "Mandiri", "CIMB", "Permata", "Danamon", "BSI", "SeaBank", "Jago",
    "GoPay", "OVO", "DANA", "ShopeePay", "LinkAja",
];

// Amount patterns in priority order: currency-prefixed, thousands-suffixed,
// then keyword-labeled. Each captures the numeric token handed to the price
// primitive.
static AMOUNT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)Rp\.?\s*([0-9]+[.,][0-9]+(?:[.,][0-9]+)?)",
        r"(?i)(?:Rp\.?|IDR)\s*([0-9]+[.,][0-9]*)",
        r"([0-9]+[.,][0-9]*000)\b",
        r"\b([0-9]+000(?:\.[0-9]+)?)\b",
        r"(?i)(?:Total|Amount|Jumlah|Pembayaran)\s*:?\s*([0-9]+[.,][0-9]*)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static GROUPED_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9][.,][0-9]").unwrap());

/// Extract payment details from proof OCR text.
///
/// Like the receipt extractor this never fails: an unreadable proof comes
/// back with an absent date and a zero amount for manual entry.
pub fn extract_proof(text: &str) -> ParsedProof {
    let mut proof = ParsedProof {
        raw_text: text.to_string(),
        ..Default::default()
    };

    for line in text.lines() {
        if proof.date_time.is_none() {
            proof.date_time = find_date(line).or_else(|| date_after_keyword(line));
        }
        if proof.total_payment == 0.0 {
            if let Some(amount) = find_amount(line) {
                proof.total_payment = amount;
            }
        }
        if proof.date_time.is_some() && proof.total_payment > 0.0 {
            break;
        }
    }

    proof.bank_name = detect_bank(text);

    tracing::debug!(
        amount = proof.total_payment,
        has_date = proof.date_time.is_some(),
        bank = proof.bank_name.as_deref().unwrap_or(""),
        "proof extracted"
    );
    proof
}

fn date_after_keyword(line: &str) -> Option<chrono::NaiveDateTime> {
    for keyword in DATE_KEYWORDS {
        if let Some(pos) = line.find(keyword) {
            let value = line[pos + keyword.len()..].trim();
            if let Some(dt) = parse_date(value).or_else(|| find_date(value)) {
                return Some(dt);
            }
        }
    }
    None
}

fn find_amount(line: &str) -> Option<f64> {
    // Cheap rejection: most proof lines carry no currency signal at all.
    let lower = line.to_lowercase();
    let keyword_signal = ["rp", "idr", "total", "amount", "jumlah", "pembayaran"]
        .iter()
        .any(|kw| lower.contains(kw));
    if !keyword_signal && !GROUPED_DIGITS.is_match(line) {
        return None;
    }

    for pattern in AMOUNT_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(line) {
            if let Some(token) = caps.get(1) {
                if let Some(amount) = parse_price(token.as_str()) {
                    return Some(amount);
                }
            }
        }
    }
    None
}

fn detect_bank(text: &str) -> Option<String> {
    for line in text.lines() {
        let lower = line.to_lowercase();
        for bank in BANK_NAMES {
            if lower.contains(&bank.to_lowercase()) {
                return Some((*bank).to_string());
            }
        }
    }
    None
}
