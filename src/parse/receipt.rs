//! Heuristic field extraction for restaurant/point-of-sale receipts.
//!
//! The input is OCR text in reading order; layouts vary per merchant and the
//! text carries recognition noise, so every stage is keyword- and
//! regex-driven with an empty/zero default when nothing matches. Extraction
//! never fails.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{find_date, parse_date, parse_price};
use crate::models::{LineItem, ParsedReceipt};

// "1x 16.000" style quantity-times-unit-price pattern.
static QUANTITY_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\s*x\s+\d+\.?\d+").unwrap());
static PRICE_AT_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\d+\.?\d+$").unwrap());
static STANDALONE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.?\d*$").unwrap());
static TRAILING_PRICE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\d+\.?\d*$").unwrap());
static TRAILING_FIGURE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.?\d+$").unwrap());
static LEADING_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\s+").unwrap());
static ORDER_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:Order\s*Number|No\.?)\s*[:•.\-]?\s*([\w-]+)").unwrap());

const NAME_NOISE_WORDS: &[&str] = &["BILL", "RECEIPT", "INVOICE"];
const PAYMENT_KEYWORDS: &[&str] = &[
    "cash", "card", "credit", "debit", "visa", "master", "qris", "gopay", "ovo", "dana",
];

/// Extract structured receipt fields from OCR text.
///
/// Always returns a fully-formed record; fields the heuristics cannot
/// recover stay at their defaults for downstream manual correction.
pub fn extract_receipt(text: &str) -> ParsedReceipt {
    let mut receipt = ParsedReceipt {
        raw_text: text.to_string(),
        ..Default::default()
    };

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return receipt;
    }

    receipt.restaurant_name = extract_restaurant_name(&lines);
    extract_metadata(&lines, &mut receipt);
    extract_total(&lines, &mut receipt);
    extract_payment_method(&lines, &mut receipt);
    receipt.line_items = extract_items(&lines);

    tracing::debug!(
        items = receipt.line_items.len(),
        total = receipt.total_price,
        has_date = receipt.date_time.is_some(),
        "receipt extracted"
    );
    receipt
}

// The merchant name is the run of leading lines before the first metadata
// marker; OCR often wraps it across several fragments.
fn extract_restaurant_name(lines: &[&str]) -> String {
    let mut name_lines = Vec::new();
    for line in lines {
        let lower = line.to_lowercase();
        if lower.contains("date") || lower.contains("order") || line.contains(':') || line.contains("==")
        {
            break;
        }
        name_lines.push(*line);
    }
    name_lines.join(" ").trim().to_string()
}

fn extract_metadata(lines: &[&str], receipt: &mut ParsedReceipt) {
    let joined = lines.join("\n");

    receipt.date_time = find_date(&joined);

    if let Some(caps) = ORDER_NUMBER.captures(&joined) {
        let token = caps.get(1).map_or("", |m| m.as_str());
        // Short captures are almost always accidental matches on "No".
        if token.len() > 2 {
            receipt.order_number = token.to_string();
        }
    }

    if receipt.date_time.is_some() && !receipt.order_number.is_empty() {
        return;
    }

    // Line-by-line fallback keyed on the field labels.
    for line in lines {
        let lower = line.to_lowercase();
        if receipt.date_time.is_none() && lower.contains("date") {
            if let Some(value) = value_after(line, ':') {
                receipt.date_time = parse_date(value).or_else(|| find_date(value));
            }
        }
        if receipt.order_number.is_empty() && lower.contains("order number") {
            if let Some(value) = value_after(line, ':') {
                if !value.is_empty() {
                    receipt.order_number = value.to_string();
                }
            }
        }
    }
}

fn extract_total(lines: &[&str], receipt: &mut ParsedReceipt) {
    for (i, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();
        if !lower.contains("total") || lower.contains("total item") {
            continue;
        }
        // "Total 25.000" on one line, or the figure wrapped onto the next.
        if let Some(price) = extract_price(line) {
            receipt.total_price = price;
            break;
        }
        if let Some(next) = lines.get(i + 1) {
            if let Some(price) = extract_price(next) {
                receipt.total_price = price;
                break;
            }
        }
    }
}

fn extract_payment_method(lines: &[&str], receipt: &mut ParsedReceipt) {
    let mut tender_found = false;
    for (i, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();
        if !lower.contains("tender") && !lower.contains("payment") {
            continue;
        }
        tender_found = true;
        // The method is usually one of the next few lines, past any change
        // line or bare figure.
        let limit = lines.len().min(i + 4);
        for candidate in &lines[i + 1..limit] {
            let candidate_lower = candidate.to_lowercase();
            if candidate_lower.contains("change") || STANDALONE_NUMBER.is_match(candidate) {
                continue;
            }
            let method = TRAILING_PRICE.replace(candidate, "").trim().to_string();
            if !method.is_empty() {
                receipt.payment_method = method;
                return;
            }
        }
    }

    // No tender section: look for a known method near the bottom.
    if tender_found {
        return;
    }
    let tail_start = lines.len().saturating_sub(10);
    for line in &lines[tail_start..] {
        let lower = line.to_lowercase();
        if lower.contains("total") || lower.contains("change") {
            continue;
        }
        if PAYMENT_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            receipt.payment_method = TRAILING_PRICE.replace(line, "").trim().to_string();
            break;
        }
    }
}

fn extract_items(lines: &[&str]) -> Vec<LineItem> {
    let start = lines.iter().position(|l| is_section_marker(l)).unwrap_or(0);
    let end = lines
        .iter()
        .position(|l| {
            let lower = l.to_lowercase();
            lower.contains("total item")
                || lower.contains("sub total")
                || (lower.contains("total") && !QUANTITY_LINE.is_match(l))
        })
        .unwrap_or(lines.len());

    if start >= end || start + 1 >= lines.len() {
        return Vec::new();
    }

    let mut quantity_lines: Vec<(usize, f64)> = Vec::new();
    for i in (start + 1)..end {
        if QUANTITY_LINE.is_match(lines[i]) {
            if let Some(price) = extract_price(lines[i]) {
                quantity_lines.push((i, price));
            }
        }
    }

    let mut items = Vec::new();
    for (qi, &(line_idx, price)) in quantity_lines.iter().enumerate() {
        // "Nasi Putih 1x 4.000 4.000": the name sits before the pattern.
        if let Some(name) = name_before_quantity(lines[line_idx]) {
            items.push(LineItem::new(name, price));
            continue;
        }

        // Otherwise the name is on the preceding lines, bounded below by the
        // previous item's quantity line (or the section start).
        let floor = if qi > 0 { quantity_lines[qi - 1].0 + 1 } else { start };
        let parts = collect_name_backward(lines, line_idx, floor);
        let name = clean_item_name(&parts.join(" "));
        if !name.is_empty() {
            items.push(LineItem::new(name, price));
        }
    }
    items
}

// Backward scan for a wrapped item name. Walks up from the quantity line,
// skipping section markers, until a stop predicate fires: another quantity
// line, a metadata line, or the floor of the search window.
fn collect_name_backward(lines: &[&str], quantity_idx: usize, floor: usize) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut idx = quantity_idx;
    while idx > floor {
        idx -= 1;
        let line = lines[idx];
        if is_section_marker(line) {
            continue;
        }
        if stops_name_collection(line) {
            break;
        }
        let cleaned = TRAILING_PRICE.replace(line, "").trim().to_string();
        if !cleaned.is_empty() && !NAME_NOISE_WORDS.iter().any(|w| cleaned.contains(w)) {
            parts.insert(0, cleaned);
        }
    }
    parts
}

fn is_section_marker(line: &str) -> bool {
    line.contains("REPRINT BILL")
        || line.contains("==")
        || line.contains("ITEM")
        || line.contains("QTY")
}

fn stops_name_collection(line: &str) -> bool {
    let lower = line.to_lowercase();
    QUANTITY_LINE.is_match(line)
        || line.contains(':')
        || lower.contains("date")
        || lower.contains("order")
}

fn name_before_quantity(line: &str) -> Option<String> {
    let m = QUANTITY_LINE.find(line)?;
    let prefix = line[..m.start()].trim();
    if prefix.is_empty() {
        return None;
    }
    let cleaned = clean_item_name(prefix);
    (!cleaned.is_empty()).then_some(cleaned)
}

// Strip recognition artifacts: stray leading digits and reprint markers.
fn clean_item_name(name: &str) -> String {
    let mut cleaned = LEADING_DIGITS.replace(name, "").to_string();
    for noise in ["**", "*", "REPRINT", "BILL", "==="] {
        cleaned = cleaned.replace(noise, "");
    }
    cleaned.trim().to_string()
}

/// Pull a price out of a receipt line, preferring the rightmost figure.
fn extract_price(text: &str) -> Option<f64> {
    // Trailing figure: "Total 25.000" or the repeated line total after a
    // quantity pattern.
    if let Some(m) = PRICE_AT_END.find(text) {
        return parse_price(m.as_str());
    }
    if STANDALONE_NUMBER.is_match(text) {
        return parse_price(text);
    }
    // "1x 16.000" with nothing after: the unit price inside the pattern.
    if let Some(m) = QUANTITY_LINE.find(text) {
        let after = text[m.end()..].trim();
        if !after.is_empty() {
            if let Some(price) = parse_price(after) {
                return Some(price);
            }
        }
        if let Some(tail) = TRAILING_FIGURE.find(m.as_str()) {
            return parse_price(tail.as_str());
        }
    }
    None
}

fn value_after(line: &str, separator: char) -> Option<&str> {
    line.split_once(separator).map(|(_, value)| value.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const SAMPLE: &str = "\
Mama Djempol Binong
Date : 17/03/2025 13:27
Order Number : POS-170325-99
** REPRINT BILL **
Daging Sapi lada
Hitam
1x 16.000 16.000
Kentang Mustopa
1x 5.000 5.000
Nasi Putih
1x 4.000 4.000
Total Item 3
Total 25.000
Tender
Qris Mandiri 25.000
Change 0";

    #[test]
    fn full_receipt_extraction() {
        let receipt = extract_receipt(SAMPLE);

        assert_eq!(receipt.restaurant_name, "Mama Djempol Binong");
        assert_eq!(receipt.order_number, "POS-170325-99");
        assert_eq!(receipt.total_price, 25000.0);
        assert!(receipt.payment_method.contains("Qris Mandiri"));

        let dt = receipt.date_time.expect("date present");
        assert_eq!((dt.day(), dt.month(), dt.year()), (17, 3, 2025));
        assert_eq!((dt.hour(), dt.minute()), (13, 27));

        let items: Vec<(&str, f64)> = receipt
            .line_items
            .iter()
            .map(|i| (i.name.as_str(), i.price))
            .collect();
        assert_eq!(
            items,
            vec![
                ("Daging Sapi lada Hitam", 16000.0),
                ("Kentang Mustopa", 5000.0),
                ("Nasi Putih", 4000.0),
            ]
        );
    }

    #[test]
    fn empty_text_gives_default_record() {
        let receipt = extract_receipt("");
        assert_eq!(receipt.restaurant_name, "");
        assert_eq!(receipt.order_number, "");
        assert_eq!(receipt.date_time, None);
        assert!(receipt.line_items.is_empty());
        assert_eq!(receipt.total_price, 0.0);
    }

    #[test]
    fn item_name_on_quantity_line() {
        let text = "\
Warung Sederhana
== ITEMS ==
Nasi Putih 1x 4.000 4.000
Total 4.000";
        let receipt = extract_receipt(text);
        assert_eq!(receipt.line_items.len(), 1);
        assert_eq!(receipt.line_items[0].name, "Nasi Putih");
        assert_eq!(receipt.line_items[0].price, 4000.0);
    }

    #[test]
    fn total_on_following_line() {
        let text = "\
Kopi Kenangan
== ==
Americano 1x 18.000 18.000
Total
18.000";
        let receipt = extract_receipt(text);
        assert_eq!(receipt.total_price, 18000.0);
    }

    #[test]
    fn payment_method_fallback_keywords() {
        let text = "\
Bakso Pak Min
== ==
Bakso Urat 1x 15.000 15.000
Total 15.000
Gopay 15.000";
        let receipt = extract_receipt(text);
        assert!(receipt.payment_method.contains("Gopay"));
    }

    #[test]
    fn short_order_capture_is_rejected() {
        // "no" inside an ordinary word must not become an order number.
        let text = "\
Binong Jaya
Total 10.000";
        let receipt = extract_receipt(text);
        assert_eq!(receipt.order_number, "");
    }

    #[test]
    fn noise_is_stripped_from_item_names() {
        let text = "\
Resto Enak
** REPRINT BILL **
12 Ayam Goreng **
1x 22.000 22.000
Total 22.000";
        let receipt = extract_receipt(text);
        assert_eq!(receipt.line_items.len(), 1);
        assert_eq!(receipt.line_items[0].name, "Ayam Goreng");
    }

    #[test]
    fn extraction_is_idempotent_over_raw_text() {
        let first = extract_receipt(SAMPLE);
        let second = extract_receipt(&first.raw_text);
        assert_eq!(first, second);
    }
}
