use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized rectangle describing where a text fragment sits in the image.
/// `y` is measured downward from the top edge.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Vertical center, used to group fragments into visual rows.
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// One OCR-recognized span of text with its position in the source image.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub text: String,
    pub bounding_box: BoundingBox,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, bounding_box: BoundingBox) -> Self {
        Self { text: text.into(), bounding_box }
    }
}

/// A single purchased item on a receipt.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LineItem {
    pub name: String,
    pub price: f64,
}

impl LineItem {
    /// Prices come from regexes that cannot produce a sign, so a negative
    /// value here is always a caller bug; clamp to keep the invariant.
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self { name: name.into(), price: price.max(0.0) }
    }
}

/// Structured fields recovered from a receipt image. Every field defaults to
/// empty/zero/absent when the text gives no usable signal; the caller is
/// expected to let a human complete or correct the record.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ParsedReceipt {
    pub restaurant_name: String,
    pub order_number: String,
    pub date_time: Option<NaiveDateTime>,
    pub line_items: Vec<LineItem>,
    pub total_price: f64,
    pub payment_method: String,
    pub raw_text: String,
}

impl ParsedReceipt {
    /// Sum of the extracted line items. May differ from `total_price`; both
    /// are kept and no reconciliation is forced.
    pub fn calculated_total(&self) -> f64 {
        self.line_items.iter().map(|item| item.price).sum()
    }
}

/// Structured fields recovered from a payment-proof image (bank transfer
/// screenshot, e-wallet confirmation, and the like).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ParsedProof {
    pub date_time: Option<NaiveDateTime>,
    pub total_payment: f64,
    pub bank_name: Option<String>,
    pub raw_text: String,
}

/// Lifecycle state of an order with respect to payment verification.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Verified,
    Mismatch,
}

/// A previously recorded order. Owned by the caller's store; the matcher only
/// reads `price`/`date_time` and produces a new `verification_status`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Order {
    pub order_number: String,
    pub date_time: Option<NaiveDateTime>,
    pub price: f64,
    pub line_items: Vec<LineItem>,
    pub verification_status: VerificationStatus,
    pub created_at: DateTime<Utc>,
}

/// List filter over orders by verification state.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderFilter {
    All,
    Verified,
    Pending,
}

impl OrderFilter {
    pub fn matches(&self, status: VerificationStatus) -> bool {
        match self {
            OrderFilter::All => true,
            OrderFilter::Verified => status == VerificationStatus::Verified,
            OrderFilter::Pending => status == VerificationStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_item_clamps_negative_price() {
        let item = LineItem::new("Nasi Putih", -4000.0);
        assert_eq!(item.price, 0.0);
    }

    #[test]
    fn calculated_total_sums_items() {
        let receipt = ParsedReceipt {
            line_items: vec![
                LineItem::new("Ayam Bakar", 38000.0),
                LineItem::new("Es Teh", 5000.0),
            ],
            ..Default::default()
        };
        assert_eq!(receipt.calculated_total(), 43000.0);
    }

    #[test]
    fn verification_status_serializes_lowercase() {
        let json = serde_json::to_string(&VerificationStatus::Mismatch).unwrap();
        assert_eq!(json, "\"mismatch\"");
    }

    #[test]
    fn filter_matches_statuses() {
        assert!(OrderFilter::All.matches(VerificationStatus::Mismatch));
        assert!(OrderFilter::Verified.matches(VerificationStatus::Verified));
        assert!(!OrderFilter::Pending.matches(VerificationStatus::Verified));
    }
}
