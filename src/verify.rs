//! Matching a freshly extracted payment proof against a recorded order.
//!
//! The adopted policy is price-only: a proof whose amount lands within 1% of
//! the order price verifies the order, anything else is a mismatch. The
//! day-level date predicate is exported separately so a stricter policy can
//! be composed on top without touching the matcher.

use crate::models::{Order, ParsedProof, VerificationStatus};

pub use crate::parse::same_calendar_day;

/// Relative tolerance applied to the order price. OCR routinely drops or
/// garbles a trailing digit; 1% absorbs that without accepting a different
/// payment.
pub const PRICE_TOLERANCE: f64 = 0.01;

/// True when `paid` is within the tolerance band around `order_price`.
pub fn price_matches(order_price: f64, paid: f64) -> bool {
    (order_price - paid).abs() <= PRICE_TOLERANCE * order_price
}

/// Decide whether `proof` corroborates `order`.
pub fn verify_payment(order: &Order, proof: &ParsedProof) -> VerificationStatus {
    let status = if price_matches(order.price, proof.total_payment) {
        VerificationStatus::Verified
    } else {
        VerificationStatus::Mismatch
    };
    tracing::debug!(
        order = %order.order_number,
        expected = order.price,
        paid = proof.total_payment,
        ?status,
        "proof matched against order"
    );
    status
}
