//! End-to-end flow: unordered OCR fragments in, verified order out.

use anyhow::anyhow;
use chrono::Utc;
use nota::{
    extract_proof, run_receipt_batch, verify_payment, BoundingBox, OcrOutput, OcrSource, Order,
    ParsedReceipt, TextFragment, VerificationStatus,
};

struct ScriptedOcr {
    fragments: Vec<TextFragment>,
    fail: bool,
}

impl OcrSource for ScriptedOcr {
    fn recognize(&self, _image: &[u8]) -> anyhow::Result<OcrOutput> {
        if self.fail {
            return Err(anyhow!("camera feed dropped"));
        }
        Ok(OcrOutput::Fragments(self.fragments.clone()))
    }
}

fn fragment(text: &str, x: f32, center_y: f32) -> TextFragment {
    let height = 0.04;
    TextFragment::new(text, BoundingBox::new(x, center_y - height / 2.0, 0.3, height))
}

/// The Mama Djempol receipt as the OCR engine actually reports it: spans in
/// arbitrary order, same-row spans at slightly different heights.
fn receipt_fragments() -> Vec<TextFragment> {
    let rows: &[&[(&str, f32)]] = &[
        &[("Mama Djempol", 0.05), ("Binong", 0.55)],
        &[("Date : 17/03/2025 13:27", 0.05)],
        &[("Order Number : POS-170325-99", 0.05)],
        &[("** REPRINT BILL **", 0.20)],
        &[("Daging Sapi lada", 0.05)],
        &[("Hitam", 0.05)],
        &[("1x 16.000", 0.05), ("16.000", 0.60)],
        &[("Kentang Mustopa", 0.05)],
        &[("1x 5.000", 0.05), ("5.000", 0.60)],
        &[("Nasi Putih", 0.05)],
        &[("1x 4.000", 0.05), ("4.000", 0.60)],
        &[("Total Item 3", 0.05)],
        &[("Total", 0.05), ("25.000", 0.60)],
        &[("Tender", 0.05)],
        &[("Qris Mandiri", 0.05), ("25.000", 0.60)],
        &[("Change", 0.05), ("0", 0.60)],
    ];

    let mut fragments = Vec::new();
    for (row_index, row) in rows.iter().enumerate() {
        let base = 0.05 + row_index as f32 * 0.05;
        for (column, (text, x)) in row.iter().enumerate() {
            // Jitter well inside the half-height tolerance band.
            let center = base + column as f32 * 0.008;
            fragments.push(fragment(text, *x, center));
        }
    }
    // Arbitrary arrival order.
    fragments.reverse();
    fragments.swap(0, 7);
    fragments.swap(3, 11);
    fragments
}

fn order_from_receipt(receipt: &ParsedReceipt) -> Order {
    Order {
        order_number: receipt.order_number.clone(),
        date_time: receipt.date_time,
        price: receipt.total_price,
        line_items: receipt.line_items.clone(),
        verification_status: VerificationStatus::Pending,
        created_at: Utc::now(),
    }
}

#[test]
fn receipt_scan_to_verified_order() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "nota=debug".into()),
        )
        .try_init();

    let ocr = ScriptedOcr { fragments: receipt_fragments(), fail: false };
    let images = [vec![0u8; 4]];
    let mut progress = Vec::new();
    let receipts = run_receipt_batch(&ocr, &images, |index, total| progress.push((index, total)));

    assert_eq!(progress, vec![(0, 1)]);
    assert_eq!(receipts.len(), 1);

    let receipt = &receipts[0];
    assert_eq!(receipt.restaurant_name, "Mama Djempol Binong");
    assert_eq!(receipt.order_number, "POS-170325-99");
    assert_eq!(receipt.total_price, 25000.0);
    assert!(receipt.payment_method.contains("Qris Mandiri"));
    assert_eq!(receipt.line_items.len(), 3);
    assert_eq!(receipt.calculated_total(), 25000.0);

    let order = order_from_receipt(receipt);

    // A matching transfer proof: 25.100 is within the 1% band around 25.000.
    let proof = extract_proof("m-BCA\n17/03/2025 19:02:11\nRp. 25,100.00");
    assert_eq!(proof.bank_name.as_deref(), Some("BCA"));
    assert_eq!(verify_payment(&order, &proof), VerificationStatus::Verified);

    // A proof for some other payment lands outside the band.
    let wrong = extract_proof("m-BCA\n17/03/2025 19:02:11\nRp. 30,000.00");
    assert_eq!(verify_payment(&order, &wrong), VerificationStatus::Mismatch);
}

#[test]
fn ocr_failure_still_yields_a_record_for_manual_entry() {
    let ocr = ScriptedOcr { fragments: Vec::new(), fail: true };
    let receipts = run_receipt_batch(&ocr, &[vec![0u8]], |_, _| {});

    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0], ParsedReceipt { raw_text: String::new(), ..Default::default() });
}

#[test]
fn plain_text_ocr_output_skips_reconstruction() {
    struct PlainOcr;
    impl OcrSource for PlainOcr {
        fn recognize(&self, _image: &[u8]) -> anyhow::Result<OcrOutput> {
            Ok(OcrOutput::Text("Warung Ijo\nTotal 12.000".to_string()))
        }
    }

    let receipts = run_receipt_batch(&PlainOcr, &[vec![0u8]], |_, _| {});
    assert_eq!(receipts[0].restaurant_name, "Warung Ijo");
    assert_eq!(receipts[0].total_price, 12000.0);
}
