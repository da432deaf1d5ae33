//! Reading-order reconstruction for unordered OCR fragments.
//!
//! OCR engines report spans in arbitrary order. Spans that sit on the same
//! visual line rarely share identical y-coordinates, so rows are formed with
//! a tolerance band derived from the average fragment height rather than by
//! exact equality.

use crate::models::TextFragment;

// Floor for the row tolerance so zero-height fragments cannot collapse it.
const MIN_TOLERANCE: f32 = 1e-6;

/// Linearize `fragments` into top-to-bottom, left-to-right text.
///
/// Rows are joined with newlines, fragments within a row with single spaces.
/// An empty input yields an empty string.
pub fn reconstruct(fragments: &[TextFragment]) -> String {
    if fragments.is_empty() {
        return String::new();
    }

    let avg_height: f32 = fragments
        .iter()
        .map(|f| f.bounding_box.height)
        .sum::<f32>()
        / fragments.len() as f32;
    let tolerance = (avg_height * 0.5).max(MIN_TOLERANCE);

    let mut sorted: Vec<&TextFragment> = fragments.iter().collect();
    sorted.sort_by(|a, b| a.bounding_box.center_y().total_cmp(&b.bounding_box.center_y()));

    // Greedy partition: a fragment joins the current row if its vertical
    // center is within tolerance of the previous fragment's center.
    let mut rows: Vec<Vec<&TextFragment>> = Vec::new();
    let mut current: Vec<&TextFragment> = Vec::new();
    let mut last_center: Option<f32> = None;

    for fragment in sorted {
        let center = fragment.bounding_box.center_y();
        match last_center {
            Some(prev) if (center - prev).abs() > tolerance => {
                rows.push(std::mem::take(&mut current));
                current.push(fragment);
            }
            _ => current.push(fragment),
        }
        last_center = Some(center);
    }
    if !current.is_empty() {
        rows.push(current);
    }

    for row in &mut rows {
        row.sort_by(|a, b| a.bounding_box.x.total_cmp(&b.bounding_box.x));
    }

    rows.iter()
        .map(|row| {
            row.iter()
                .map(|f| f.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
