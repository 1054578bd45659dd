//! Image rules

use super::{EvaluationContext, Finding, RuleId};
use crate::extract::PageRecord;

pub fn evaluate_page(page: &PageRecord, ctx: &EvaluationContext<'_>) -> Vec<Finding> {
    if page.images.is_empty() {
        return Vec::new();
    }

    let missing = page.images.iter().filter(|image| !image.has_alt).count();
    let ratio = missing as f64 / page.images.len() as f64;
    if ratio <= ctx.thresholds.max_missing_alt_ratio {
        return Vec::new();
    }

    vec![Finding::new(
        RuleId::ImagesMissingAlt,
        page.url(),
        format!(
            "{} of {} images have no ALT text",
            missing,
            page.images.len()
        ),
    )]
}
