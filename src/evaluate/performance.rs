//! Render time rules

use super::{EvaluationContext, Finding, RuleId};
use crate::extract::PageRecord;

pub fn evaluate_page(page: &PageRecord, ctx: &EvaluationContext<'_>) -> Vec<Finding> {
    let thresholds = ctx.thresholds;
    let ms = page.render_timing_ms;

    let rule = if ms >= thresholds.critical_render_ms {
        RuleId::CriticalRenderTime
    } else if ms >= thresholds.very_slow_render_ms {
        RuleId::VerySlowRender
    } else if ms >= thresholds.slow_render_ms {
        RuleId::SlowRender
    } else {
        return Vec::new();
    };

    let mut message = format!("Page took {} ms to render", ms);
    if let Some(dcl) = page.dom_content_loaded_ms {
        message.push_str(&format!(" (DOMContentLoaded at {} ms)", dcl));
    }

    vec![Finding::new(rule, page.url(), message)]
}
