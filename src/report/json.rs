use super::{ReportOptions, ReportResult, ReportWriter};
use crate::audit::AuditResult;

/// Pretty-printed JSON of the whole result
///
/// Without per-page detail, `pages` and `page_scores` are left out.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportWriter;

impl ReportWriter for JsonReportWriter {
    fn write(&self, result: &AuditResult, options: &ReportOptions) -> ReportResult<String> {
        let mut value = serde_json::to_value(result)?;

        if !options.include_per_page_detail {
            if let Some(object) = value.as_object_mut() {
                object.remove("pages");
                object.remove("page_scores");
            }
        }

        let mut document = serde_json::to_string_pretty(&value)?;
        document.push('\n');
        Ok(document)
    }
}
