//! Reports written from real audit results

use crate::support::{test_config, FixedResources, PageHtml, ScriptedRenderer};
use seo_lens::audit::{AuditResult, Auditor};
use seo_lens::config::ReportFormat;
use seo_lens::report::{write_report, ReportOptions};
use std::sync::Arc;
use tempfile::TempDir;

const ROOT: &str = "https://acme.test/";

async fn two_page_audit() -> AuditResult {
    let renderer = Arc::new(
        ScriptedRenderer::new()
            .page(
                ROOT,
                PageHtml::new("Acme anvils and rockets")
                    .links(&["/about", "/missing"])
                    .render(),
            )
            .page(
                "https://acme.test/about",
                PageHtml::new("About the Acme company").words(60).render(),
            )
            .status("https://acme.test/missing", 404),
    );
    Auditor::new(
        test_config(),
        renderer,
        Arc::new(FixedResources::healthy(ROOT)),
    )
    .run(ROOT)
    .await
    .unwrap()
}

#[tokio::test]
async fn test_markdown_report_from_audit() {
    let result = two_page_audit().await;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("seo-report.md");

    write_report(&result, &ReportOptions::default(), &path).unwrap();

    let md = std::fs::read_to_string(&path).unwrap();
    assert!(md.starts_with("# SEO Report: acme.test\n"));
    assert!(md.contains("## Category Scores"));
    assert!(md.contains("## Failed Pages"));
    assert!(md.contains("https://acme.test/missing"));
    assert!(md.contains("broken-internal-link"));
    assert!(md.contains("thin-content"));
    assert!(md.contains("### https://acme.test/about"));
}

#[tokio::test]
async fn test_json_report_from_audit() {
    let result = two_page_audit().await;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("seo-report.json");
    let options = ReportOptions {
        format: ReportFormat::Json,
        include_per_page_detail: false,
    };

    write_report(&result, &options, &path).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["site_score"], result.site_score);
    assert_eq!(value["crawl_stats"]["pages_visited"], 2);
    assert_eq!(value["crawl_stats"]["pages_failed"], 1);
    assert_eq!(value["failures"][0]["status_code"], 404);
    assert_eq!(
        value["prioritized_findings"].as_array().unwrap().len(),
        result.prioritized_findings.len()
    );
    assert!(value.get("pages").is_none());
}
