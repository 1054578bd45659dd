//! Scoring behavior of complete audits

use crate::support::{test_config, FixedResources, PageHtml, ScriptedRenderer};
use seo_lens::audit::Auditor;
use seo_lens::config::load_config;
use seo_lens::evaluate::{Category, RuleId, Severity};
use seo_lens::resources::NoResources;
use seo_lens::score::Grade;
use seo_lens::AuditError;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const ROOT: &str = "https://acme.test/";

fn healthy() -> Arc<FixedResources> {
    Arc::new(FixedResources::healthy(ROOT))
}

#[tokio::test]
async fn test_single_page_missing_canonical() {
    let renderer = Arc::new(
        ScriptedRenderer::new().page(ROOT, PageHtml::new("Home").words(500).render()),
    );
    let auditor = Auditor::new(test_config(), renderer, healthy());

    let result = auditor.run(ROOT).await.unwrap();

    let technical: Vec<RuleId> = result
        .prioritized_findings
        .iter()
        .filter(|f| f.category == Category::Technical)
        .map(|f| f.rule_id)
        .collect();
    assert_eq!(technical, vec![RuleId::MissingCanonical]);
    assert_eq!(result.category_scores[&Category::Technical], 95);
    assert_eq!(result.pages.len(), 1);
    assert!(result.pages[0].word_count >= 500);
}

#[tokio::test]
async fn test_duplicate_title_reported_once() {
    let renderer = Arc::new(
        ScriptedRenderer::new()
            .page(
                ROOT,
                PageHtml::new("Acme anvils and rockets")
                    .canonical(ROOT)
                    .links(&["/about"])
                    .render(),
            )
            .page(
                "https://acme.test/about",
                PageHtml::new("Acme anvils and rockets")
                    .canonical("https://acme.test/about")
                    .description(
                        "Who we are: the people behind Acme anvils, rockets and giant desert magnets.",
                    )
                    .links(&["/"])
                    .render(),
            ),
    );
    let auditor = Auditor::new(test_config(), renderer, healthy());

    let result = auditor.run(ROOT).await.unwrap();

    let duplicates: Vec<_> = result
        .prioritized_findings
        .iter()
        .filter(|f| f.rule_id == RuleId::DuplicateTitle)
        .collect();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].severity, Severity::Warning);
    assert_eq!(
        duplicates[0].related_urls,
        vec!["https://acme.test/", "https://acme.test/about"]
    );
    assert_eq!(result.category_scores[&Category::Technical], 95);
}

#[tokio::test]
async fn test_invalid_weights_fail_before_rendering() {
    let renderer = Arc::new(
        ScriptedRenderer::new().page(ROOT, PageHtml::new("Acme anvils and rockets").render()),
    );
    let mut config = test_config();
    config.weights.technical = 0.9;
    let auditor = Auditor::new(config, renderer.clone(), healthy());

    let result = auditor.run(ROOT).await;

    assert!(matches!(result, Err(AuditError::Weights(_))));
    assert!(renderer.rendered().is_empty());
}

#[tokio::test]
async fn test_findings_are_prioritized_by_severity() {
    let renderer = Arc::new(ScriptedRenderer::new().slow_page(
        ROOT,
        PageHtml::new("Home").words(40).render(),
        4_500,
    ));
    let auditor = Auditor::new(test_config(), renderer, Arc::new(NoResources));

    let result = auditor.run(ROOT).await.unwrap();

    let severities: Vec<Severity> = result
        .prioritized_findings
        .iter()
        .map(|f| f.severity)
        .collect();
    let mut sorted = severities.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(severities, sorted);

    let rules: Vec<RuleId> = result
        .prioritized_findings
        .iter()
        .map(|f| f.rule_id)
        .collect();
    assert!(rules.contains(&RuleId::VerySlowRender));
    assert!(rules.contains(&RuleId::ThinContent));
    assert!(rules.contains(&RuleId::MissingRobotsTxt));
    assert!(rules.contains(&RuleId::MissingSitemap));
    assert!(result.category_scores[&Category::Performance] < 100);
}

#[tokio::test]
async fn test_page_scores_cover_every_visited_page() {
    let renderer = Arc::new(
        ScriptedRenderer::new()
            .page(
                ROOT,
                PageHtml::new("Acme anvils and rockets")
                    .canonical(ROOT)
                    .links(&["/about"])
                    .render(),
            )
            .page(
                "https://acme.test/about",
                PageHtml::new("About the Acme company").words(20).render(),
            ),
    );
    let auditor = Auditor::new(test_config(), renderer, healthy());

    let result = auditor.run(ROOT).await.unwrap();

    assert_eq!(result.page_scores.len(), 2);
    let home = result.page_scores["https://acme.test/"];
    let about = result.page_scores["https://acme.test/about"];
    assert!(about < home, "thin page {} should score below home {}", about, home);
    assert!(result.site_score <= 100);
    assert_eq!(result.grade, Grade::from_score(result.site_score));
}

#[tokio::test]
async fn test_site_findings_do_not_lower_home_page_score() {
    let audit = |resources: bool| async move {
        let renderer = Arc::new(
            ScriptedRenderer::new().page(
                ROOT,
                PageHtml::new("Acme anvils and rockets")
                    .canonical(ROOT)
                    .words(500)
                    .render(),
            ),
        );
        let auditor = if resources {
            Auditor::new(test_config(), renderer, healthy())
        } else {
            Auditor::new(test_config(), renderer, Arc::new(NoResources))
        };
        auditor.run(ROOT).await.unwrap()
    };

    let with_files = audit(true).await;
    let without_files = audit(false).await;

    // Missing robots.txt, sitemap and llms.txt only move the site score
    assert!(without_files.site_score < with_files.site_score);
    assert!(without_files.prioritized_findings.len() > with_files.prioritized_findings.len());
    assert_eq!(
        without_files.page_scores["https://acme.test/"],
        with_files.page_scores["https://acme.test/"]
    );
}

#[tokio::test]
async fn test_audit_is_deterministic() {
    let build = || {
        Arc::new(
            ScriptedRenderer::new()
                .page(
                    ROOT,
                    PageHtml::new("Acme anvils and rockets")
                        .links(&["/a", "/b", "/c"])
                        .render(),
                )
                .page("https://acme.test/a", PageHtml::new("Page A of Acme").render())
                .page("https://acme.test/b", PageHtml::new("Page A of Acme").render())
                .status("https://acme.test/c", 410),
        )
    };
    let mut config = test_config();
    config.crawler.max_concurrent_renders = 3;

    let first = Auditor::new(config.clone(), build(), healthy())
        .run(ROOT)
        .await
        .unwrap();
    let second = Auditor::new(config, build(), healthy())
        .run(ROOT)
        .await
        .unwrap();

    assert_eq!(first.prioritized_findings, second.prioritized_findings);
    assert_eq!(first.category_scores, second.category_scores);
    assert_eq!(first.site_score, second.site_score);
    assert_eq!(first.page_scores, second.page_scores);
    let first_urls: Vec<&str> = first.pages.iter().map(|p| p.url()).collect();
    let second_urls: Vec<&str> = second.pages.iter().map(|p| p.url()).collect();
    assert_eq!(first_urls, second_urls);
}

#[tokio::test]
async fn test_audit_with_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[crawler]
max-pages = 1
retry-backoff-ms = 5
settle-ms = 0

[weights]
technical = 1.0
"#
    )
    .unwrap();
    let config = load_config(file.path()).unwrap();

    let renderer = Arc::new(ScriptedRenderer::new().page(
        ROOT,
        PageHtml::new("Home")
            .links(&["/about", "/shop"])
            .render(),
    ));
    let auditor = Auditor::new(config, renderer, healthy()).with_config_hash("cafe");

    let result = auditor.run(ROOT).await.unwrap();

    // All of the weight is on technical, which only loses the canonical
    assert_eq!(result.site_score, 95);
    assert_eq!(result.grade, Grade::A);
    assert_eq!(result.crawl_stats.pages_skipped, 2);
    assert_eq!(result.config_hash.as_deref(), Some("cafe"));
}
