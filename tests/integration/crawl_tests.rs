//! Crawl coverage through the full audit: page cap, redirects, failures and sitemap discovery

use crate::support::{test_config, FixedResources, PageHtml, ScriptedRenderer};
use seo_lens::audit::Auditor;
use seo_lens::evaluate::RuleId;
use seo_lens::resources::{build_http_client, HttpResourceFetcher, NoResources};
use seo_lens::AuditError;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ROOT: &str = "https://acme.test/";

#[tokio::test]
async fn test_page_cap_counts_skipped_links() {
    let links: Vec<String> = (1..=9)
        .map(|i| format!("https://acme.test/p{}", i))
        .chain(std::iter::once(ROOT.to_string()))
        .collect();
    let links: Vec<&str> = links.iter().map(String::as_str).collect();
    let renderer = Arc::new(ScriptedRenderer::new().page(
        ROOT,
        PageHtml::new("Acme anvils and rockets")
            .links(&links)
            .render(),
    ));

    let mut config = test_config();
    config.crawler.max_pages = 1;
    let auditor = Auditor::new(
        config,
        renderer.clone(),
        Arc::new(FixedResources::healthy(ROOT)),
    );

    let result = auditor.run(ROOT).await.unwrap();

    assert_eq!(result.crawl_stats.pages_visited, 1);
    assert_eq!(result.crawl_stats.pages_skipped, 9);
    assert!(result.crawl_stats.max_pages_reached);
    assert!(result.is_partial());
    assert_eq!(renderer.rendered(), vec![ROOT.to_string()]);
}

#[tokio::test]
async fn test_links_are_crawled_breadth_first() {
    let renderer = Arc::new(
        ScriptedRenderer::new()
            .page(
                ROOT,
                PageHtml::new("Acme anvils and rockets")
                    .links(&["/about", "/shop"])
                    .render(),
            )
            .page(
                "https://acme.test/about",
                PageHtml::new("About the Acme company")
                    .links(&["/about/team"])
                    .render(),
            )
            .page(
                "https://acme.test/shop",
                PageHtml::new("Shop for Acme products").render(),
            )
            .page(
                "https://acme.test/about/team",
                PageHtml::new("The Acme product team").render(),
            ),
    );

    let mut config = test_config();
    config.crawler.max_concurrent_renders = 1;
    let auditor = Auditor::new(config, renderer, Arc::new(FixedResources::healthy(ROOT)));

    let result = auditor.run(ROOT).await.unwrap();

    let urls: Vec<&str> = result.pages.iter().map(|p| p.url()).collect();
    assert_eq!(
        urls,
        vec![
            "https://acme.test/",
            "https://acme.test/about",
            "https://acme.test/shop",
            "https://acme.test/about/team",
        ]
    );
    assert_eq!(result.crawl_stats.pages_visited, 4);
    assert!(!result.is_partial());
}

#[tokio::test]
async fn test_seed_http_error_aborts_audit() {
    let renderer = Arc::new(ScriptedRenderer::new().status(ROOT, 500));
    let auditor = Auditor::new(
        test_config(),
        renderer,
        Arc::new(FixedResources::healthy(ROOT)),
    );

    match auditor.run(ROOT).await {
        Err(AuditError::CrawlAborted { url, reason }) => {
            assert_eq!(url, ROOT);
            assert_eq!(reason, "HTTP 500");
        }
        other => panic!("expected CrawlAborted, got {:?}", other.map(|r| r.site_score)),
    }
}

#[tokio::test]
async fn test_non_html_seed_aborts_audit() {
    let renderer = Arc::new(ScriptedRenderer::new().non_html(ROOT));
    let auditor = Auditor::new(test_config(), renderer.clone(), Arc::new(NoResources));

    let result = auditor.run(ROOT).await;

    assert!(matches!(result, Err(AuditError::CrawlAborted { .. })));
    // Not a transient failure, so no retry
    assert_eq!(renderer.rendered().len(), 1);
}

#[tokio::test]
async fn test_unreachable_page_is_retried_then_failed() {
    let renderer = Arc::new(ScriptedRenderer::new().page(
        ROOT,
        PageHtml::new("Acme anvils and rockets")
            .links(&["/gone"])
            .render(),
    ));
    let auditor = Auditor::new(
        test_config(),
        renderer.clone(),
        Arc::new(FixedResources::healthy(ROOT)),
    );

    let result = auditor.run(ROOT).await.unwrap();

    let gone_calls = renderer
        .rendered()
        .iter()
        .filter(|url| url.as_str() == "https://acme.test/gone")
        .count();
    assert_eq!(gone_calls, 2);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].url, "https://acme.test/gone");
    assert_eq!(result.failures[0].status_code, None);
    assert_eq!(result.crawl_stats.pages_failed, 1);

    // A network failure carries no status, so it is not a broken link
    assert!(result
        .prioritized_findings
        .iter()
        .all(|f| f.rule_id != RuleId::BrokenInternalLink));
}

#[tokio::test]
async fn test_http_404_reported_as_broken_link() {
    let renderer = Arc::new(
        ScriptedRenderer::new()
            .page(
                ROOT,
                PageHtml::new("Acme anvils and rockets")
                    .links(&["/old-page"])
                    .render(),
            )
            .status("https://acme.test/old-page", 404),
    );
    let auditor = Auditor::new(
        test_config(),
        renderer.clone(),
        Arc::new(FixedResources::healthy(ROOT)),
    );

    let result = auditor.run(ROOT).await.unwrap();

    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].reason, "HTTP 404");
    assert_eq!(result.failures[0].status_code, Some(404));

    let broken: Vec<_> = result
        .prioritized_findings
        .iter()
        .filter(|f| f.rule_id == RuleId::BrokenInternalLink)
        .collect();
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].affected_url, ROOT);
    assert_eq!(broken[0].related_urls, vec!["https://acme.test/old-page"]);
    assert_eq!(renderer.rendered().len(), 2);
}

#[tokio::test]
async fn test_seed_redirect_moves_crawl_root() {
    let renderer = Arc::new(
        ScriptedRenderer::new()
            .redirect(
                "https://acme.test/",
                "https://www.acme.test/",
                PageHtml::new("Acme anvils and rockets")
                    .links(&["https://www.acme.test/about", "https://acme.test/legacy"])
                    .render(),
            )
            .page(
                "https://www.acme.test/about",
                PageHtml::new("About the Acme company").render(),
            ),
    );
    let auditor = Auditor::new(test_config(), renderer.clone(), Arc::new(NoResources));

    let result = auditor.run(ROOT).await.unwrap();

    assert_eq!(result.seed_url, "https://acme.test/");
    assert_eq!(result.root_url, "https://www.acme.test/");
    let urls: Vec<&str> = result.pages.iter().map(|p| p.url()).collect();
    assert_eq!(urls, vec!["https://www.acme.test/", "https://www.acme.test/about"]);
    // The old host is now off-site
    assert!(!renderer
        .rendered()
        .contains(&"https://acme.test/legacy".to_string()));
}

#[tokio::test]
async fn test_cookie_banner_script_reaches_renderer() {
    let renderer = Arc::new(
        ScriptedRenderer::new().page(ROOT, PageHtml::new("Acme anvils and rockets").render()),
    );
    let mut config = test_config();
    config.crawler.cookie_accept_text = Some("Accept all".to_string());
    let auditor = Auditor::new(config, renderer.clone(), Arc::new(FixedResources::healthy(ROOT)));

    auditor.run(ROOT).await.unwrap();

    let scripts = renderer.scripts();
    assert_eq!(scripts.len(), 1);
    let script = scripts[0].as_deref().unwrap();
    assert!(script.starts_with("const needle = \"accept all\";"));
}

#[tokio::test]
async fn test_no_script_without_cookie_text() {
    let renderer = Arc::new(
        ScriptedRenderer::new().page(ROOT, PageHtml::new("Acme anvils and rockets").render()),
    );
    let auditor = Auditor::new(
        test_config(),
        renderer.clone(),
        Arc::new(FixedResources::healthy(ROOT)),
    );

    auditor.run(ROOT).await.unwrap();

    assert_eq!(renderer.scripts(), vec![None]);
}

#[tokio::test]
async fn test_static_resources_over_http() {
    let mock_server = MockServer::start().await;
    let base = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /\n"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<?xml version=\"1.0\"?><urlset><url><loc>{}pricing</loc></url></urlset>",
            base
        )))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/llms.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let pricing = format!("{}pricing", base);
    let renderer = Arc::new(
        ScriptedRenderer::new()
            .page(&base, PageHtml::new("Acme anvils and rockets").render())
            .page(&pricing, PageHtml::new("Acme pricing and plans").render()),
    );
    let client = build_http_client("SeoLensTest/1.0", Duration::from_secs(5)).unwrap();
    let auditor = Auditor::new(
        test_config(),
        renderer.clone(),
        Arc::new(HttpResourceFetcher::new(client)),
    );

    let result = auditor.run(&base).await.unwrap();

    assert!(result.resources.robots_txt);
    assert!(result.resources.robots_blocks_root);
    assert_eq!(result.resources.sitemap_url_count, 1);
    assert!(!result.resources.llms_txt);

    // Discovered only through the sitemap
    assert_eq!(renderer.rendered(), vec![base.clone(), pricing.clone()]);

    let rules: Vec<RuleId> = result
        .prioritized_findings
        .iter()
        .map(|f| f.rule_id)
        .collect();
    assert!(rules.contains(&RuleId::RobotsTxtBlocksSite));
    assert!(rules.contains(&RuleId::MissingLlmsTxt));
    assert!(!rules.contains(&RuleId::MissingSitemap));
    assert!(result
        .prioritized_findings
        .iter()
        .any(|f| f.rule_id == RuleId::OrphanPage && f.affected_url == pricing));
}
