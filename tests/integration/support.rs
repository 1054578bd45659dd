//! Shared fixtures: an in-memory renderer, fixed static resources and an HTML page builder

use async_trait::async_trait;
use seo_lens::config::Config;
use seo_lens::render::{PageRenderer, RenderError, RenderOptions, RenderTimings, RenderedPage};
use seo_lens::resources::{StaticResourceFetcher, StaticResources};
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

/// Renderer serving scripted responses; unknown URLs fail with a network error
#[derive(Default)]
pub struct ScriptedRenderer {
    pages: HashMap<String, Result<RenderedPage, RenderError>>,
    rendered: Mutex<Vec<String>>,
    scripts: Mutex<Vec<Option<String>>>,
}

impl ScriptedRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, html: impl Into<String>) -> Self {
        self.respond(url, url, 200, html.into(), 400)
    }

    pub fn slow_page(self, url: &str, html: impl Into<String>, total_ms: u64) -> Self {
        self.respond(url, url, 200, html.into(), total_ms)
    }

    pub fn redirect(self, url: &str, target: &str, html: impl Into<String>) -> Self {
        self.respond(url, target, 200, html.into(), 400)
    }

    pub fn status(self, url: &str, status: u16) -> Self {
        self.respond(url, url, status, "<html><body><h1>Error</h1></body></html>".into(), 50)
    }

    pub fn non_html(mut self, url: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            Err(RenderError::NonHtml {
                url: url.to_string(),
                content_type: "application/pdf".to_string(),
            }),
        );
        self
    }

    fn respond(
        mut self,
        url: &str,
        final_url: &str,
        status: u16,
        html: String,
        total_ms: u64,
    ) -> Self {
        let page = RenderedPage {
            final_url: Url::parse(final_url).expect("scripted URL"),
            status_code: status,
            content_type: Some("text/html; charset=utf-8".to_string()),
            dom_snapshot: html,
            timings: RenderTimings {
                total_ms,
                dom_content_loaded_ms: Some(total_ms / 2),
                load_event_ms: Some(total_ms),
            },
        };
        self.pages.insert(url.to_string(), Ok(page));
        self
    }

    /// URLs passed to `render`, in call order
    pub fn rendered(&self) -> Vec<String> {
        self.rendered.lock().unwrap().clone()
    }

    /// Interaction scripts received, in call order
    pub fn scripts(&self) -> Vec<Option<String>> {
        self.scripts.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageRenderer for ScriptedRenderer {
    async fn render(&self, url: &Url, options: &RenderOptions) -> Result<RenderedPage, RenderError> {
        self.rendered.lock().unwrap().push(url.to_string());
        self.scripts
            .lock()
            .unwrap()
            .push(options.interaction_script.clone());

        self.pages.get(url.as_str()).cloned().unwrap_or_else(|| {
            Err(RenderError::Network {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            })
        })
    }
}

/// Fetcher returning the same resources for any site
pub struct FixedResources(pub StaticResources);

impl FixedResources {
    /// robots.txt allowing everything, a sitemap listing the root, and llms.txt
    pub fn healthy(root: &str) -> Self {
        Self(StaticResources {
            robots_txt: Some("User-agent: *\nAllow: /\n".to_string()),
            sitemap_xml: Some(format!(
                "<urlset><url><loc>{}</loc></url></urlset>",
                root
            )),
            llms_txt: Some("# Acme\n> Tools for roadrunner hunting\n".to_string()),
        })
    }
}

#[async_trait]
impl StaticResourceFetcher for FixedResources {
    async fn fetch(&self, _root: &Url) -> StaticResources {
        self.0.clone()
    }
}

/// Default configuration with a short retry backoff
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.crawler.retry_backoff_ms = 5;
    config.crawler.settle_ms = 0;
    config
}

/// Builder for test pages; the defaults pass every per-page technical check
pub struct PageHtml {
    pub title: Option<String>,
    pub description: Option<String>,
    pub canonical: Option<String>,
    pub h1: Vec<String>,
    pub words: usize,
    pub links: Vec<String>,
    pub json_ld: Option<String>,
}

impl PageHtml {
    pub fn new(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            description: Some(
                "Acme sells anvils, rockets and other tools for patient desert hunters everywhere."
                    .to_string(),
            ),
            canonical: None,
            h1: vec![title.to_string()],
            words: 300,
            links: Vec::new(),
            json_ld: Some(
                r#"{"@context":"https://schema.org","@type":"Organization","name":"Acme"}"#
                    .to_string(),
            ),
        }
    }

    pub fn canonical(mut self, url: &str) -> Self {
        self.canonical = Some(url.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn words(mut self, words: usize) -> Self {
        self.words = words;
        self
    }

    pub fn links(mut self, links: &[&str]) -> Self {
        self.links = links.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn render(&self) -> String {
        let mut head = String::new();
        if let Some(title) = &self.title {
            head.push_str(&format!("<title>{}</title>", title));
        }
        if let Some(description) = &self.description {
            head.push_str(&format!(
                r#"<meta name="description" content="{}">"#,
                description
            ));
        }
        head.push_str(r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#);
        if let Some(canonical) = &self.canonical {
            head.push_str(&format!(r#"<link rel="canonical" href="{}">"#, canonical));
        }
        head.push_str(r#"<meta property="og:title" content="Acme">"#);
        if let Some(json_ld) = &self.json_ld {
            head.push_str(&format!(
                r#"<script type="application/ld+json">{}</script>"#,
                json_ld
            ));
        }

        let mut body = String::new();
        for h1 in &self.h1 {
            body.push_str(&format!("<h1>{}</h1>", h1));
        }
        let text: Vec<String> = (0..self.words).map(|i| format!("word{}", i)).collect();
        body.push_str(&format!("<p>{}</p>", text.join(" ")));
        body.push_str("<nav>");
        for link in &self.links {
            body.push_str(&format!(r#"<a href="{}">go</a> "#, link));
        }
        body.push_str("</nav>");

        format!(
            r#"<!DOCTYPE html><html lang="en"><head>{}</head><body>{}</body></html>"#,
            head, body
        )
    }
}
