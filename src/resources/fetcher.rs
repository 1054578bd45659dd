//! HTTP fetcher for static resources

use super::{ParsedRobots, StaticResourceFetcher, StaticResources};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Builds the HTTP client used for static resources
///
/// # Arguments
///
/// * `user_agent` - User agent string sent with every request
/// * `timeout` - Per-request timeout
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`StaticResourceFetcher`] over plain HTTP
///
/// The sitemap location is taken from the first `Sitemap:` line of robots.txt when there is
/// one, `/sitemap.xml` otherwise.
#[derive(Debug, Clone)]
pub struct HttpResourceFetcher {
    client: Client,
}

impl HttpResourceFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Body of a successful response, None for anything else
    async fn fetch_text(&self, url: &Url) -> Option<String> {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} returned HTTP {}", url, status.as_u16());
            return None;
        }

        match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!("Failed to read body of {}: {}", url, e);
                None
            }
        }
    }
}

#[async_trait]
impl StaticResourceFetcher for HttpResourceFetcher {
    async fn fetch(&self, root: &Url) -> StaticResources {
        let resource = |path: &str| root.join(path).ok();

        let robots_txt = match resource("/robots.txt") {
            Some(url) => self.fetch_text(&url).await,
            None => None,
        };

        let declared_sitemap = robots_txt
            .as_deref()
            .map(ParsedRobots::from_content)
            .and_then(|robots| robots.sitemaps().into_iter().next())
            .and_then(|loc| root.join(&loc).ok());
        let sitemap_xml = match declared_sitemap.or_else(|| resource("/sitemap.xml")) {
            Some(url) => self.fetch_text(&url).await,
            None => None,
        };

        let llms_txt = match resource("/llms.txt") {
            Some(url) => self.fetch_text(&url).await,
            None => None,
        };

        tracing::info!(
            "Static resources for {}: robots.txt={}, sitemap={}, llms.txt={}",
            root,
            robots_txt.is_some(),
            sitemap_xml.is_some(),
            llms_txt.is_some()
        );

        StaticResources {
            robots_txt,
            sitemap_xml,
            llms_txt,
        }
    }
}
