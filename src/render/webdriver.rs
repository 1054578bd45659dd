//! WebDriver renderer built on fantoccini
//!
//! Keeps a small pool of browser sessions, one per concurrent render. A session is created
//! lazily when no idle one is available and is dropped when the browser reports it lost.

use super::{
    is_html_content_type, PageRenderer, RenderError, RenderOptions, RenderTimings, RenderedPage,
};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Semaphore};
use url::Url;

/// Reads status, content type and timings from the Navigation Timing API
const NAVIGATION_SCRIPT: &str = r#"
const nav = (performance.getEntriesByType('navigation') || [])[0] || {};
return {
    status: nav.responseStatus || 0,
    contentType: document.contentType || null,
    domContentLoaded: nav.domContentLoadedEventEnd ? Math.round(nav.domContentLoadedEventEnd) : null,
    loadEvent: nav.loadEventEnd ? Math.round(nav.loadEventEnd) : null
};
"#;

/// Serializes the live DOM, including script-built content
const SNAPSHOT_SCRIPT: &str =
    "return document.documentElement ? document.documentElement.outerHTML : '';";

/// [`PageRenderer`] driving a real browser through a WebDriver endpoint
pub struct WebDriverRenderer {
    webdriver_url: String,
    user_agent: String,
    sessions: Semaphore,
    idle: Mutex<Vec<Client>>,
}

impl WebDriverRenderer {
    /// Creates a renderer; sessions are opened on first use
    ///
    /// # Arguments
    ///
    /// * `webdriver_url` - WebDriver endpoint (e.g. `http://localhost:4444`)
    /// * `user_agent` - User agent the browser announces
    /// * `max_sessions` - Maximum number of concurrent browser sessions
    pub fn new(
        webdriver_url: impl Into<String>,
        user_agent: impl Into<String>,
        max_sessions: usize,
    ) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            user_agent: user_agent.into(),
            sessions: Semaphore::new(max_sessions.max(1)),
            idle: Mutex::new(Vec::new()),
        }
    }

    fn capabilities(&self) -> serde_json::Map<String, Value> {
        let mut caps = serde_json::Map::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({
                "args": [
                    "--headless=new",
                    "--disable-gpu",
                    "--no-sandbox",
                    "--window-size=1366,900",
                    format!("--user-agent={}", self.user_agent),
                ]
            }),
        );
        caps.insert(
            "moz:firefoxOptions".to_string(),
            json!({
                "args": ["-headless"],
                "prefs": { "general.useragent.override": self.user_agent }
            }),
        );
        caps
    }

    async fn checkout(&self, url: &Url) -> Result<Client, RenderError> {
        if let Some(client) = self.idle.lock().await.pop() {
            return Ok(client);
        }

        tracing::debug!("Opening WebDriver session at {}", self.webdriver_url);
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());
        builder
            .connect(&self.webdriver_url)
            .await
            .map_err(|e| RenderError::Network {
                url: url.to_string(),
                message: format!(
                    "cannot open WebDriver session at {}: {}",
                    self.webdriver_url, e
                ),
            })
    }

    async fn checkin(&self, client: Client) {
        self.idle.lock().await.push(client);
    }

    async fn drive(
        &self,
        client: &Client,
        url: &Url,
        options: &RenderOptions,
    ) -> Result<RenderedPage, RenderError> {
        let network = |e: fantoccini::error::CmdError| RenderError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        let started = Instant::now();
        client.goto(url.as_str()).await.map_err(network)?;

        if let Some(script) = &options.interaction_script {
            if let Err(e) = client.execute(script, Vec::new()).await {
                tracing::debug!("Interaction script failed on {}: {}", url, e);
            }
        }

        if options.settle_ms > 0 {
            tokio::time::sleep(Duration::from_millis(options.settle_ms)).await;
        }

        let final_url = client.current_url().await.map_err(network)?;
        let navigation = client
            .execute(NAVIGATION_SCRIPT, Vec::new())
            .await
            .unwrap_or(Value::Null);

        let content_type = navigation
            .get("contentType")
            .and_then(Value::as_str)
            .map(String::from);
        if !is_html_content_type(content_type.as_deref()) {
            return Err(RenderError::NonHtml {
                url: final_url.to_string(),
                content_type: content_type.unwrap_or_default(),
            });
        }

        let dom_snapshot = match client.execute(SNAPSHOT_SCRIPT, Vec::new()).await {
            Ok(Value::String(html)) if !html.is_empty() => html,
            _ => client.source().await.map_err(network)?,
        };

        // Browsers that do not expose responseStatus report 0
        let status_code = navigation
            .get("status")
            .and_then(Value::as_u64)
            .filter(|s| *s > 0)
            .and_then(|s| u16::try_from(s).ok())
            .unwrap_or(200);

        Ok(RenderedPage {
            final_url,
            status_code,
            content_type,
            dom_snapshot,
            timings: RenderTimings {
                total_ms: started.elapsed().as_millis() as u64,
                dom_content_loaded_ms: navigation.get("domContentLoaded").and_then(Value::as_u64),
                load_event_ms: navigation.get("loadEvent").and_then(Value::as_u64),
            },
        })
    }
}

#[async_trait]
impl PageRenderer for WebDriverRenderer {
    async fn render(&self, url: &Url, options: &RenderOptions) -> Result<RenderedPage, RenderError> {
        let _permit = self.sessions.acquire().await.map_err(|e| RenderError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let client = self.checkout(url).await?;

        let timeout = Duration::from_millis(options.timeout_ms);
        let result = match tokio::time::timeout(timeout, self.drive(&client, url, options)).await {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout {
                url: url.to_string(),
                timeout_ms: options.timeout_ms,
            }),
        };

        match &result {
            // A timed out or broken session may be stuck mid-navigation
            Err(RenderError::Timeout { .. }) | Err(RenderError::Network { .. }) => {
                if let Err(e) = client.close().await {
                    tracing::debug!("Failed to close WebDriver session: {}", e);
                }
            }
            _ => self.checkin(client).await,
        }

        result
    }

    async fn shutdown(&self) {
        let clients: Vec<Client> = self.idle.lock().await.drain(..).collect();
        for client in clients {
            if let Err(e) = client.close().await {
                tracing::warn!("Failed to close WebDriver session: {}", e);
            }
        }
    }
}
