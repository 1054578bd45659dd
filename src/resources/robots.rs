//! robots.txt interpretation using the robotstxt crate

use robotstxt::DefaultMatcher;

/// User agent that stands for "every crawler"
pub const ANY_AGENT: &str = "*";

/// Parsed robots.txt data
///
/// Thin wrapper around the robotstxt matcher, answering the questions an audit asks of a
/// robots file.
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    content: String,
}

impl ParsedRobots {
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL to check
    /// * `user_agent` - Product token of the crawler (`*` for the default group)
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Whether the default group disallows the site root
    pub fn blocks_root(&self, root_url: &str) -> bool {
        !self.is_allowed(root_url, ANY_AGENT)
    }

    /// `Sitemap:` URLs declared in the file, in order
    pub fn sitemaps(&self) -> Vec<String> {
        self.content
            .lines()
            .filter_map(|line| {
                let line = line.split('#').next().unwrap_or_default().trim();
                let (key, value) = line.split_once(':')?;
                key.trim()
                    .eq_ignore_ascii_case("sitemap")
                    .then(|| value.trim().to_string())
                    .filter(|v| !v.is_empty())
            })
            .collect()
    }
}
