//! Link graph rules

use super::{EvaluationContext, Finding, RuleId, SiteContext};
use crate::extract::PageRecord;
use crate::url::{url_key, LinkScope};
use std::collections::{HashMap, HashSet};
use url::Url;

pub fn evaluate_page(page: &PageRecord, ctx: &EvaluationContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    let url = page.url();
    let thresholds = ctx.thresholds;

    let followable: Vec<_> = page
        .links
        .iter()
        .filter(|link| link.scope != LinkScope::Anchor)
        .collect();
    if !followable.is_empty() {
        let nofollow = followable.iter().filter(|link| link.nofollow).count();
        let ratio = nofollow as f64 / followable.len() as f64;
        if ratio > thresholds.max_nofollow_ratio {
            findings.push(Finding::new(
                RuleId::ExcessiveNofollow,
                url,
                format!(
                    "{} of {} links are nofollow ({:.0}%, limit {:.0}%)",
                    nofollow,
                    followable.len(),
                    ratio * 100.0,
                    thresholds.max_nofollow_ratio * 100.0
                ),
            ));
        }
    }

    let internal = page.internal_links().count();
    if internal < thresholds.min_internal_links {
        findings.push(Finding::new(
            RuleId::FewInternalLinks,
            url,
            format!(
                "Page has {} internal links (minimum {})",
                internal, thresholds.min_internal_links
            ),
        ));
    }

    findings
}

pub fn evaluate_site(site: &SiteContext<'_>) -> Vec<Finding> {
    let mut findings = broken_links(site);
    findings.extend(orphans(site));
    findings
}

fn key_of(href: &str) -> Option<String> {
    Url::parse(href).ok().as_ref().and_then(url_key)
}

/// One finding per page linking to internal URLs that failed with an HTTP error
fn broken_links(site: &SiteContext<'_>) -> Vec<Finding> {
    let broken: HashMap<String, u16> = site
        .failures
        .iter()
        .filter_map(|failure| {
            let status = failure.status_code.filter(|s| *s >= 400)?;
            Some((key_of(&failure.url)?, status))
        })
        .collect();
    if broken.is_empty() {
        return Vec::new();
    }

    let mut findings = Vec::new();
    for page in site.pages {
        let mut targets: Vec<(String, u16)> = Vec::new();
        for link in page.internal_links() {
            let Some(key) = key_of(&link.href) else {
                continue;
            };
            if let Some(status) = broken.get(&key) {
                if !targets.iter().any(|(t, _)| *t == key) {
                    targets.push((key, *status));
                }
            }
        }
        if targets.is_empty() {
            continue;
        }

        let described: Vec<String> = targets
            .iter()
            .map(|(target, status)| format!("{} ({})", target, status))
            .collect();
        findings.push(
            Finding::new(
                RuleId::BrokenInternalLink,
                page.url(),
                format!("Links to broken internal pages: {}", described.join(", ")),
            )
            .with_related(targets.into_iter().map(|(target, _)| target).collect()),
        );
    }

    findings
}

/// Visited pages, other than the root, that no other visited page links to
fn orphans(site: &SiteContext<'_>) -> Vec<Finding> {
    let root = url_key(site.root_url);

    let mut inbound: HashSet<String> = HashSet::new();
    for page in site.pages {
        for link in page.internal_links() {
            if let Some(key) = key_of(&link.href) {
                if key != page.url() {
                    inbound.insert(key);
                }
            }
        }
    }

    site.pages
        .iter()
        .filter(|page| root.as_deref() != Some(page.url()))
        .filter(|page| {
            let via_redirect = page
                .redirected_from
                .as_deref()
                .and_then(key_of)
                .map_or(false, |key| inbound.contains(&key));
            !inbound.contains(page.url()) && !via_redirect
        })
        .map(|page| {
            Finding::new(
                RuleId::OrphanPage,
                page.url(),
                "No other audited page links to this page",
            )
        })
        .collect()
}
