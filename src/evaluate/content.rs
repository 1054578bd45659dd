//! Content rules: volume, heading structure, snippet lengths, language, social metadata

use super::{duplicate_groups, group_finding, EvaluationContext, Finding, RuleId, SiteContext};
use crate::extract::PageRecord;

pub fn evaluate_page(page: &PageRecord, ctx: &EvaluationContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    let url = page.url();
    let thresholds = ctx.thresholds;

    if page.word_count < thresholds.min_words {
        findings.push(Finding::new(
            RuleId::ThinContent,
            url,
            format!(
                "Page has {} words of visible text (minimum {})",
                page.word_count, thresholds.min_words
            ),
        ));
    }

    match page.h1_count() {
        0 => findings.push(Finding::new(RuleId::MissingH1, url, "Page has no H1 heading")),
        1 => {}
        n => findings.push(Finding::new(
            RuleId::MultipleH1,
            url,
            format!("Page has {} H1 headings", n),
        )),
    }

    if let Some((from, to)) = first_level_skip(page) {
        findings.push(Finding::new(
            RuleId::HeadingLevelSkip,
            url,
            format!("Heading level jumps from H{} to H{}", from, to),
        ));
    }

    if let Some(title) = page.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let len = title.chars().count();
        if len < thresholds.title_min_chars || len > thresholds.title_max_chars {
            findings.push(Finding::new(
                RuleId::TitleLength,
                url,
                format!(
                    "Title is {} characters (recommended {}-{})",
                    len, thresholds.title_min_chars, thresholds.title_max_chars
                ),
            ));
        }
    }

    if let Some(description) = page
        .meta_description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
    {
        let len = description.chars().count();
        if len < thresholds.description_min_chars || len > thresholds.description_max_chars {
            findings.push(Finding::new(
                RuleId::MetaDescriptionLength,
                url,
                format!(
                    "Meta description is {} characters (recommended {}-{})",
                    len, thresholds.description_min_chars, thresholds.description_max_chars
                ),
            ));
        }
    }

    if page.lang.is_none() {
        findings.push(Finding::new(
            RuleId::MissingLang,
            url,
            "The <html> element has no lang attribute",
        ));
    }

    if page.social.is_empty() {
        findings.push(Finding::new(
            RuleId::MissingSocialMetadata,
            url,
            "Page has no OpenGraph or Twitter metadata",
        ));
    }

    findings
}

pub fn evaluate_site(site: &SiteContext<'_>) -> Vec<Finding> {
    duplicate_groups(site.pages, |p| {
        (p.word_count > 0).then(|| p.content_hash.clone())
    })
    .into_iter()
    .map(|(_, members)| {
        group_finding(
            RuleId::DuplicateContent,
            &members,
            format!("{} pages have identical visible text", members.len()),
        )
    })
    .collect()
}

/// First heading that sits more than one level below its predecessor
fn first_level_skip(page: &PageRecord) -> Option<(u8, u8)> {
    page.headings
        .windows(2)
        .find(|pair| pair[1].level > pair[0].level + 1)
        .map(|pair| (pair[0].level, pair[1].level))
}
