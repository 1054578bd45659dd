//! Structured data rules

use super::{EvaluationContext, Finding, RuleId};
use crate::extract::PageRecord;
use crate::url::url_key;

const HOME_TYPES: &[&str] = &[
    "Organization",
    "LocalBusiness",
    "ProfessionalService",
    "Person",
    "WebSite",
];
const ARTICLE_TYPES: &[&str] = &["Article", "BlogPosting", "NewsArticle"];
const PRODUCT_TYPES: &[&str] = &["Product"];

/// What kind of page a record is, for schema expectations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageKind {
    Home,
    Article,
    Product,
    Other,
}

impl PageKind {
    fn of(page: &PageRecord, ctx: &EvaluationContext<'_>) -> Self {
        if url_key(ctx.root_url).as_deref() == Some(page.url()) {
            return Self::Home;
        }
        match page.og_type().as_deref() {
            Some("article") => Self::Article,
            Some("product") => Self::Product,
            _ => Self::Other,
        }
    }

    fn expected_types(&self) -> &'static [&'static str] {
        match self {
            Self::Home => HOME_TYPES,
            Self::Article => ARTICLE_TYPES,
            Self::Product => PRODUCT_TYPES,
            Self::Other => &[],
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home page",
            Self::Article => "article",
            Self::Product => "product page",
            Self::Other => "page",
        }
    }
}

pub fn evaluate_page(page: &PageRecord, ctx: &EvaluationContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    let url = page.url();

    if page.structured_data.is_empty() {
        findings.push(Finding::new(
            RuleId::MissingStructuredData,
            url,
            "Page has no JSON-LD structured data",
        ));
        return findings;
    }

    let invalid = page
        .structured_data
        .iter()
        .filter(|block| !block.is_valid())
        .count();
    if invalid > 0 {
        findings.push(Finding::new(
            RuleId::InvalidJsonLd,
            url,
            format!(
                "{} of {} JSON-LD blocks could not be parsed",
                invalid,
                page.structured_data.len()
            ),
        ));
    }

    let kind = PageKind::of(page, ctx);
    let expected = kind.expected_types();
    let has_valid = invalid < page.structured_data.len();
    if has_valid && !expected.is_empty() {
        let declared = page
            .structured_data
            .iter()
            .flat_map(|block| block.types())
            .any(|t| expected.contains(&t.as_str()));
        if !declared {
            findings.push(Finding::new(
                RuleId::MissingExpectedSchemaType,
                url,
                format!(
                    "Structured data on this {} declares none of: {}",
                    kind.as_str(),
                    expected.join(", ")
                ),
            ));
        }
    }

    findings
}
