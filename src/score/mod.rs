//! Scoring aggregator
//!
//! Turns a list of findings into per-category scores, a weighted site score and a prioritized
//! finding list. Every category starts at 100 and loses a fixed penalty per finding according
//! to its severity; categories never affect each other.

use crate::config::{CategoryWeights, SeverityPenalties};
use crate::evaluate::{Category, Finding, Severity};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Tolerance on the sum of category weights
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weights that are out of range or do not sum to 1
#[derive(Debug, Clone, PartialEq, Error)]
#[error("category weights must each lie in [0, 1] and sum to 1.0, got sum {sum}")]
pub struct InvalidWeightConfiguration {
    pub sum: f64,
}

impl CategoryWeights {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Technical => self.technical,
            Category::Content => self.content,
            Category::Schema => self.schema,
            Category::Links => self.links,
            Category::Performance => self.performance,
        }
    }

    pub fn sum(&self) -> f64 {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

impl SeverityPenalties {
    pub fn get(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Info => self.info,
            Severity::Warning => self.warning,
            Severity::Critical => self.critical,
        }
    }
}

/// Checks that every weight lies in [0, 1] and that they sum to 1
pub fn validate_weights(weights: &CategoryWeights) -> Result<(), InvalidWeightConfiguration> {
    let sum = weights.sum();
    let in_range = Category::ALL
        .iter()
        .all(|c| (0.0..=1.0).contains(&weights.get(*c)));

    if !in_range || (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(InvalidWeightConfiguration { sum });
    }
    Ok(())
}

/// Letter grade of a site score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
}

impl Grade {
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => Self::A,
            80..=89 => Self::B,
            70..=79 => Self::C,
            55..=69 => Self::D,
            _ => Self::E,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::A => "Excellent",
            Self::B => "Good",
            Self::C => "Fair",
            Self::D => "Needs work",
            Self::E => "Poor",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
        };
        write!(f, "{}", letter)
    }
}

/// Output of [`aggregate`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCard {
    pub category_scores: BTreeMap<Category, u8>,
    pub site_score: u8,
    pub prioritized_findings: Vec<Finding>,
}

impl ScoreCard {
    pub fn grade(&self) -> Grade {
        Grade::from_score(self.site_score)
    }
}

/// Scores a set of findings
///
/// 1. Validate the weights
/// 2. Drop repeated `(rule_id, affected_url)` pairs, keeping the first
/// 3. Subtract the severity penalty of each finding from its category (floored at 0)
/// 4. Site score = rounded weighted sum of category scores
/// 5. Order findings by severity, then category weight, then input order
pub fn aggregate(
    findings: &[Finding],
    weights: &CategoryWeights,
    penalties: &SeverityPenalties,
) -> Result<ScoreCard, InvalidWeightConfiguration> {
    validate_weights(weights)?;

    let mut seen = HashSet::new();
    let unique: Vec<Finding> = findings
        .iter()
        .filter(|f| seen.insert((f.rule_id, f.affected_url.clone())))
        .cloned()
        .collect();

    let category_scores = category_scores(&unique, penalties);
    let site_score = weighted_score(&category_scores, weights);

    let mut prioritized_findings = unique;
    // Stable sort keeps input order within equal keys
    prioritized_findings.sort_by(|a, b| {
        b.severity.cmp(&a.severity).then_with(|| {
            weights
                .get(b.category)
                .total_cmp(&weights.get(a.category))
        })
    });

    Ok(ScoreCard {
        category_scores,
        site_score,
        prioritized_findings,
    })
}

fn category_scores(
    findings: &[Finding],
    penalties: &SeverityPenalties,
) -> BTreeMap<Category, u8> {
    let mut lost: BTreeMap<Category, u32> = Category::ALL.iter().map(|c| (*c, 0)).collect();
    for finding in findings {
        if let Some(total) = lost.get_mut(&finding.category) {
            *total = total.saturating_add(penalties.get(finding.severity));
        }
    }

    lost.into_iter()
        .map(|(category, points)| (category, 100u32.saturating_sub(points) as u8))
        .collect()
}

/// Site score from already computed category scores
pub fn weighted_score(scores: &BTreeMap<Category, u8>, weights: &CategoryWeights) -> u8 {
    let weighted: f64 = scores
        .iter()
        .map(|(category, score)| f64::from(*score) * weights.get(*category))
        .sum();
    weighted.round().clamp(0.0, 100.0) as u8
}
