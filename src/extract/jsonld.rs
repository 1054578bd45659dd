//! JSON-LD structured data blocks

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

/// One `<script type="application/ld+json">` block
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StructuredData {
    /// Parsed block with every `@type` it declares, sorted and deduplicated
    Valid { types: Vec<String>, value: Value },
    /// Block that is not valid JSON
    Invalid { error: String },
}

impl StructuredData {
    /// Parses the raw text of one block; failures never affect other blocks
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::Invalid {
                error: "empty JSON-LD block".to_string(),
            };
        }

        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::Valid {
                types: collect_types(&value),
                value,
            },
            Err(e) => Self::Invalid {
                error: e.to_string(),
            },
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// Declared types, empty for invalid blocks
    pub fn types(&self) -> &[String] {
        match self {
            Self::Valid { types, .. } => types,
            Self::Invalid { .. } => &[],
        }
    }
}

/// Collects `@type` values recursively, including nested objects and `@graph` members
fn collect_types(value: &Value) -> Vec<String> {
    let mut types = BTreeSet::new();
    visit(value, &mut types);
    types.into_iter().collect()
}

fn visit(value: &Value, types: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "@type" {
                    match child {
                        Value::String(name) => {
                            types.insert(name.clone());
                        }
                        Value::Array(names) => {
                            types.extend(names.iter().filter_map(Value::as_str).map(String::from));
                        }
                        _ => {}
                    }
                } else {
                    visit(child, types);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                visit(item, types);
            }
        }
        _ => {}
    }
}
