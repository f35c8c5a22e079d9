//! Config validation: unknown-key detection with Levenshtein suggestions.
//!
//! The raw TOML is parsed into a `toml::Value` first and every dotted key path
//! is compared against the known field names. Unknown keys produce warnings
//! only; serde deserialization and `DashboardConfig::validate` run afterwards.

use std::collections::HashSet;
use std::fmt;

use crate::types::Domain;

/// A non-fatal config warning.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, ", did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

const DOMAIN_FIELDS: [&str; 5] = [
    "stale_after_minutes",
    "strip_points",
    "bands",
    "bands.upper",
    "bands.label",
];

/// Every valid dotted key path for `DashboardConfig`.
///
/// Entries of a `bands` array share the array's path, so a band's bound is
/// `domains.wind.bands.upper`. Must be kept in step with `dashboard_config.rs`.
pub fn known_config_keys() -> HashSet<String> {
    let mut keys: HashSet<String> = [
        // [window]
        "window",
        "window.default_hours",
        "window.choices",
        // [rose]
        "rose",
        "rose.max_radius",
        // [domains]
        "domains",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    for section in Domain::ALL.map(Domain::key) {
        keys.insert(format!("domains.{section}"));
        for field in DOMAIN_FIELDS {
            keys.insert(format!("domains.{section}.{field}"));
        }
    }
    keys
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively collect dotted key paths from a `toml::Value` tree.
///
/// `{ a = { b = 1 }, c = [{ d = 2 }] }` yields `["a", "a.b", "c", "c.d"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    match value {
        toml::Value::Table(table) => {
            for (k, v) in table {
                let path = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{prefix}.{k}")
                };
                keys.push(path.clone());
                if v.is_table() || v.is_array() {
                    keys.extend(walk_toml_keys(v, &path));
                }
            }
        }
        toml::Value::Array(items) => {
            for item in items.iter().filter(|item| item.is_table()) {
                for key in walk_toml_keys(item, prefix) {
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
            }
        }
        _ => {}
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Closest known key within edit distance 3. Ties go to the alphabetically
/// first key so suggestions are stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<String>) -> Option<String> {
    known
        .iter()
        .map(|k| (levenshtein(unknown, k), k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.clone())
}

// ============================================================================
// Entry Point
// ============================================================================

/// Warnings for every unknown key in `raw_toml`. Never fails; syntax errors
/// are reported by the real deserialization pass.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}
