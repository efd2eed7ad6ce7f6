//! Comparison filtering: which schemas, tables and object types participate
//!
//! Patterns come in two modes. Wildcard mode treats `*` as zero or more
//! characters and `?` as exactly one, escapes every regex metacharacter and
//! anchors the whole pattern, so `temp_*` matches `temp_orders` but not
//! `mytemp_orders`. Regex mode passes the pattern through untouched.
//!
//! An invalid pattern never matches (fail-open): a typo in an exclusion list
//! must not silently exclude everything. `validate` surfaces such patterns so
//! the engine can log them once per run.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::types::ObjectType;

/// Named immutable filter configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterPreset {
    None,
    ExcludeTempTables,
    ExcludeSystemSchemas,
    ProductionSafe,
}

impl FromStr for FilterPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "NONE" => Ok(FilterPreset::None),
            "EXCLUDE_TEMP_TABLES" => Ok(FilterPreset::ExcludeTempTables),
            "EXCLUDE_SYSTEM_SCHEMAS" => Ok(FilterPreset::ExcludeSystemSchemas),
            "PRODUCTION_SAFE" => Ok(FilterPreset::ProductionSafe),
            other => Err(Error::ConfigError(format!(
                "Unknown filter preset: {}",
                other
            ))),
        }
    }
}

static EXCLUDE_TEMP_TABLES: Lazy<ComparisonFilter> = Lazy::new(|| {
    ComparisonFilter::default().exclude_tables(&["temp_*", "tmp_*", "*_temp", "*_tmp"])
});

static EXCLUDE_SYSTEM_SCHEMAS: Lazy<ComparisonFilter> =
    Lazy::new(|| ComparisonFilter::default().exclude_schemas(&["pg_*", "information_schema"]));

static PRODUCTION_SAFE: Lazy<ComparisonFilter> = Lazy::new(|| {
    ComparisonFilter::default()
        .exclude_schemas(&["pg_*", "information_schema"])
        .exclude_tables(&[
            "temp_*",
            "tmp_*",
            "*_temp",
            "*_tmp",
            "*_backup",
            "*_bak",
            "scratch_*",
        ])
});

/// Decides which schemas, tables and object types participate in a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonFilter {
    /// Empty means every object type is allowed
    pub included_object_types: Vec<ObjectType>,
    pub excluded_object_types: Vec<ObjectType>,
    pub exclude_table_patterns: Vec<String>,
    pub exclude_schema_patterns: Vec<String>,
    /// Non-empty turns table matching into an allowlist
    pub include_table_patterns: Vec<String>,
    pub use_regex: bool,
}

impl ComparisonFilter {
    /// The immutable configuration behind a named preset
    pub fn preset(preset: FilterPreset) -> Self {
        match preset {
            FilterPreset::None => ComparisonFilter::default(),
            FilterPreset::ExcludeTempTables => EXCLUDE_TEMP_TABLES.clone(),
            FilterPreset::ExcludeSystemSchemas => EXCLUDE_SYSTEM_SCHEMAS.clone(),
            FilterPreset::ProductionSafe => PRODUCTION_SAFE.clone(),
        }
    }

    /// Build a filter from a comma-separated table-exclusion pattern string,
    /// the form the CLI accepts
    pub fn from_pattern_list(patterns: &str, use_regex: bool) -> Self {
        let mut filter = ComparisonFilter {
            use_regex,
            ..ComparisonFilter::default()
        };
        filter.exclude_table_patterns = patterns
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        filter
    }

    fn exclude_tables(mut self, patterns: &[&str]) -> Self {
        self.exclude_table_patterns
            .extend(patterns.iter().map(|p| p.to_string()));
        self
    }

    fn exclude_schemas(mut self, patterns: &[&str]) -> Self {
        self.exclude_schema_patterns
            .extend(patterns.iter().map(|p| p.to_string()));
        self
    }

    /// Whether objects of this category participate in the comparison
    pub fn matches_object_type(&self, object_type: ObjectType) -> bool {
        if self.excluded_object_types.contains(&object_type) {
            return false;
        }
        self.included_object_types.is_empty()
            || self.included_object_types.contains(&object_type)
    }

    /// Whether a table participates. Evaluation order is fixed:
    /// schema exclusions, then table exclusions, then the inclusion
    /// allowlist (when non-empty), then default-allow.
    pub fn matches_table(&self, schema: &str, table: &str) -> bool {
        for pattern in &self.exclude_schema_patterns {
            if self.pattern_matches(pattern, schema) {
                return false;
            }
        }
        for pattern in &self.exclude_table_patterns {
            if self.pattern_matches(pattern, table) {
                return false;
            }
        }
        if !self.include_table_patterns.is_empty() {
            return self
                .include_table_patterns
                .iter()
                .any(|pattern| self.pattern_matches(pattern, table));
        }
        true
    }

    /// Returns the patterns that fail to compile, so callers can report them
    /// once per run. Invalid patterns are otherwise silently non-matching.
    pub fn validate(&self) -> Vec<String> {
        self.exclude_schema_patterns
            .iter()
            .chain(self.exclude_table_patterns.iter())
            .chain(self.include_table_patterns.iter())
            .filter(|p| compile_pattern(p, self.use_regex).is_none())
            .cloned()
            .collect()
    }

    fn pattern_matches(&self, pattern: &str, candidate: &str) -> bool {
        match compile_pattern(pattern, self.use_regex) {
            Some(re) => re.is_match(candidate),
            // Fail-open: an invalid pattern excludes nothing
            None => false,
        }
    }
}

/// Compile a pattern in either mode; `None` when it does not parse
fn compile_pattern(pattern: &str, use_regex: bool) -> Option<Regex> {
    let source = if use_regex {
        pattern.to_string()
    } else {
        wildcard_to_regex(pattern)
    };
    match Regex::new(&source) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::debug!(pattern, error = %e, "filter pattern does not compile");
            None
        }
    }
}

/// Translate a wildcard pattern into an anchored regex: `*` becomes `.*`,
/// `?` becomes `.`, everything else is escaped literally
fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 4);
    out.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            c => out.push_str(&regex::escape(&c.to_string())),
        }
    }
    out.push('$');
    out
}
