//! Report emission: migration scripts and JSON exports
//!
//! Scripts are written under the configured output directory with a
//! timestamped filename and a header carrying the run id and an md5 checksum
//! of the statement body.

use chrono::Utc;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::result::SchemaComparisonResult;
use crate::model::types::Severity;

/// The full migration script with its generated header
pub fn render_script(result: &SchemaComparisonResult) -> String {
    let body = result.migration_script();
    let checksum = format!("{:x}", md5::compute(body.as_bytes()));

    let mut script = String::new();
    script.push_str("-- Generated by schema_diff\n");
    script.push_str(&format!("-- run id: {}\n", result.id));
    script.push_str(&format!(
        "-- source: {} ({})\n",
        result.source_instance, result.source_schema
    ));
    script.push_str(&format!(
        "-- destination: {} ({})\n",
        result.destination_instance, result.destination_schema
    ));
    script.push_str(&format!(
        "-- differences: {} ({} missing, {} extra, {} modified)\n",
        result.summary.total_differences(),
        result.summary.missing,
        result.summary.extra,
        result.summary.modified
    ));
    script.push_str(&format!("-- checksum: {}\n\n", checksum));
    script.push_str(&body);
    if !body.ends_with('\n') {
        script.push('\n');
    }
    script
}

/// Write the migration script to a timestamped `.sql` file
pub fn write_script_file(result: &SchemaComparisonResult, directory: &str) -> Result<PathBuf> {
    fs::create_dir_all(directory)?;

    let short_id = result.id.simple().to_string();
    let filename = format!(
        "{}_schema_diff_{}.sql",
        Utc::now().format("%Y%m%d%H%M%S"),
        &short_id[..8]
    );
    let filepath = Path::new(directory).join(&filename);

    let mut file = File::create(&filepath)?;
    file.write_all(render_script(result).as_bytes())?;

    tracing::info!(file = %filepath.display(), "migration script written");
    Ok(filepath)
}

/// Write the structured result as JSON
pub fn write_json_file(result: &SchemaComparisonResult, directory: &str) -> Result<PathBuf> {
    fs::create_dir_all(directory)?;

    let filename = format!(
        "{}_schema_diff_{}.json",
        Utc::now().format("%Y%m%d%H%M%S"),
        &result.id.simple().to_string()[..8]
    );
    let filepath = Path::new(directory).join(&filename);

    let json = serde_json::to_string_pretty(result)?;
    let mut file = File::create(&filepath)?;
    file.write_all(json.as_bytes())?;

    tracing::info!(file = %filepath.display(), "json report written");
    Ok(filepath)
}

/// Human-readable run summary for terminal output
pub fn render_summary(result: &SchemaComparisonResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Compared {}:{} -> {}:{}\n",
        result.source_instance,
        result.source_schema,
        result.destination_instance,
        result.destination_schema
    ));

    if let Some(error) = &result.error_message {
        out.push_str(&format!("Comparison FAILED: {}\n", error));
        return out;
    }

    if result.is_identical() {
        out.push_str("Schemas are identical.\n");
        return out;
    }

    out.push_str(&format!(
        "{} differences: {} missing, {} extra, {} modified\n",
        result.summary.total_differences(),
        result.summary.missing,
        result.summary.extra,
        result.summary.modified
    ));
    out.push_str(&format!(
        "  breaking: {}, warning: {}, info: {}\n",
        result.differences_by_severity(Severity::Breaking).len(),
        result.differences_by_severity(Severity::Warning).len(),
        result.differences_by_severity(Severity::Info).len()
    ));

    for diff in &result.differences {
        out.push_str(&format!(
            "  [{}] {} {} {}.{}\n",
            diff.severity,
            diff.difference_type,
            diff.object_type,
            diff.schema_name,
            diff.object_name
        ));
    }

    for warning in &result.warnings {
        out.push_str(&format!("  note: {}\n", warning));
    }

    out
}
