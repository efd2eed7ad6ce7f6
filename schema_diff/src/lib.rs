//! schema_diff: a schema comparison and migration-planning engine
//!
//! Given two point-in-time snapshots of a relational schema, schema_diff
//! discovers every structural difference across tables, columns, indexes,
//! constraints, views, routines, triggers, sequences, user types and
//! extensions, classifies each difference by severity, and emits an ordered,
//! dependency-safe DDL script to reconcile destination toward source.
//!
//! The comparison core is pure: feed it `SchemaSnapshot` values built by any
//! means. The `snapshot` module captures them from a live PostgreSQL catalog.

pub mod classify;
pub mod compare;
pub mod config;
pub mod ddl;
pub mod error;
pub mod filter;
pub mod model;
pub mod report;
pub mod resolve;
pub mod snapshot;
pub mod utils;

// Re-export main types for easier access
pub use classify::DifferenceClassifier;
pub use compare::ComparisonEngine;
pub use config::Config;
pub use ddl::DdlGenerator;
pub use error::{Error, Result};
pub use filter::{ComparisonFilter, FilterPreset};
pub use model::definition::{ObjectDefinition, ObjectKey, SchemaSnapshot};
pub use model::difference::{AttributeDifference, ObjectDifference};
pub use model::result::{ComparisonSummary, RunState, SchemaComparisonResult};
pub use model::types::{DifferenceType, ObjectType, Severity};
pub use resolve::DependencyResolver;
pub use snapshot::{PostgresSnapshotLoader, SnapshotLoader};

use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Initialize schema_diff with the specified configuration file
pub async fn init(config_path: &str) -> Result<SchemaDiffClient> {
    let config = config::load_from_file(config_path)?;
    SchemaDiffClient::new(config).await
}

/// The main client for running comparisons against live databases
pub struct SchemaDiffClient {
    config: Config,
    source_loader: PostgresSnapshotLoader,
    destination_loader: PostgresSnapshotLoader,
}

impl SchemaDiffClient {
    /// Create a new client from configuration, connecting both sides
    pub async fn new(config: Config) -> Result<Self> {
        let source_loader = PostgresSnapshotLoader::connect(&config.source).await?;
        let destination_loader = PostgresSnapshotLoader::connect(&config.destination).await?;

        Ok(Self {
            config,
            source_loader,
            destination_loader,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Snapshot both sides and run one comparison.
    ///
    /// A snapshot failure does not surface as `Err`: it finalizes the run as
    /// FAILED with the error recorded, so callers can always distinguish
    /// "no differences" from "comparison could not run".
    pub async fn compare(&self) -> Result<SchemaComparisonResult> {
        let started = Instant::now();
        let source_schema = self.config.source.schema.as_deref().unwrap_or("public");
        let destination_schema = self
            .config
            .destination
            .schema
            .as_deref()
            .unwrap_or("public");

        let (source, destination) = match snapshot::load_pair(
            &self.source_loader,
            &self.destination_loader,
            source_schema,
            destination_schema,
        )
        .await
        {
            Ok(pair) => pair,
            Err(e) => {
                tracing::error!(error = %e, "snapshot failed; aborting comparison");
                let mut result = SchemaComparisonResult::new(
                    self.source_loader.instance(),
                    self.destination_loader.instance(),
                    source_schema,
                    destination_schema,
                );
                result.fail(
                    started.elapsed().as_millis() as u64,
                    format!("snapshot failed: {}", e),
                );
                return Ok(result);
            }
        };

        let filter = self.config.comparison.build_filter()?;
        let mut engine = ComparisonEngine::new(filter);
        if let Some(user) = &self.config.comparison.performed_by {
            engine = engine.performed_by(user);
        }
        if let Some(seconds) = self.config.comparison.deadline_seconds {
            engine = engine.deadline(Duration::from_secs(seconds));
        }

        Ok(engine.run(&source, &destination))
    }

    /// Write the configured reports for a finished run
    pub fn write_reports(&self, result: &SchemaComparisonResult) -> Result<Vec<PathBuf>> {
        let Some(output) = &self.config.output else {
            return Ok(Vec::new());
        };

        let mut written = Vec::new();
        if output.write_script {
            written.push(report::write_script_file(result, &output.directory)?);
        }
        if output.format.eq_ignore_ascii_case("json") {
            written.push(report::write_json_file(result, &output.directory)?);
        }
        Ok(written)
    }
}
