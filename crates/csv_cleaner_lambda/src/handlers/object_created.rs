use std::time::Instant;

use csv_cleaner_core::cleaning::{clean_with_report, CleaningReport};
use csv_cleaner_core::contract::{
    decode_object_created_event, InvocationResponse, ObjectLocation, PipelineError,
    ProcessingResult, Stage,
};
use csv_cleaner_core::csv_codec::{parse_table, serialize_table};
use csv_cleaner_core::storage_keys::{
    is_processed_object_key, processed_object_key, DEFAULT_OUTPUT_PREFIX,
};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::adapters::object_store::ObjectStore;

pub const CSV_CONTENT_TYPE: &str = "text/csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanerConfig {
    pub output_prefix: String,
    /// Bucket receiving cleaned files; `None` writes next to the source object.
    pub output_bucket: Option<String>,
    /// Skip objects whose key already carries `output_prefix` when writing
    /// back into the source bucket. Off by default, so such objects are
    /// cleaned like any other.
    pub skip_prefixed_keys: bool,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            output_bucket: None,
            skip_prefixed_keys: false,
        }
    }
}

impl CleanerConfig {
    fn output_bucket_for<'a>(&'a self, source: &'a ObjectLocation) -> &'a str {
        self.output_bucket.as_deref().unwrap_or(&source.bucket)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedObject {
    pub output: ObjectLocation,
    pub report: CleaningReport,
}

pub fn handle_object_created_event(
    event: Value,
    config: &CleanerConfig,
    store: &impl ObjectStore,
) -> InvocationResponse {
    run_pipeline(&event, config, store).into_response()
}

/// Runs decode, fetch, parse, clean, serialize and write in order, stopping at
/// the first failing stage.
pub fn run_pipeline(
    event: &Value,
    config: &CleanerConfig,
    store: &impl ObjectStore,
) -> ProcessingResult {
    let started_at = Instant::now();

    let source = match decode_object_created_event(event) {
        Ok(location) => location,
        Err(error) => return failed(error, None, started_at),
    };

    if let Some(extra) = event
        .get("Records")
        .and_then(Value::as_array)
        .map(|records| records.len().saturating_sub(1))
        .filter(|extra| *extra > 0)
    {
        warn!(ignored_records = extra, "only the first record is processed");
    }

    if config.skip_prefixed_keys
        && config.output_bucket_for(&source) == source.bucket
        && is_processed_object_key(&config.output_prefix, &source.key)
    {
        info!(
            bucket = %source.bucket,
            key = %source.key,
            "object is already a cleaned output, skipping"
        );
        return ProcessingResult::Skipped {
            key: source.key,
            reason: "object was written by this handler".to_string(),
        };
    }

    info!(bucket = %source.bucket, key = %source.key, "cleaning started");

    match clean_object(&source, config, store) {
        Ok(cleaned) => {
            info!(
                bucket = %cleaned.output.bucket,
                key = %source.key,
                output_key = %cleaned.output.key,
                input_rows = cleaned.report.input_rows,
                duplicate_rows = cleaned.report.duplicate_rows,
                incomplete_rows = cleaned.report.incomplete_rows,
                output_rows = cleaned.report.output_rows,
                duration_ms = started_at.elapsed().as_millis() as u64,
                "cleaning completed"
            );
            ProcessingResult::Success {
                output_key: cleaned.output.key,
            }
        }
        Err(error) => failed(error, Some(&source), started_at),
    }
}

fn clean_object(
    source: &ObjectLocation,
    config: &CleanerConfig,
    store: &impl ObjectStore,
) -> Result<CleanedObject, PipelineError> {
    let body = store
        .get_object(&source.bucket, &source.key)
        .map_err(|error| PipelineError::Fetch(error.to_string()))?;
    stage_reached(Stage::Fetch, source);

    let table = parse_table(&body).map_err(|error| PipelineError::Parse(error.to_string()))?;
    stage_reached(Stage::Parse, source);

    let (cleaned, report) = clean_with_report(&table);
    stage_reached(Stage::Clean, source);

    let encoded =
        serialize_table(&cleaned).map_err(|error| PipelineError::Serialize(error.to_string()))?;
    stage_reached(Stage::Serialize, source);

    let output = ObjectLocation {
        bucket: config.output_bucket_for(source).to_string(),
        key: processed_object_key(&config.output_prefix, &source.key),
    };
    store
        .put_object(
            &output.bucket,
            &output.key,
            encoded.as_bytes(),
            CSV_CONTENT_TYPE,
        )
        .map_err(|error| PipelineError::Write(error.to_string()))?;
    stage_reached(Stage::Write, source);

    Ok(CleanedObject { output, report })
}

fn stage_reached(stage: Stage, source: &ObjectLocation) {
    debug!(stage = %stage, bucket = %source.bucket, key = %source.key, "stage completed");
}

fn failed(
    error: PipelineError,
    source: Option<&ObjectLocation>,
    started_at: Instant,
) -> ProcessingResult {
    error!(
        stage = %error.stage(),
        bucket = source.map(|location| location.bucket.as_str()),
        key = source.map(|location| location.key.as_str()),
        duration_ms = started_at.elapsed().as_millis() as u64,
        error = %error,
        "cleaning failed"
    );
    ProcessingResult::from(error)
}
