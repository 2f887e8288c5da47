use std::fmt;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const SUCCESS_STATUS_CODE: u16 = 200;
pub const FAILURE_STATUS_CODE: u16 = 500;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Decode,
    Fetch,
    Parse,
    Clean,
    Serialize,
    Write,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Decode => "decode",
            Self::Fetch => "fetch",
            Self::Parse => "parse",
            Self::Clean => "clean",
            Self::Serialize => "serialize",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failure per pipeline stage. The display text is the message reported
/// back to the invoker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("Malformed event: {0}")]
    MalformedEvent(String),
    #[error("Error downloading file: {0}")]
    Fetch(String),
    #[error("Error reading CSV file: {0}")]
    Parse(String),
    #[error("Error serializing cleaned CSV: {0}")]
    Serialize(String),
    #[error("Error uploading the processed file to S3: {0}")]
    Write(String),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::MalformedEvent(_) => Stage::Decode,
            Self::Fetch(_) => Stage::Fetch,
            Self::Parse(_) => Stage::Parse,
            Self::Serialize(_) => Stage::Serialize,
            Self::Write(_) => Stage::Write,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProcessingResult {
    Success { output_key: String },
    Skipped { key: String, reason: String },
    Failure { stage: Stage, message: String },
}

impl ProcessingResult {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failure { .. })
    }

    pub fn message(&self) -> String {
        match self {
            Self::Success { output_key } => {
                format!("File {output_key} processed and successfully uploaded to S3.")
            }
            Self::Skipped { key, reason } => format!("Skipped {key}: {reason}"),
            Self::Failure { message, .. } => message.clone(),
        }
    }

    pub fn into_response(self) -> InvocationResponse {
        let status_code = if self.is_success() {
            SUCCESS_STATUS_CODE
        } else {
            FAILURE_STATUS_CODE
        };
        InvocationResponse::new(status_code, &self.message())
    }
}

impl From<PipelineError> for ProcessingResult {
    fn from(error: PipelineError) -> Self {
        Self::Failure {
            stage: error.stage(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    /// `body` carries the message JSON-encoded, so a plain message arrives
    /// wrapped in quotes.
    pub fn new(status_code: u16, message: &str) -> Self {
        Self {
            status_code,
            body: Value::String(message.to_string()).to_string(),
        }
    }

    pub fn message(&self) -> Option<String> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Extracts the bucket and key of the first record of an S3 object-created
/// notification.
pub fn decode_object_created_event(event: &Value) -> Result<ObjectLocation, PipelineError> {
    let records = event
        .get("Records")
        .and_then(Value::as_array)
        .ok_or_else(|| PipelineError::MalformedEvent("event must include a Records array".into()))?;

    let record = records
        .first()
        .ok_or_else(|| PipelineError::MalformedEvent("Records array is empty".into()))?;

    let bucket = required_str(record, &["s3", "bucket", "name"])?;
    let raw_key = required_str(record, &["s3", "object", "key"])?;
    let key = decode_object_key(raw_key)?;

    if bucket.is_empty() {
        return Err(PipelineError::MalformedEvent(
            "Records[0].s3.bucket.name is empty".into(),
        ));
    }
    if key.is_empty() {
        return Err(PipelineError::MalformedEvent(
            "Records[0].s3.object.key is empty".into(),
        ));
    }

    Ok(ObjectLocation {
        bucket: bucket.to_string(),
        key,
    })
}

/// S3 notifications carry form-encoded keys: `+` is a space and everything
/// else is percent-encoded.
pub fn decode_object_key(raw_key: &str) -> Result<String, PipelineError> {
    let spaced = raw_key.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|key| key.into_owned())
        .map_err(|error| {
            PipelineError::MalformedEvent(format!("object key is not valid UTF-8: {error}"))
        })
}

fn required_str<'a>(record: &'a Value, path: &[&str]) -> Result<&'a str, PipelineError> {
    let mut current = record;
    for segment in path {
        current = current.get(*segment).ok_or_else(|| {
            PipelineError::MalformedEvent(format!(
                "missing Records[0].{}",
                path.join(".")
            ))
        })?;
    }
    current.as_str().ok_or_else(|| {
        PipelineError::MalformedEvent(format!(
            "Records[0].{} must be a string",
            path.join(".")
        ))
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn s3_event(bucket: &str, key: &str) -> Value {
        json!({
            "Records": [
                {
                    "eventSource": "aws:s3",
                    "eventName": "ObjectCreated:Put",
                    "s3": {
                        "bucket": {"name": bucket},
                        "object": {"key": key, "size": 128}
                    }
                }
            ]
        })
    }

    #[test]
    fn decodes_bucket_and_key_from_first_record() {
        let location =
            decode_object_created_event(&s3_event("bucket1", "data.csv")).expect("should decode");

        assert_eq!(
            location,
            ObjectLocation {
                bucket: "bucket1".to_string(),
                key: "data.csv".to_string(),
            }
        );
    }

    #[test]
    fn decodes_form_encoded_keys() {
        let location = decode_object_created_event(&s3_event(
            "bucket1",
            "weather/my+file%281%29.csv",
        ))
        .expect("should decode");

        assert_eq!(location.key, "weather/my file(1).csv");
    }

    #[test]
    fn rejects_event_without_records() {
        let error = decode_object_created_event(&json!({"Event": "s3:TestEvent"}))
            .expect_err("missing records should fail");

        assert_eq!(error.stage(), Stage::Decode);
        assert!(error.to_string().contains("Records array"));
    }

    #[test]
    fn rejects_empty_records() {
        let error = decode_object_created_event(&json!({"Records": []}))
            .expect_err("empty records should fail");
        assert!(error.to_string().contains("Records array is empty"));
    }

    #[test]
    fn names_the_missing_nested_field() {
        let error = decode_object_created_event(&json!({
            "Records": [{"s3": {"bucket": {"name": "bucket1"}}}]
        }))
        .expect_err("missing key should fail");

        assert_eq!(
            error,
            PipelineError::MalformedEvent("missing Records[0].s3.object.key".to_string())
        );
    }

    #[test]
    fn rejects_non_string_key() {
        let error = decode_object_created_event(&json!({
            "Records": [{"s3": {"bucket": {"name": "bucket1"}, "object": {"key": 7}}}]
        }))
        .expect_err("numeric key should fail");

        assert!(error.to_string().contains("must be a string"));
    }

    #[test]
    fn rejects_empty_bucket() {
        let error = decode_object_created_event(&s3_event("", "data.csv"))
            .expect_err("empty bucket should fail");
        assert!(error.to_string().contains("bucket.name is empty"));
    }

    #[test]
    fn success_maps_to_200_with_json_encoded_body() {
        let response = ProcessingResult::Success {
            output_key: "processed_data.csv".to_string(),
        }
        .into_response();

        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.body,
            "\"File processed_data.csv processed and successfully uploaded to S3.\""
        );
    }

    #[test]
    fn failure_maps_to_500_and_keeps_cause() {
        let result =
            ProcessingResult::from(PipelineError::Fetch("NoSuchKey: missing.csv".to_string()));

        assert_eq!(
            result,
            ProcessingResult::Failure {
                stage: Stage::Fetch,
                message: "Error downloading file: NoSuchKey: missing.csv".to_string(),
            }
        );

        let response = result.into_response();
        assert_eq!(response.status_code, 500);
        assert_eq!(
            response.message().as_deref(),
            Some("Error downloading file: NoSuchKey: missing.csv")
        );
    }

    #[test]
    fn response_serializes_with_lambda_field_names() {
        let response = InvocationResponse::new(200, "ok");
        let value = serde_json::to_value(&response).expect("response should serialize");

        assert_eq!(value, json!({"statusCode": 200, "body": "\"ok\""}));
    }
}
