use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use csv_cleaner_core::contract::InvocationResponse;
use csv_cleaner_lambda::adapters::object_store::{ObjectStore, StoreError};
use csv_cleaner_lambda::handlers::object_created::{handle_object_created_event, CleanerConfig};
use csv_cleaner_lambda::telemetry::init_logging;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct S3ObjectStore {
    s3_client: aws_sdk_s3::Client,
}

impl ObjectStore for S3ObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .get_object()
                    .bucket(&bucket)
                    .key(&object_key)
                    .send()
                    .await
                    .map_err(|error| {
                        let missing = error
                            .as_service_error()
                            .map(|service_error| service_error.is_no_such_key())
                            .unwrap_or(false);
                        if missing {
                            StoreError::NotFound {
                                bucket: bucket.clone(),
                                key: object_key.clone(),
                            }
                        } else {
                            StoreError::Transport(format!(
                                "failed to read object from s3: {}",
                                DisplayErrorContext(&error)
                            ))
                        }
                    })?;

                output
                    .body
                    .collect()
                    .await
                    .map(|body| body.into_bytes().to_vec())
                    .map_err(|error| {
                        StoreError::Transport(format!("failed to read s3 object body: {error}"))
                    })
            })
        })
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), StoreError> {
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let body_bytes = body.to_vec();
        let content_type = content_type.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_object()
                    .bucket(bucket)
                    .key(object_key)
                    .content_type(content_type)
                    .body(ByteStream::from(body_bytes))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        StoreError::Transport(format!(
                            "failed to write object to s3: {}",
                            DisplayErrorContext(&error)
                        ))
                    })
            })
        })
    }
}

async fn handle_request(
    event: LambdaEvent<Value>,
    store: &S3ObjectStore,
    config: &CleanerConfig,
) -> Result<InvocationResponse, Error> {
    Ok(handle_object_created_event(event.payload, config, store))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = S3ObjectStore {
        s3_client: aws_sdk_s3::Client::new(&aws_config),
    };
    let config = CleanerConfig::default();

    lambda_runtime::run(service_fn(|event: LambdaEvent<Value>| {
        handle_request(event, &store, &config)
    }))
    .await
}
