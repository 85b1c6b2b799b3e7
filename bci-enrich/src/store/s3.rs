//! S3-compatible metadata store
//!
//! Uses HeadObject with static credentials and path-style addressing, which
//! works against both AWS and self-hosted (MinIO-style) endpoints.

use super::{MetadataStore, ObjectMetadata, StoreConnector};
use crate::error::LookupError;
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use bci_common::config::StoreConfig;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Builds one S3 client per worker from a shared configuration
#[derive(Debug, Clone)]
pub struct S3Connector {
    config: StoreConfig,
}

impl S3Connector {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }
}

impl StoreConnector for S3Connector {
    type Store = S3Store;

    fn connect(&self, worker_id: usize) -> Result<S3Store, LookupError> {
        let credentials = Credentials::new(
            self.config.access_key.clone(),
            self.config.secret_key.clone(),
            None,
            None,
            "environment",
        );

        let sdk_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(self.config.region.clone()))
            .endpoint_url(self.config.endpoint_url())
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        debug!(worker_id, endpoint = %self.config.endpoint_url(), "S3 client created");

        Ok(S3Store {
            client: Client::from_conf(sdk_config),
            bucket: self.config.bucket.clone(),
        })
    }
}

/// S3 client owned by a single worker
#[derive(Debug)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

#[async_trait]
impl MetadataStore for S3Store {
    async fn stat(&self, key: &str) -> Result<ObjectMetadata, LookupError> {
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_not_found()) {
                    LookupError::NotFound(key.to_string())
                } else {
                    LookupError::Transport {
                        key: key.to_string(),
                        reason: DisplayErrorContext(&e).to_string(),
                    }
                }
            })?;

        let modified = output
            .last_modified()
            .ok_or_else(|| LookupError::MissingTimestamp(key.to_string()))?;
        let last_modified = DateTime::<Utc>::from_timestamp(modified.secs(), modified.subsec_nanos())
            .ok_or_else(|| LookupError::MissingTimestamp(key.to_string()))?;

        Ok(ObjectMetadata { last_modified })
    }
}
