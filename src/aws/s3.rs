//! S3 listers
//!
//! Buckets are global to the account but their analytics configurations are
//! only visible from the bucket's own region, so every lister here resolves
//! bucket locations first.

use super::client::{drain_pages, BucketLocation, S3Api};
use crate::resource::{ResourceId, AWS_S3_BUCKET};
use crate::supplier::{ListError, Lister, ReadTarget};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Read attribute naming the region the provider should read from
pub const REGION_ALIAS: &str = "alias";

/// Map a GetBucketLocation constraint to a region name
pub fn normalize_location(constraint: &str) -> String {
    match constraint {
        "" => "us-east-1".to_string(),
        "EU" => "eu-west-1".to_string(),
        region => region.to_string(),
    }
}

/// Resolve a bucket's region, `None` if the bucket no longer exists
pub async fn bucket_region(client: &dyn S3Api, bucket: &str) -> Result<Option<String>> {
    match client.bucket_location(bucket).await? {
        BucketLocation::Constraint(constraint) => Ok(Some(normalize_location(&constraint))),
        BucketLocation::NoSuchBucket => {
            tracing::warn!("bucket {} disappeared while listing, skipping", bucket);
            Ok(None)
        }
    }
}

/// Buckets with their regions
async fn list_buckets_with_region(client: &dyn S3Api) -> Result<Vec<(String, String)>> {
    let mut buckets = Vec::new();
    for name in client.list_buckets().await? {
        if let Some(region) = bucket_region(client, &name).await? {
            buckets.push((name, region));
        }
    }
    Ok(buckets)
}

/// Lists `aws_s3_bucket`
pub struct S3BucketLister {
    client: Arc<dyn S3Api>,
}

impl S3BucketLister {
    pub fn new(client: Arc<dyn S3Api>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Lister for S3BucketLister {
    async fn list(&self) -> Result<Vec<ReadTarget>, ListError> {
        let buckets = list_buckets_with_region(self.client.as_ref())
            .await
            .map_err(ListError::Direct)?;

        Ok(buckets
            .into_iter()
            .map(|(name, region)| ReadTarget::new(name).with_attribute(REGION_ALIAS, region))
            .collect())
    }
}

/// Lists `aws_s3_bucket_analytics_configuration`, ids are `bucket:analytics-id`
pub struct S3BucketAnalyticsLister {
    client: Arc<dyn S3Api>,
}

impl S3BucketAnalyticsLister {
    pub fn new(client: Arc<dyn S3Api>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Lister for S3BucketAnalyticsLister {
    async fn list(&self) -> Result<Vec<ReadTarget>, ListError> {
        let client = self.client.as_ref();
        let buckets = list_buckets_with_region(client)
            .await
            .map_err(|err| ListError::dependency(AWS_S3_BUCKET, err))?;

        let mut targets = Vec::new();
        for (bucket, region) in &buckets {
            let (bucket, region) = (bucket.as_str(), region.as_str());
            let ids = drain_pages(move |token| {
                client.list_analytics_configurations(bucket, region, token)
            })
            .await
            .map_err(ListError::Direct)?;

            targets.extend(ids.into_iter().map(|id| {
                ReadTarget::new(ResourceId::scoped(bucket, &id)).with_attribute(REGION_ALIAS, region)
            }));
        }
        Ok(targets)
    }
}
