//! AWS API clients
//!
//! Listers talk to AWS through the narrow [`S3Api`] and [`SqsApi`] traits.
//! [`AwsS3Client`] and [`AwsSqsClient`] implement them on the official SDK;
//! tests substitute in-memory fakes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::error::ProvideErrorMetadata;
use std::future::Future;

/// One page of identifiers from a paginated list call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<String>,
    pub next_token: Option<String>,
}

impl Page {
    pub fn last(items: Vec<String>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }
}

/// Fetch pages until the API stops returning a continuation token
pub async fn drain_pages<F, Fut>(mut fetch: F) -> Result<Vec<String>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page>>,
{
    let mut all_items = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = fetch(page_token.take()).await?;
        all_items.extend(page.items);

        match page.next_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(all_items)
}

/// Location of a bucket as reported by GetBucketLocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketLocation {
    /// Raw location constraint; empty for us-east-1
    Constraint(String),
    /// The bucket disappeared after it was listed
    NoSuchBucket,
}

#[async_trait]
pub trait S3Api: Send + Sync {
    async fn list_buckets(&self) -> Result<Vec<String>>;

    async fn bucket_location(&self, bucket: &str) -> Result<BucketLocation>;

    /// One page of analytics configuration ids, queried in the bucket's region
    async fn list_analytics_configurations(
        &self,
        bucket: &str,
        region: &str,
        continuation_token: Option<String>,
    ) -> Result<Page>;
}

#[async_trait]
pub trait SqsApi: Send + Sync {
    /// One page of queue URLs
    async fn list_queues(&self, next_token: Option<String>) -> Result<Page>;
}

/// Load the shared SDK configuration (CLI/config region and profile win)
pub async fn load_sdk_config(region: Option<&str>, profile: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    if let Some(profile) = profile {
        loader = loader.profile_name(profile);
    }
    loader.load().await
}

// =============================================================================
// S3
// =============================================================================

#[derive(Clone)]
pub struct AwsS3Client {
    sdk_config: SdkConfig,
    client: aws_sdk_s3::Client,
}

impl AwsS3Client {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            sdk_config: sdk_config.clone(),
            client: aws_sdk_s3::Client::new(sdk_config),
        }
    }

    /// Client bound to a bucket's region
    fn regional_client(&self, region: &str) -> aws_sdk_s3::Client {
        let config = aws_sdk_s3::config::Builder::from(&self.sdk_config)
            .region(aws_sdk_s3::config::Region::new(region.to_string()))
            .build();
        aws_sdk_s3::Client::from_conf(config)
    }
}

#[async_trait]
impl S3Api for AwsS3Client {
    async fn list_buckets(&self) -> Result<Vec<String>> {
        tracing::debug!("s3:ListBuckets");
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .context("s3:ListBuckets failed")?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name().map(str::to_string))
            .collect())
    }

    async fn bucket_location(&self, bucket: &str) -> Result<BucketLocation> {
        tracing::debug!("s3:GetBucketLocation bucket={}", bucket);
        match self.client.get_bucket_location().bucket(bucket).send().await {
            Ok(output) => Ok(BucketLocation::Constraint(
                output
                    .location_constraint()
                    .map(|c| c.as_str().to_string())
                    .unwrap_or_default(),
            )),
            Err(err) if err.code() == Some("NoSuchBucket") => Ok(BucketLocation::NoSuchBucket),
            Err(err) => Err(anyhow::Error::new(err)
                .context(format!("s3:GetBucketLocation failed for {}", bucket))),
        }
    }

    async fn list_analytics_configurations(
        &self,
        bucket: &str,
        region: &str,
        continuation_token: Option<String>,
    ) -> Result<Page> {
        tracing::debug!(
            "s3:ListBucketAnalyticsConfigurations bucket={} region={}",
            bucket,
            region
        );
        let output = self
            .regional_client(region)
            .list_bucket_analytics_configurations()
            .bucket(bucket)
            .set_continuation_token(continuation_token)
            .send()
            .await
            .with_context(|| format!("s3:ListBucketAnalyticsConfigurations failed for {}", bucket))?;

        let items = output
            .analytics_configuration_list()
            .iter()
            .map(|config| config.id().to_string())
            .collect();
        let next_token = if output.is_truncated().unwrap_or(false) {
            output.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(Page { items, next_token })
    }
}

// =============================================================================
// SQS
// =============================================================================

#[derive(Clone)]
pub struct AwsSqsClient {
    client: aws_sdk_sqs::Client,
}

impl AwsSqsClient {
    /// Page size; ListQueues only paginates when a limit is set
    const MAX_RESULTS: i32 = 1000;

    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_sqs::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl SqsApi for AwsSqsClient {
    async fn list_queues(&self, next_token: Option<String>) -> Result<Page> {
        tracing::debug!("sqs:ListQueues");
        let output = self
            .client
            .list_queues()
            .max_results(Self::MAX_RESULTS)
            .set_next_token(next_token)
            .send()
            .await
            .context("sqs:ListQueues failed")?;

        Ok(Page {
            items: output.queue_urls().to_vec(),
            next_token: output.next_token().map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_drain_pages_follows_tokens() {
        let calls = AtomicUsize::new(0);
        let items = drain_pages(|token| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok(match token.as_deref() {
                    None => Page {
                        items: vec!["a".into(), "b".into()],
                        next_token: Some("page-2".into()),
                    },
                    Some("page-2") => Page {
                        items: vec!["c".into()],
                        next_token: Some("page-3".into()),
                    },
                    Some(_) => Page::last(vec![]),
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(items, vec!["a", "b", "c"]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_drain_pages_stops_on_error() {
        let result = tokio_test::block_on(drain_pages(|token| async move {
            match token {
                None => Ok(Page {
                    items: vec!["a".into()],
                    next_token: Some("next".into()),
                }),
                Some(_) => Err(anyhow::anyhow!("throttled")),
            }
        }));

        let err = tokio_test::assert_err!(result);
        assert_eq!(err.to_string(), "throttled");
    }

    #[test]
    fn test_drain_pages_single_empty_page() {
        let result = tokio_test::block_on(drain_pages(|_| async { Ok(Page::last(vec![])) }));
        let items = tokio_test::assert_ok!(result);
        assert!(items.is_empty());
    }
}
