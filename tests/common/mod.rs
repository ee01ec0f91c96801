//! Shared fakes for integration tests
//!
//! In-memory stand-ins for the AWS list APIs and the provider reader.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use driftscan::aws::client::{BucketLocation, Page};
use driftscan::aws::{AwsSupplierDeps, S3Api, SqsApi};
use driftscan::provider::{ReadResourceArgs, ResourceReader};
use driftscan::{EnumerationContext, RawValue};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const QUEUE_BASE: &str = "https://sqs.eu-west-3.amazonaws.com/047081014315";

pub fn queue_url(name: &str) -> String {
    format!("{}/{}", QUEUE_BASE, name)
}

// =============================================================================
// SQS
// =============================================================================

/// Serves queue URLs in pages of `page_size`
pub struct FakeSqs {
    pub urls: Vec<String>,
    pub page_size: usize,
    pub error: Option<String>,
    pub calls: AtomicUsize,
}

impl FakeSqs {
    pub fn with_queues(names: &[&str]) -> Self {
        Self {
            urls: names.iter().map(|n| queue_url(n)).collect(),
            page_size: 2,
            error: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            urls: vec![],
            page_size: 2,
            error: Some(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SqsApi for FakeSqs {
    async fn list_queues(&self, next_token: Option<String>) -> Result<Page> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.error {
            return Err(anyhow::anyhow!("{}", message));
        }

        let start: usize = next_token.as_deref().map(|t| t.parse()).transpose()?.unwrap_or(0);
        let end = (start + self.page_size).min(self.urls.len());
        Ok(Page {
            items: self.urls[start..end].to_vec(),
            next_token: (end < self.urls.len()).then(|| end.to_string()),
        })
    }
}

// =============================================================================
// S3
// =============================================================================

#[derive(Default)]
pub struct FakeS3 {
    pub buckets: Vec<String>,
    pub locations: HashMap<String, String>,
    pub analytics: HashMap<String, Vec<String>>,
    pub list_buckets_error: Option<String>,
    pub list_analytics_error: Option<String>,
}

impl FakeS3 {
    /// The three-bucket account used across the S3 scenarios
    pub fn three_buckets() -> Self {
        let buckets = [
            ("bucket-martin-test-drift", "eu-west-1"),
            ("bucket-martin-test-drift2", "eu-west-3"),
            ("bucket-martin-test-drift3", "ap-northeast-1"),
        ];
        let mut fake = FakeS3::default();
        for (index, (name, region)) in buckets.iter().enumerate() {
            fake.buckets.push(name.to_string());
            fake.locations.insert(name.to_string(), region.to_string());
            fake.analytics.insert(
                name.to_string(),
                vec![
                    format!("Analytics_Bucket{}", index + 1),
                    format!("Analytics2_Bucket{}", index + 1),
                ],
            );
        }
        fake
    }
}

#[async_trait]
impl S3Api for FakeS3 {
    async fn list_buckets(&self) -> Result<Vec<String>> {
        match &self.list_buckets_error {
            Some(message) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(self.buckets.clone()),
        }
    }

    async fn bucket_location(&self, bucket: &str) -> Result<BucketLocation> {
        Ok(match self.locations.get(bucket) {
            Some(region) => BucketLocation::Constraint(region.clone()),
            None => BucketLocation::NoSuchBucket,
        })
    }

    async fn list_analytics_configurations(
        &self,
        bucket: &str,
        _region: &str,
        continuation_token: Option<String>,
    ) -> Result<Page> {
        if let Some(message) = &self.list_analytics_error {
            return Err(anyhow::anyhow!("{}", message));
        }
        let ids = self.analytics.get(bucket).cloned().unwrap_or_default();
        // One configuration per page
        let index: usize = continuation_token.map(|t| t.parse()).transpose()?.unwrap_or(0);
        Ok(Page {
            items: ids.get(index).cloned().into_iter().collect(),
            next_token: (index + 1 < ids.len()).then(|| (index + 1).to_string()),
        })
    }
}

// =============================================================================
// Provider
// =============================================================================

/// Answers reads by synthesizing a plausible provider state
///
/// Tracks concurrency and every request it received.
#[derive(Default)]
pub struct FakeReader {
    pub failing_ids: HashSet<String>,
    pub overrides: HashMap<String, Value>,
    pub yields: usize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    requests: Mutex<Vec<ReadResourceArgs>>,
}

impl FakeReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(ids: &[&str]) -> Self {
        Self {
            failing_ids: ids.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Yields `yields` times inside every read so reads overlap
    pub fn yielding(yields: usize) -> Self {
        Self {
            yields,
            ..Self::default()
        }
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ReadResourceArgs> {
        self.requests.lock().unwrap().clone()
    }

    fn state_for(&self, args: &ReadResourceArgs) -> Value {
        let id = args.id.as_str();
        if let Some(state) = self.overrides.get(id) {
            return state.clone();
        }
        match args.resource_type.as_str() {
            "aws_sqs_queue" => json!({
                "id": id,
                "name": id.rsplit('/').next(),
                "fifo_queue": id.ends_with(".fifo"),
                "delay_seconds": 0,
                "visibility_timeout_seconds": 30,
                "policy": ""
            }),
            "aws_sqs_queue_policy" => json!({
                "id": id,
                "queue_url": id,
                "policy": "{\"Version\": \"2012-10-17\", \"Id\": \"MYSQSPOLICY\"}"
            }),
            "aws_s3_bucket_analytics_configuration" => {
                let (bucket, name) = id.split_once(':').unwrap_or((id, id));
                json!({
                    "id": id,
                    "bucket": bucket,
                    "name": name,
                    "filter": [],
                    "storage_class_analysis": []
                })
            }
            _ => json!({ "id": id }),
        }
    }
}

#[async_trait]
impl ResourceReader for FakeReader {
    async fn read_resource(&self, args: &ReadResourceArgs) -> Result<RawValue> {
        self.requests.lock().unwrap().push(args.clone());
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);

        for _ in 0..self.yields {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.failing_ids.contains(args.id.as_str()) {
            return Err(anyhow::anyhow!("read {} failed: AccessDenied", args.id));
        }
        Ok(RawValue::from(self.state_for(args)))
    }
}

pub fn deps(s3: FakeS3, sqs: FakeSqs, reader: Arc<FakeReader>) -> AwsSupplierDeps {
    AwsSupplierDeps {
        s3: Arc::new(s3),
        sqs: Arc::new(sqs),
        reader,
        ctx: EnumerationContext::new(),
        parallelism: 10,
    }
}
