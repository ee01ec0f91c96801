//! AWS resource enumeration
//!
//! # Module Structure
//!
//! - [`client`] - `S3Api`/`SqsApi` traits and their SDK implementations
//! - [`s3`] - Bucket and bucket analytics listers
//! - [`sqs`] - Queue and queue policy listers
//!
//! # Example
//!
//! ```ignore
//! use driftscan::aws::{self, AwsSupplierDeps};
//!
//! async fn example(deps: AwsSupplierDeps) -> anyhow::Result<()> {
//!     let registry = aws::supplier_factory().build_registry(None, &deps)?;
//!     let inventory = registry.drain().await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod s3;
pub mod sqs;

pub use client::{load_sdk_config, AwsS3Client, AwsSqsClient, S3Api, SqsApi};

use crate::provider::ResourceReader;
use crate::resource::{
    ResourceType, SchemaDeserializer, AWS_S3_BUCKET, AWS_S3_BUCKET_ANALYTICS_CONFIGURATION,
    AWS_SQS_QUEUE, AWS_SQS_QUEUE_POLICY,
};
use crate::runner::EnumerationContext;
use crate::supplier::{Lister, ResourceSupplier, Supplier, SupplierFactory};
use anyhow::Result;
use s3::{S3BucketAnalyticsLister, S3BucketLister};
use sqs::{SqsQueueLister, SqsQueuePolicyLister};
use std::sync::Arc;

/// Everything an AWS supplier needs, shared read-only between suppliers
#[derive(Clone)]
pub struct AwsSupplierDeps {
    pub s3: Arc<dyn S3Api>,
    pub sqs: Arc<dyn SqsApi>,
    pub reader: Arc<dyn ResourceReader>,
    pub ctx: EnumerationContext,
    pub parallelism: usize,
}

impl AwsSupplierDeps {
    fn supplier<L: Lister + 'static>(
        &self,
        resource_type: ResourceType,
        lister: L,
    ) -> Result<Box<dyn ResourceSupplier>> {
        let deserializer = SchemaDeserializer::new(resource_type.clone())?;
        Ok(Box::new(Supplier::new(
            resource_type,
            lister,
            Arc::clone(&self.reader),
            Arc::new(deserializer),
            self.ctx.clone(),
            self.parallelism,
        )))
    }
}

/// Factory knowing every supported AWS resource type
pub fn supplier_factory() -> SupplierFactory<AwsSupplierDeps> {
    let mut factory = SupplierFactory::<AwsSupplierDeps>::new();
    factory.register(AWS_S3_BUCKET, |deps| {
        deps.supplier(AWS_S3_BUCKET, S3BucketLister::new(Arc::clone(&deps.s3)))
    });
    factory.register(AWS_S3_BUCKET_ANALYTICS_CONFIGURATION, |deps| {
        deps.supplier(
            AWS_S3_BUCKET_ANALYTICS_CONFIGURATION,
            S3BucketAnalyticsLister::new(Arc::clone(&deps.s3)),
        )
    });
    factory.register(AWS_SQS_QUEUE, |deps| {
        deps.supplier(AWS_SQS_QUEUE, SqsQueueLister::new(Arc::clone(&deps.sqs)))
    });
    factory.register(AWS_SQS_QUEUE_POLICY, |deps| {
        deps.supplier(AWS_SQS_QUEUE_POLICY, SqsQueuePolicyLister::new(Arc::clone(&deps.sqs)))
    });
    factory
}
