//! SQS listers
//!
//! Queues are identified by their URL. Queue policies have no listing of
//! their own: every queue carries one, so they are enumerated through the
//! queue listing.

use super::client::{drain_pages, SqsApi};
use crate::resource::AWS_SQS_QUEUE;
use crate::supplier::{ListError, Lister, ReadTarget};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Every queue URL in the account's region, all pages drained
pub async fn list_queue_urls(client: &dyn SqsApi) -> Result<Vec<String>> {
    drain_pages(move |token| client.list_queues(token)).await
}

/// Lists `aws_sqs_queue`
pub struct SqsQueueLister {
    client: Arc<dyn SqsApi>,
}

impl SqsQueueLister {
    pub fn new(client: Arc<dyn SqsApi>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Lister for SqsQueueLister {
    async fn list(&self) -> Result<Vec<ReadTarget>, ListError> {
        let urls = list_queue_urls(self.client.as_ref())
            .await
            .map_err(ListError::Direct)?;
        Ok(urls.into_iter().map(ReadTarget::new).collect())
    }
}

/// Lists `aws_sqs_queue_policy`, one per queue
pub struct SqsQueuePolicyLister {
    client: Arc<dyn SqsApi>,
}

impl SqsQueuePolicyLister {
    pub fn new(client: Arc<dyn SqsApi>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Lister for SqsQueuePolicyLister {
    async fn list(&self) -> Result<Vec<ReadTarget>, ListError> {
        let urls = list_queue_urls(self.client.as_ref())
            .await
            .map_err(|err| ListError::dependency(AWS_SQS_QUEUE, err))?;
        Ok(urls.into_iter().map(ReadTarget::new).collect())
    }
}
