//! Property-based tests using proptest
//!
//! These tests verify that suppliers return complete sets, fail as a whole,
//! and never exceed their concurrency width, over randomized accounts.

mod common;

use common::{deps, queue_url, FakeReader, FakeS3, FakeSqs};
use driftscan::aws;
use driftscan::resource::AWS_SQS_QUEUE;
use driftscan::{Resource, SupplyError};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Distinct queue names
fn arb_queue_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z][a-z0-9-]{0,20}(\\.fifo)?", 0..40)
        .prop_map(|names| names.into_iter().collect())
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("runtime should build")
}

fn enumerate_queues(
    names: &[String],
    reader: Arc<FakeReader>,
    parallelism: usize,
) -> Result<Vec<Resource>, SupplyError> {
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut deps = deps(FakeS3::default(), FakeSqs::with_queues(&refs), reader);
    deps.parallelism = parallelism;

    let supplier = aws::supplier_factory()
        .build(&AWS_SQS_QUEUE, &deps)
        .expect("supplier should build");
    runtime().block_on(supplier.resources())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Every listed queue comes back exactly once, sorted by id
    #[test]
    fn every_listed_queue_is_returned(
        names in arb_queue_names(),
        parallelism in 1usize..8,
    ) {
        let resources = enumerate_queues(&names, Arc::new(FakeReader::new()), parallelism).unwrap();

        let expected: BTreeSet<String> = names.iter().map(|n| queue_url(n)).collect();
        let ids: Vec<String> = resources.iter().map(|r| r.id().to_string()).collect();
        prop_assert_eq!(ids, expected.into_iter().collect::<Vec<_>>());
    }

    /// Reads never run wider than the configured parallelism
    #[test]
    fn reads_respect_parallelism(
        names in arb_queue_names(),
        parallelism in 1usize..6,
    ) {
        let reader = Arc::new(FakeReader::yielding(3));
        enumerate_queues(&names, Arc::clone(&reader), parallelism).unwrap();

        prop_assert!(reader.peak_in_flight() <= parallelism);
        prop_assert_eq!(reader.requests().len(), names.len());
    }

    /// A single failed read means no resources at all
    #[test]
    fn one_failed_read_fails_the_type(
        names in arb_queue_names().prop_filter("need a queue", |n| !n.is_empty()),
        pick in any::<prop::sample::Index>(),
        parallelism in 1usize..8,
    ) {
        let failing = queue_url(&names[pick.index(names.len())]);
        let reader = Arc::new(FakeReader::failing_on(&[failing.as_str()]));

        let result = enumerate_queues(&names, reader, parallelism);
        prop_assert!(matches!(result, Err(SupplyError::Read(_))));
    }
}
