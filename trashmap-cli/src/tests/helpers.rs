//! Helpers for driving CLI commands against in-memory backends.

use std::future::Future;

use serde_json::Value;
use trashmap_core::test_support::{MemoryKeyValueStore, StubConnectivity, StubPointSource};
use trashmap_core::{POINT_CACHE_KEY, Point, PointCache, PointRepository};

pub(super) fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("build runtime")
        .block_on(future)
}

/// Store holding `points` under the cache key.
pub(super) fn cached_store(points: &[Point]) -> MemoryKeyValueStore {
    let store = MemoryKeyValueStore::default();
    let raw = serde_json::to_string(points).expect("encode points");
    store.insert(POINT_CACHE_KEY, &raw);
    store
}

pub(super) fn repository(
    source: StubPointSource,
    connectivity: StubConnectivity,
    store: MemoryKeyValueStore,
) -> PointRepository {
    PointRepository::new(
        Box::new(source),
        Box::new(connectivity),
        PointCache::new(Box::new(store)),
    )
}

/// Parse captured command output as JSON.
pub(super) fn parse_output(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("output is JSON")
}

/// `field` of every element in a JSON array.
pub(super) fn column<'a>(output: &'a Value, field: &str) -> Vec<&'a Value> {
    output
        .as_array()
        .expect("output is an array")
        .iter()
        .map(|row| &row[field])
        .collect()
}
