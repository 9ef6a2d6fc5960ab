//! Behavioural tests for cache and remote point synchronisation.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use trashmap_core::test_support::{
    MemoryKeyValueStore, StubConnectivity, StubPointSource, other_points, sample_points,
};
use trashmap_core::{POINT_CACHE_KEY, Point, PointCache, PointRepository, RemoteFetchError};

#[derive(Debug)]
struct Network {
    source: StubPointSource,
    connectivity: StubConnectivity,
}

#[fixture]
fn store() -> MemoryKeyValueStore {
    MemoryKeyValueStore::default()
}

#[fixture]
fn network() -> RefCell<Network> {
    RefCell::new(Network {
        source: StubPointSource::with_points(Vec::new()),
        connectivity: StubConnectivity::offline(),
    })
}

#[fixture]
fn displayed() -> RefCell<Vec<Point>> {
    RefCell::new(Vec::new())
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("build runtime")
        .block_on(future)
}

#[given("a cached snapshot of stale points")]
fn given_cached(#[from(store)] store: &MemoryKeyValueStore) {
    let raw = serde_json::to_string(&other_points()).expect("encode points");
    store.insert(POINT_CACHE_KEY, &raw);
}

#[given("the network is online with fresh points")]
fn given_online(#[from(network)] network: &RefCell<Network>) {
    *network.borrow_mut() = Network {
        source: StubPointSource::with_points(sample_points()),
        connectivity: StubConnectivity::online(),
    };
}

#[given("the network is offline")]
fn given_offline(#[from(network)] network: &RefCell<Network>) {
    *network.borrow_mut() = Network {
        source: StubPointSource::with_points(sample_points()),
        connectivity: StubConnectivity::offline(),
    };
}

#[given("the point service is failing")]
fn given_failing(#[from(network)] network: &RefCell<Network>) {
    *network.borrow_mut() = Network {
        source: StubPointSource::with_error(RemoteFetchError::Network {
            url: "https://example.org/rest/v1/rpc/listar_pontos_mapa".into(),
            message: "connection reset".into(),
        }),
        connectivity: StubConnectivity::online(),
    };
}

#[when("the repository refreshes")]
fn when_refresh(
    #[from(store)] store: &MemoryKeyValueStore,
    #[from(network)] network: &RefCell<Network>,
    #[from(displayed)] displayed: &RefCell<Vec<Point>>,
) {
    let network = network.borrow();
    let repository = PointRepository::new(
        Box::new(network.source.clone()),
        Box::new(network.connectivity),
        PointCache::new(Box::new(store.clone())),
    );
    *displayed.borrow_mut() = block_on(repository.refresh());
}

#[then("the fresh points are displayed")]
fn then_fresh(#[from(displayed)] displayed: &RefCell<Vec<Point>>) {
    assert_eq!(*displayed.borrow(), sample_points());
}

#[then("the stale points are displayed")]
fn then_stale(#[from(displayed)] displayed: &RefCell<Vec<Point>>) {
    assert_eq!(*displayed.borrow(), other_points());
}

#[then("the cache holds the fresh points")]
fn then_cache_fresh(#[from(store)] store: &MemoryKeyValueStore) {
    let raw = store.value(POINT_CACHE_KEY).expect("cache entry");
    let cached: Vec<Point> = serde_json::from_str(&raw).expect("decode cache");
    assert_eq!(cached, sample_points());
}

#[then("the cache was not rewritten")]
fn then_cache_untouched(#[from(store)] store: &MemoryKeyValueStore) {
    assert_eq!(store.writes(), 0);
}

#[scenario(path = "tests/features/point_sync.feature", index = 0)]
fn online_refresh(
    store: MemoryKeyValueStore,
    network: RefCell<Network>,
    displayed: RefCell<Vec<Point>>,
) {
    let _ = (store, network, displayed);
}

#[scenario(path = "tests/features/point_sync.feature", index = 1)]
fn offline_refresh(
    store: MemoryKeyValueStore,
    network: RefCell<Network>,
    displayed: RefCell<Vec<Point>>,
) {
    let _ = (store, network, displayed);
}

#[scenario(path = "tests/features/point_sync.feature", index = 2)]
fn failed_refresh(
    store: MemoryKeyValueStore,
    network: RefCell<Network>,
    displayed: RefCell<Vec<Point>>,
) {
    let _ = (store, network, displayed);
}
