//! Deterministic test doubles for the platform and network seams.
//!
//! Every double is cheap to clone and clones share state, so a test can hand
//! one copy to the code under test and inspect the other.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use geo::Coord;

use crate::{
    AnimationId, CameraControl, ConnectivityProbe, DetailPanel, DeviceLocation, KeyValueError,
    KeyValueStore, LocationError, Material, MaterialId, MaterialSource, MaterialSourceError,
    PermissionStatus, Point, PointSource, Region, RemoteFetchError, SearchError, SearchQuery,
    SearchSource,
};

/// Three collection points around São Paulo.
pub fn sample_points() -> Vec<Point> {
    vec![
        Point::new(
            "1",
            "Ecoponto Sé",
            Coord {
                x: -46.634,
                y: -23.550,
            },
        )
        .with_materials(["Papel", "Vidro"], [MaterialId(1), MaterialId(2)]),
        Point::new(
            "2",
            "Mercado Pinheiros",
            Coord {
                x: -46.692,
                y: -23.566,
            },
        )
        .with_materials(["Pilhas"], [MaterialId(3)]),
        Point::new(
            "3",
            "Cooperativa Mooca",
            Coord {
                x: -46.599,
                y: -23.560,
            },
        )
        .with_materials(
            ["Papel", "Metal", "Plástico"],
            [MaterialId(1), MaterialId(4), MaterialId(5)],
        ),
    ]
}

/// A stale snapshot that differs from [`sample_points`].
pub fn other_points() -> Vec<Point> {
    vec![Point::new(
        "9",
        "Ecoponto Antigo",
        Coord {
            x: -43.172,
            y: -22.906,
        },
    )]
}

/// In-memory [`KeyValueStore`] recording successful writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    values: Rc<RefCell<HashMap<String, String>>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryKeyValueStore {
    /// Seed `key` without counting a write.
    pub fn insert(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    /// Number of `set` calls served.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

#[async_trait(?Send)]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueError> {
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KeyValueError> {
        self.insert(key, value);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// [`KeyValueStore`] whose every operation fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingKeyValueStore;

#[async_trait(?Send)]
impl KeyValueStore for FailingKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueError> {
        Err(KeyValueError::Read {
            key: key.to_owned(),
            source: io::Error::other("disk unavailable").into(),
        })
    }

    async fn set(&self, key: &str, _value: &str) -> Result<(), KeyValueError> {
        Err(KeyValueError::Write {
            key: key.to_owned(),
            source: io::Error::other("disk full").into(),
        })
    }
}

/// Wraps a [`MemoryKeyValueStore`] and delays every read.
#[derive(Debug, Clone)]
pub struct DelayedKeyValueStore {
    inner: MemoryKeyValueStore,
    delay: Duration,
}

impl DelayedKeyValueStore {
    pub fn new(inner: MemoryKeyValueStore, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait(?Send)]
impl KeyValueStore for DelayedKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueError> {
        tokio::time::sleep(self.delay).await;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KeyValueError> {
        self.inner.set(key, value).await
    }
}

/// [`PointSource`] returning a canned response.
#[derive(Debug, Clone)]
pub struct StubPointSource {
    response: Result<Vec<Point>, RemoteFetchError>,
    delay: Duration,
    calls: Rc<Cell<usize>>,
}

impl StubPointSource {
    #[must_use]
    pub fn with_points(points: Vec<Point>) -> Self {
        Self::respond(Ok(points))
    }

    #[must_use]
    pub fn with_error(error: RemoteFetchError) -> Self {
        Self::respond(Err(error))
    }

    /// Answer only after `delay` has elapsed.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of fetches attempted.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    fn respond(response: Result<Vec<Point>, RemoteFetchError>) -> Self {
        Self {
            response,
            delay: Duration::ZERO,
            calls: Rc::default(),
        }
    }
}

#[async_trait(?Send)]
impl PointSource for StubPointSource {
    async fn fetch_points(&self) -> Result<Vec<Point>, RemoteFetchError> {
        self.calls.set(self.calls.get() + 1);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.response.clone()
    }
}

/// [`ConnectivityProbe`] with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct StubConnectivity {
    online: bool,
}

impl StubConnectivity {
    pub const fn online() -> Self {
        Self { online: true }
    }

    pub const fn offline() -> Self {
        Self { online: false }
    }
}

#[async_trait(?Send)]
impl ConnectivityProbe for StubConnectivity {
    async fn is_online(&self) -> bool {
        self.online
    }
}

/// [`DeviceLocation`] with scripted permission and fixes.
#[derive(Debug, Clone)]
pub struct StubDeviceLocation {
    permission: PermissionStatus,
    last_known: Option<Coord<f64>>,
    current: Result<Coord<f64>, LocationError>,
    delay: Duration,
    fix_requests: Rc<Cell<usize>>,
}

impl StubDeviceLocation {
    /// A device whose user refuses location access.
    #[must_use]
    pub fn denied() -> Self {
        Self {
            permission: PermissionStatus::Denied,
            last_known: None,
            current: Err(LocationError::PermissionDenied),
            delay: Duration::ZERO,
            fix_requests: Rc::default(),
        }
    }

    /// A device with access granted and the given fixes.
    #[must_use]
    pub fn granted(last_known: Option<Coord<f64>>, current: Result<Coord<f64>, LocationError>) -> Self {
        Self {
            permission: PermissionStatus::Granted,
            last_known,
            current,
            delay: Duration::ZERO,
            fix_requests: Rc::default(),
        }
    }

    /// Delay the permission answer.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of last-known or fresh fixes requested.
    pub fn fix_requests(&self) -> usize {
        self.fix_requests.get()
    }

    fn count_fix(&self) {
        self.fix_requests.set(self.fix_requests.get() + 1);
    }
}

#[async_trait(?Send)]
impl DeviceLocation for StubDeviceLocation {
    async fn request_permission(&self) -> PermissionStatus {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.permission
    }

    async fn last_known(&self) -> Result<Option<Coord<f64>>, LocationError> {
        self.count_fix();
        Ok(self.last_known)
    }

    async fn current(&self) -> Result<Coord<f64>, LocationError> {
        self.count_fix();
        self.current.clone()
    }
}

/// A command observed by [`CommandLog`].
#[derive(Debug, Clone, PartialEq)]
pub enum MapCommand {
    Animate(AnimationId, Region),
    Expand,
    Collapse,
}

/// Records camera and panel commands in issue order.
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    commands: Rc<RefCell<Vec<MapCommand>>>,
}

impl CommandLog {
    pub fn commands(&self) -> Vec<MapCommand> {
        self.commands.borrow().clone()
    }

    pub fn clear(&self) {
        self.commands.borrow_mut().clear();
    }

    fn push(&self, command: MapCommand) {
        self.commands.borrow_mut().push(command);
    }
}

impl CameraControl for CommandLog {
    fn animate_to(&self, animation: AnimationId, region: Region, _duration: Duration) {
        self.push(MapCommand::Animate(animation, region));
    }
}

impl DetailPanel for CommandLog {
    fn expand(&self) {
        self.push(MapCommand::Expand);
    }

    fn collapse(&self) {
        self.push(MapCommand::Collapse);
    }
}

/// [`SearchSource`] that applies the query to an in-memory catalogue.
#[derive(Debug, Clone, Default)]
pub struct MemorySearchSource {
    points: Vec<Point>,
}

impl MemorySearchSource {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }
}

#[async_trait(?Send)]
impl SearchSource for MemorySearchSource {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Point>, SearchError> {
        Ok(self
            .points
            .iter()
            .filter(|point| query.matches(point))
            .cloned()
            .collect())
    }
}

/// [`SearchSource`] returning a canned response regardless of the query.
#[derive(Debug, Clone)]
pub struct StubSearchSource {
    response: Result<Vec<Point>, SearchError>,
}

impl StubSearchSource {
    #[must_use]
    pub fn with_points(points: Vec<Point>) -> Self {
        Self {
            response: Ok(points),
        }
    }

    #[must_use]
    pub fn with_error(error: SearchError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

#[async_trait(?Send)]
impl SearchSource for StubSearchSource {
    async fn search(&self, _query: &SearchQuery) -> Result<Vec<Point>, SearchError> {
        self.response.clone()
    }
}

/// [`MaterialSource`] returning a canned response.
#[derive(Debug, Clone)]
pub struct StubMaterialSource {
    response: Result<Vec<Material>, MaterialSourceError>,
}

impl StubMaterialSource {
    #[must_use]
    pub fn with_materials(materials: Vec<Material>) -> Self {
        Self {
            response: Ok(materials),
        }
    }

    #[must_use]
    pub fn with_error(error: MaterialSourceError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

#[async_trait(?Send)]
impl MaterialSource for StubMaterialSource {
    async fn fetch_materials(&self) -> Result<Vec<Material>, MaterialSourceError> {
        self.response.clone()
    }
}
