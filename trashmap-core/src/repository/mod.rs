//! Reconcile the remote point set with the local cache.
//!
//! A refresh cycle reads the cached snapshot and, concurrently, probes
//! connectivity and fetches the authoritative set. Whichever resolves is
//! offered to the displayed [`PointSet`]; a remote success always wins over
//! the cache. Only a successful remote fetch rewrites the cache.

mod snapshot;
mod source;

use std::cell::RefCell;

use futures_util::join;
use log::{debug, info, warn};

use crate::{Point, PointCache};

pub use snapshot::{PointOrigin, PointSet};
pub use source::{ConnectivityProbe, PointSource, RemoteFetchError};

/// How the network half of a refresh cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    /// Connectivity was unavailable; no fetch was attempted.
    Offline,
    /// The remote set was fetched and displayed.
    Fetched,
    /// The fetch failed; the previous set stays displayed.
    Failed(RemoteFetchError),
}

/// Outcome of [`PointRepository::refresh_with`].
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    pub status: RemoteStatus,
    /// Displayed set once both halves of the cycle completed.
    pub points: PointSet,
}

/// Source of the point set shown on the map.
///
/// # Examples
/// ```
/// use trashmap_core::test_support::{
///     MemoryKeyValueStore, StubConnectivity, StubPointSource, sample_points,
/// };
/// use trashmap_core::{PointCache, PointRepository};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let repository = PointRepository::new(
///     Box::new(StubPointSource::with_points(sample_points())),
///     Box::new(StubConnectivity::online()),
///     PointCache::new(Box::new(MemoryKeyValueStore::default())),
/// );
/// let points = repository.refresh().await;
/// assert_eq!(points, sample_points());
/// # });
/// ```
pub struct PointRepository {
    source: Box<dyn PointSource>,
    connectivity: Box<dyn ConnectivityProbe>,
    cache: PointCache,
    current: RefCell<PointSet>,
}

impl std::fmt::Debug for PointRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointRepository")
            .field("cache", &self.cache)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl PointRepository {
    /// Combine the remote source, connectivity probe and local snapshot.
    pub fn new(
        source: Box<dyn PointSource>,
        connectivity: Box<dyn ConnectivityProbe>,
        cache: PointCache,
    ) -> Self {
        Self {
            source,
            connectivity,
            cache,
            current: RefCell::new(PointSet::default()),
        }
    }

    /// The set currently displayed, including results of earlier cycles.
    pub fn snapshot(&self) -> PointSet {
        self.current.borrow().clone()
    }

    /// Run a refresh cycle and return the resulting points.
    pub async fn refresh(&self) -> Vec<Point> {
        self.refresh_with(|_| {}).await.points.into_points()
    }

    /// Run a refresh cycle, calling `on_update` each time the displayed set
    /// changes.
    ///
    /// The cached snapshot, when present, is reported as an interim result
    /// before the network has answered. Failures never escape: they are
    /// logged and reflected in [`RefreshReport::status`].
    pub async fn refresh_with<F>(&self, on_update: F) -> RefreshReport
    where
        F: FnMut(&PointSet),
    {
        let notify = RefCell::new(on_update);

        let cached = async {
            if let Some(points) = self.cache.load().await {
                debug!("loaded {} cached points", points.len());
                self.offer(PointOrigin::Cache, points, &notify);
            }
        };

        let remote = async {
            if !self.connectivity.is_online().await {
                info!("offline; keeping cached points for this cycle");
                return RemoteStatus::Offline;
            }
            match self.source.fetch_points().await {
                Ok(points) => {
                    info!("fetched {} points", points.len());
                    self.offer(PointOrigin::Remote, points.clone(), &notify);
                    self.cache.save(&points).await;
                    RemoteStatus::Fetched
                }
                Err(err) => {
                    warn!("point refresh failed, keeping previous points: {err}");
                    RemoteStatus::Failed(err)
                }
            }
        };

        let ((), status) = join!(cached, remote);
        RefreshReport {
            status,
            points: self.snapshot(),
        }
    }

    fn offer<F>(&self, origin: PointOrigin, points: Vec<Point>, notify: &RefCell<F>)
    where
        F: FnMut(&PointSet),
    {
        let accepted = self.current.borrow_mut().offer(origin, points);
        if accepted {
            let current = self.current.borrow();
            (notify.borrow_mut())(&current);
        } else {
            debug!("discarding {origin:?} points superseded by a remote result");
        }
    }
}
