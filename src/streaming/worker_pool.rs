//! Background region generation threads

use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};

use crate::core::{Error, Result};
use crate::terrain::TerrainSource;
use crate::voxel::{self, RegionCoord};
use super::inbox::CompletedInbox;
use super::priority::{GenerationQueue, WorkItem};

struct QueueState {
    queue: GenerationQueue,
    running: bool,
    in_flight: usize,
}

struct Shared {
    state: Mutex<QueueState>,
    work_available: Condvar,
    inbox: CompletedInbox,
    source: Arc<dyn TerrainSource>,
    retain_density: bool,
}

/// Fixed set of worker threads pulling the nearest queued region, meshing
/// it and posting the result to the completed inbox.
///
/// Dropping the pool stops and joins every worker. Work still queued at
/// that point is abandoned.
pub struct GenerationPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl GenerationPool {
    pub fn new(
        source: Arc<dyn TerrainSource>,
        worker_count: usize,
        retain_density: bool,
    ) -> Result<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                queue: GenerationQueue::new(),
                running: true,
                in_flight: 0,
            }),
            work_available: Condvar::new(),
            inbox: CompletedInbox::new(),
            source,
            retain_density,
        });

        let mut pool = Self {
            shared,
            workers: Vec::with_capacity(worker_count),
        };

        for index in 0..worker_count {
            let shared = Arc::clone(&pool.shared);
            let handle = std::thread::Builder::new()
                .name(format!("region-worker-{}", index))
                .spawn(move || worker_loop(shared, index))
                .map_err(|e| {
                    Error::Worker(format!("failed to spawn region worker {}: {}", index, e))
                });
            match handle {
                Ok(handle) => pool.workers.push(handle),
                Err(e) => {
                    // Join the workers that did start before bailing out
                    pool.shutdown();
                    return Err(e);
                }
            }
        }

        log::info!("Started {} region workers", worker_count);
        Ok(pool)
    }

    /// Queue regions for generation and wake idle workers
    pub fn enqueue<I>(&self, items: I) -> usize
    where
        I: IntoIterator<Item = WorkItem>,
    {
        let mut state = self.shared.state.lock();
        let before = state.queue.len();
        for item in items {
            state.queue.push(item);
        }
        let added = state.queue.len() - before;
        drop(state);

        if added > 0 {
            self.shared.work_available.notify_all();
        }
        added
    }

    /// Drop queued items that fail `keep`; returns their coordinates.
    /// Items already picked up by a worker are unaffected.
    pub fn retain_queued<F>(&self, keep: F) -> Vec<RegionCoord>
    where
        F: FnMut(&WorkItem) -> bool,
    {
        self.shared.state.lock().queue.retain(keep)
    }

    pub fn inbox(&self) -> &CompletedInbox {
        &self.shared.inbox
    }

    pub fn queued_len(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    /// Regions currently being generated
    pub fn in_flight(&self) -> usize {
        self.shared.state.lock().in_flight
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn is_running(&self) -> bool {
        self.shared.state.lock().running
    }

    /// Stop accepting work, wake every worker and wait for them to exit.
    /// Workers finish the region they are on; the rest of the queue is
    /// discarded.
    pub fn shutdown(&mut self) {
        {
            let mut state = self.shared.state.lock();
            if !state.running && self.workers.is_empty() {
                return;
            }
            state.running = false;
            state.queue.clear();
        }
        self.shared.work_available.notify_all();

        let count = self.workers.len();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::error!("Region worker panicked during shutdown");
            }
        }
        if count > 0 {
            log::info!("Stopped {} region workers", count);
        }
    }
}

impl Drop for GenerationPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: Arc<Shared>, index: usize) {
    log::debug!("Region worker {} started", index);

    loop {
        let item = {
            let mut state = shared.state.lock();
            while state.running && state.queue.is_empty() {
                shared.work_available.wait(&mut state);
            }
            if !state.running {
                break;
            }
            let Some(item) = state.queue.pop() else {
                continue;
            };
            state.in_flight += 1;
            item
        };

        let package = voxel::generate_region(
            item.coord,
            shared.source.as_ref(),
            shared.retain_density,
        );
        shared.inbox.push(package);

        shared.state.lock().in_flight -= 1;
    }

    log::debug!("Region worker {} stopped", index);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Vec3;
    use crate::terrain::FlatTerrain;
    use std::time::{Duration, Instant};

    fn flat() -> Arc<dyn TerrainSource> {
        Arc::new(FlatTerrain::new(100.0))
    }

    fn wait_for_inbox(pool: &GenerationPool, count: usize) -> bool {
        let deadline = Instant::now() + Duration::from_secs(30);
        while Instant::now() < deadline {
            if pool.inbox().len() >= count {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_generates_queued_regions() {
        let pool = GenerationPool::new(flat(), 2, false).unwrap();
        assert_eq!(pool.worker_count(), 2);

        let items: Vec<_> = (0..4)
            .map(|x| WorkItem::from_viewer(RegionCoord::new(x, 0), Vec3::ZERO))
            .collect();
        assert_eq!(pool.enqueue(items), 4);
        assert!(wait_for_inbox(&pool, 4));

        let mut coords: Vec<_> = pool.inbox().drain().into_iter().map(|p| p.coord.x).collect();
        coords.sort();
        assert_eq!(coords, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_zero_workers_leaves_queue() {
        let pool = GenerationPool::new(flat(), 0, false).unwrap();
        pool.enqueue([WorkItem::from_viewer(RegionCoord::new(0, 0), Vec3::ZERO)]);
        assert_eq!(pool.queued_len(), 1);
        assert_eq!(pool.in_flight(), 0);
        assert!(pool.inbox().is_empty());
    }

    #[test]
    fn test_retain_queued() {
        let pool = GenerationPool::new(flat(), 0, false).unwrap();
        pool.enqueue((0..5).map(|x| WorkItem::from_viewer(RegionCoord::new(x, 0), Vec3::ZERO)));
        let removed = pool.retain_queued(|item| item.coord.x < 2);
        assert_eq!(removed.len(), 3);
        assert_eq!(pool.queued_len(), 2);
    }

    #[test]
    fn test_shutdown_discards_queue() {
        let mut pool = GenerationPool::new(flat(), 0, false).unwrap();
        pool.enqueue((0..3).map(|x| WorkItem::from_viewer(RegionCoord::new(x, 0), Vec3::ZERO)));
        pool.shutdown();
        assert_eq!(pool.queued_len(), 0);
        assert!(pool.inbox().is_empty());
    }

    #[test]
    fn test_shutdown_joins_workers() {
        let mut pool = GenerationPool::new(flat(), 3, false).unwrap();
        pool.enqueue((0..50).map(|x| WorkItem::from_viewer(RegionCoord::new(x, x), Vec3::ZERO)));
        pool.shutdown();
        assert!(!pool.is_running());
        assert_eq!(pool.worker_count(), 0);
        assert_eq!(pool.in_flight(), 0);

        // Idempotent
        pool.shutdown();
    }
}
