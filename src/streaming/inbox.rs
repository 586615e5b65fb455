//! Hand-off of finished meshes from workers to the integration thread

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::voxel::MeshPackage;

/// FIFO of completed packages, filled by workers and drained once per
/// update by the integration thread.
#[derive(Debug, Default)]
pub struct CompletedInbox {
    packages: Mutex<VecDeque<MeshPackage>>,
}

impl CompletedInbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, package: MeshPackage) {
        self.packages.lock().push_back(package);
    }

    /// Take everything currently queued, in arrival order
    pub fn drain(&self) -> VecDeque<MeshPackage> {
        std::mem::take(&mut *self.packages.lock())
    }

    /// Put unprocessed packages back ahead of anything that arrived since
    /// the last drain
    pub fn restore_front(&self, mut leftover: VecDeque<MeshPackage>) {
        if leftover.is_empty() {
            return;
        }
        let mut packages = self.packages.lock();
        leftover.append(&mut packages);
        *packages = leftover;
    }

    pub fn len(&self) -> usize {
        self.packages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::{MeshData, RegionCoord};

    fn package(x: i32) -> MeshPackage {
        MeshPackage::new(RegionCoord::new(x, 0), MeshData::new())
    }

    #[test]
    fn test_drain_in_arrival_order() {
        let inbox = CompletedInbox::new();
        for x in 0..4 {
            inbox.push(package(x));
        }
        let drained: Vec<_> = inbox.drain().into_iter().map(|p| p.coord.x).collect();
        assert_eq!(drained, vec![0, 1, 2, 3]);
        assert!(inbox.is_empty());
    }

    #[test]
    fn test_restore_front_keeps_order() {
        let inbox = CompletedInbox::new();
        for x in 0..3 {
            inbox.push(package(x));
        }
        let mut batch = inbox.drain();
        let _first = batch.pop_front();

        // Arrives while the batch is being processed
        inbox.push(package(10));
        inbox.restore_front(batch);

        let order: Vec<_> = inbox.drain().into_iter().map(|p| p.coord.x).collect();
        assert_eq!(order, vec![1, 2, 10]);
    }
}
