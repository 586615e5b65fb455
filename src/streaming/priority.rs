//! Nearest-first generation queue

use crate::core::types::Vec3;
use crate::voxel::RegionCoord;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A region waiting to be generated
#[derive(Clone, Copy, Debug)]
pub struct WorkItem {
    pub coord: RegionCoord,
    /// Distance from the viewer to the region center when queued
    pub distance: f32,
}

impl WorkItem {
    /// Priority from the viewer's distance to the region's world center
    pub fn from_viewer(coord: RegionCoord, viewer: Vec3) -> Self {
        Self {
            coord,
            distance: viewer.distance(coord.world_center()),
        }
    }
}

impl Eq for WorkItem {}

impl PartialEq for WorkItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for WorkItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: reverse so the nearest pops first.
        // Ties break on the coordinate to keep pop order deterministic.
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.coord.cmp(&self.coord))
    }
}

impl PartialOrd for WorkItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-priority queue of regions, smallest distance first
#[derive(Debug, Default)]
pub struct GenerationQueue {
    heap: BinaryHeap<WorkItem>,
}

impl GenerationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: WorkItem) {
        self.heap.push(item);
    }

    /// Remove and return the nearest item
    pub fn pop(&mut self) -> Option<WorkItem> {
        self.heap.pop()
    }

    pub fn peek(&self) -> Option<&WorkItem> {
        self.heap.peek()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Keep only items matching `keep`, returning the coordinates dropped
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<RegionCoord>
    where
        F: FnMut(&WorkItem) -> bool,
    {
        let mut removed = Vec::new();
        self.heap.retain(|item| {
            if keep(item) {
                true
            } else {
                removed.push(item.coord);
                false
            }
        });
        removed
    }
}
