//! Keeps the set of meshed regions around the viewer up to date

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use crate::core::time::UpdateThrottle;
use crate::core::{Mat4, Result, Vec3};
use crate::math::{Aabb, Frustum};
use crate::render::{DrawContext, MeshRenderer};
use crate::terrain::TerrainSource;
use crate::voxel::{DensityField, MeshPackage, RegionCoord};
use super::config::StreamingConfig;
use super::priority::WorkItem;
use super::worker_pool::GenerationPool;

/// A region whose mesh has been uploaded
pub struct LoadedRegion<H> {
    pub coord: RegionCoord,
    pub handle: H,
    pub bounds: Aabb,
    pub triangle_count: usize,
    pub density: Option<DensityField>,
}

/// Running counters for monitoring
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamingStats {
    pub loaded: usize,
    /// Queued, generating, or completed but not yet integrated
    pub pending: usize,
    pub queued: usize,
    pub in_flight: usize,
    /// Completed packages waiting for integration
    pub backlog: usize,
    pub integrated_total: u64,
    pub evicted_total: u64,
    pub discarded_empty: u64,
    pub discarded_duplicate: u64,
    pub discarded_stale: u64,
    pub pruned_total: u64,
    pub recomputes: u64,
    pub last_drawn: usize,
    pub last_culled: usize,
}

/// Streams regions in and out around a moving viewer.
///
/// Everything here runs on the integration thread; only generation happens
/// on the worker pool. Each region key is in at most one of: pending
/// (queued, generating or waiting in the inbox) or loaded.
pub struct WorldStreamer<R: MeshRenderer> {
    config: StreamingConfig,
    renderer: R,
    pool: GenerationPool,
    loaded: HashMap<RegionCoord, LoadedRegion<R::Handle>>,
    pending: HashSet<RegionCoord>,
    viewer_region: Option<RegionCoord>,
    throttle: UpdateThrottle,
    stats: StreamingStats,
}

impl<R: MeshRenderer> WorldStreamer<R> {
    pub fn new(
        config: StreamingConfig,
        source: Arc<dyn TerrainSource>,
        renderer: R,
    ) -> Result<Self> {
        config.validate()?;
        let workers = config.resolved_worker_threads();
        let pool = GenerationPool::new(source, workers, config.retain_density)?;
        Ok(Self::from_parts(config, pool, renderer))
    }

    pub(crate) fn from_parts(config: StreamingConfig, pool: GenerationPool, renderer: R) -> Self {
        let throttle = UpdateThrottle::new(config.update_interval());
        Self {
            config,
            renderer,
            pool,
            loaded: HashMap::new(),
            pending: HashSet::new(),
            viewer_region: None,
            throttle,
            stats: StreamingStats::default(),
        }
    }

    /// Per-frame tick. Recomputes the wanted region set at most once per
    /// update interval, then integrates completed meshes within the frame
    /// budget. Returns the number of regions integrated.
    pub fn update(&mut self, viewer: Vec3) -> usize {
        if self.throttle.ready(Instant::now()) {
            let region = RegionCoord::from_world_pos(viewer);
            if self.viewer_region != Some(region) || self.loaded.is_empty() {
                self.recompute(region, viewer);
            }
        }
        self.integrate_completed()
    }

    /// Re-center on `region`: request missing regions, prune stale queue
    /// entries and evict far regions.
    fn recompute(&mut self, region: RegionCoord, viewer: Vec3) {
        if self.viewer_region != Some(region) {
            log::debug!("Viewer entered region {}", region);
        }
        self.viewer_region = Some(region);
        self.stats.recomputes += 1;

        self.prune_queue(region);
        self.queue_regions(region, viewer);
        self.unload_regions(region);
    }

    fn queue_regions(&mut self, center: RegionCoord, viewer: Vec3) {
        let mut items = Vec::new();
        for coord in center.square_around(self.config.load_radius) {
            if self.loaded.contains_key(&coord) || self.pending.contains(&coord) {
                continue;
            }
            self.pending.insert(coord);
            items.push(WorkItem::from_viewer(coord, viewer));
        }

        if !items.is_empty() {
            log::debug!("Queued {} regions around {}", items.len(), center);
            self.pool.enqueue(items);
        }
    }

    fn prune_queue(&mut self, center: RegionCoord) {
        let radius = self.config.unload_radius;
        let removed = self
            .pool
            .retain_queued(|item| item.coord.chebyshev_distance(&center) <= radius);
        if removed.is_empty() {
            return;
        }
        for coord in &removed {
            self.pending.remove(coord);
        }
        self.stats.pruned_total += removed.len() as u64;
        log::debug!("Dropped {} queued regions out of range", removed.len());
    }

    fn unload_regions(&mut self, center: RegionCoord) {
        let radius = self.config.unload_radius;
        let far: Vec<RegionCoord> = self
            .loaded
            .keys()
            .filter(|coord| coord.chebyshev_distance(&center) > radius)
            .copied()
            .collect();

        for coord in &far {
            if let Some(region) = self.loaded.remove(coord) {
                self.renderer.release(region.handle);
            }
        }
        if !far.is_empty() {
            self.stats.evicted_total += far.len() as u64;
            log::debug!("Evicted {} regions, {} loaded", far.len(), self.loaded.len());
        }
    }

    /// Integrate up to `max_integrations_per_tick` completed meshes in
    /// arrival order. Empty, duplicate and out-of-range packages are
    /// dropped without counting against the budget. Unprocessed packages
    /// stay at the front of the inbox for the next call.
    pub fn integrate_completed(&mut self) -> usize {
        let mut batch = self.pool.inbox().drain();
        if batch.is_empty() {
            return 0;
        }

        let budget = self.config.max_integrations_per_tick;
        let mut integrated = 0;
        while integrated < budget {
            let Some(package) = batch.pop_front() else {
                break;
            };
            if self.integrate(package) {
                integrated += 1;
            }
        }

        self.requeue(batch);
        integrated
    }

    fn requeue(&self, leftover: VecDeque<MeshPackage>) {
        self.pool.inbox().restore_front(leftover);
    }

    fn integrate(&mut self, package: MeshPackage) -> bool {
        let coord = package.coord;
        self.pending.remove(&coord);

        if !package.has_geometry {
            self.stats.discarded_empty += 1;
            return false;
        }
        if self.loaded.contains_key(&coord) {
            self.stats.discarded_duplicate += 1;
            log::warn!("Region {} completed twice, keeping the first", coord);
            return false;
        }
        if let Some(center) = self.viewer_region {
            if coord.chebyshev_distance(&center) > self.config.unload_radius {
                self.stats.discarded_stale += 1;
                return false;
            }
        }

        let handle = self.renderer.upload(&package.mesh);
        self.loaded.insert(
            coord,
            LoadedRegion {
                coord,
                handle,
                bounds: coord.bounds(),
                triangle_count: package.mesh.triangle_count(),
                density: package.density,
            },
        );
        self.stats.integrated_total += 1;
        log::trace!(
            "Integrated region {} ({} triangles, built in {:?})",
            coord,
            package.mesh.triangle_count(),
            package.build_time
        );
        true
    }

    /// Loaded regions whose bounds intersect the view frustum
    pub fn visible_regions(&self, view_projection: &Mat4) -> Vec<RegionCoord> {
        let frustum = Frustum::from_view_projection(view_projection);
        self.loaded
            .values()
            .filter(|region| frustum.intersects_aabb(&region.bounds))
            .map(|region| region.coord)
            .collect()
    }

    /// Draw every loaded region inside the frustum; returns the draw count
    pub fn draw(&mut self, ctx: &DrawContext) -> usize {
        let frustum = Frustum::from_view_projection(&ctx.view_projection);
        let mut drawn = 0;
        for region in self.loaded.values() {
            if frustum.intersects_aabb(&region.bounds) {
                self.renderer.draw(&region.handle, ctx);
                drawn += 1;
            }
        }
        self.stats.last_drawn = drawn;
        self.stats.last_culled = self.loaded.len() - drawn;
        drawn
    }

    pub fn is_loaded(&self, coord: &RegionCoord) -> bool {
        self.loaded.contains_key(coord)
    }

    pub fn is_pending(&self, coord: &RegionCoord) -> bool {
        self.pending.contains(coord)
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn loaded_regions(&self) -> impl Iterator<Item = &LoadedRegion<R::Handle>> {
        self.loaded.values()
    }

    pub fn loaded_coords(&self) -> HashSet<RegionCoord> {
        self.loaded.keys().copied().collect()
    }

    pub fn viewer_region(&self) -> Option<RegionCoord> {
        self.viewer_region
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn stats(&self) -> StreamingStats {
        StreamingStats {
            loaded: self.loaded.len(),
            pending: self.pending.len(),
            queued: self.pool.queued_len(),
            in_flight: self.pool.in_flight(),
            backlog: self.pool.inbox().len(),
            ..self.stats
        }
    }

    /// Stop the workers and release every uploaded mesh
    pub fn shutdown(&mut self) {
        self.pool.shutdown();
        for (_, region) in self.loaded.drain() {
            self.renderer.release(region.handle);
        }
        self.pending.clear();
        log::info!("World streamer shut down");
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &GenerationPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessRenderer;
    use crate::terrain::FlatTerrain;
    use crate::voxel::MeshData;

    fn config() -> StreamingConfig {
        StreamingConfig {
            update_interval_ms: 0,
            ..Default::default()
        }
    }

    fn idle_streamer(config: StreamingConfig) -> WorldStreamer<HeadlessRenderer> {
        let pool = GenerationPool::new(Arc::new(FlatTerrain::new(100.0)), 0, false).unwrap();
        WorldStreamer::from_parts(config, pool, HeadlessRenderer::new())
    }

    fn package(x: i32, z: i32, geometry: bool) -> MeshPackage {
        let mut mesh = MeshData::new();
        if geometry {
            let a = mesh.push_vertex(Vec3::ZERO, Vec3::Y, Vec3::ONE);
            let b = mesh.push_vertex(Vec3::Z, Vec3::Y, Vec3::ONE);
            let c = mesh.push_vertex(Vec3::X, Vec3::Y, Vec3::ONE);
            mesh.push_triangle(a, b, c);
        }
        MeshPackage::new(RegionCoord::new(x, z), mesh)
    }

    fn center_of(coord: RegionCoord) -> Vec3 {
        coord.world_center()
    }

    #[test]
    fn test_initial_update_queues_load_square() {
        let mut streamer = idle_streamer(config());
        streamer.update(center_of(RegionCoord::new(0, 0)));
        assert_eq!(streamer.pending_count(), 81);
        assert_eq!(streamer.pool().queued_len(), 81);
        assert_eq!(streamer.viewer_region(), Some(RegionCoord::new(0, 0)));
    }

    #[test]
    fn test_repeated_updates_do_not_duplicate() {
        let mut streamer = idle_streamer(config());
        let viewer = center_of(RegionCoord::new(0, 0));
        // Nothing loads, so every update recomputes
        for _ in 0..5 {
            streamer.update(viewer);
        }
        assert_eq!(streamer.pool().queued_len(), 81);
        assert_eq!(streamer.pending_count(), 81);
        assert_eq!(streamer.stats().recomputes, 5);
    }

    #[test]
    fn test_moving_prunes_far_queue_entries() {
        let mut streamer = idle_streamer(config());
        streamer.update(center_of(RegionCoord::new(0, 0)));
        streamer.update(center_of(RegionCoord::new(10, 0)));

        // Old square is entirely beyond the unload radius of (10, 0)
        assert_eq!(streamer.pool().queued_len(), 81);
        assert_eq!(streamer.pending_count(), 81);
        assert_eq!(streamer.stats().pruned_total, 81);
        assert!(streamer.is_pending(&RegionCoord::new(14, 4)));
        assert!(!streamer.is_pending(&RegionCoord::new(0, 0)));
    }

    #[test]
    fn test_frame_budget() {
        let mut streamer = idle_streamer(config());
        streamer.update(center_of(RegionCoord::new(0, 0)));

        let coords: Vec<_> = RegionCoord::new(0, 0).square_around(3).collect();
        assert_eq!(coords.len(), 49);
        for c in &coords {
            streamer.pool().inbox().push(package(c.x, c.z, true));
        }

        assert_eq!(streamer.integrate_completed(), 30);
        assert_eq!(streamer.loaded_count(), 30);
        assert_eq!(streamer.pool().inbox().len(), 19);

        // Leftovers keep arrival order
        let next: Vec<_> = streamer.pool().inbox().drain().into_iter().map(|p| p.coord).collect();
        assert_eq!(next, coords[30..].to_vec());
    }

    #[test]
    fn test_empty_packages_do_not_use_budget() {
        let mut streamer = idle_streamer(config());
        streamer.update(center_of(RegionCoord::new(0, 0)));

        let coords: Vec<_> = RegionCoord::new(0, 0).square_around(4).collect();
        for (i, c) in coords.iter().enumerate() {
            // First ten are empty
            streamer.pool().inbox().push(package(c.x, c.z, i >= 10));
        }

        assert_eq!(streamer.integrate_completed(), 30);
        assert_eq!(streamer.stats().discarded_empty, 10);
        assert_eq!(streamer.loaded_count(), 30);
        assert!(!streamer.is_pending(&coords[0]));
        assert_eq!(streamer.pool().inbox().len(), 81 - 40);
    }

    #[test]
    fn test_duplicate_completion_discarded() {
        let mut streamer = idle_streamer(config());
        streamer.update(center_of(RegionCoord::new(0, 0)));
        streamer.pool().inbox().push(package(1, 1, true));
        streamer.pool().inbox().push(package(1, 1, true));

        assert_eq!(streamer.integrate_completed(), 1);
        assert_eq!(streamer.loaded_count(), 1);
        assert_eq!(streamer.stats().discarded_duplicate, 1);
        assert_eq!(streamer.renderer().resident_count(), 1);
    }

    #[test]
    fn test_stale_completion_discarded() {
        let mut streamer = idle_streamer(config());
        streamer.update(center_of(RegionCoord::new(0, 0)));
        streamer.pool().inbox().push(package(6, 0, true));
        streamer.pool().inbox().push(package(5, -5, true));

        assert_eq!(streamer.integrate_completed(), 1);
        assert!(!streamer.is_loaded(&RegionCoord::new(6, 0)));
        assert!(streamer.is_loaded(&RegionCoord::new(5, -5)));
        assert_eq!(streamer.stats().discarded_stale, 1);
    }

    #[test]
    fn test_eviction_releases_meshes() {
        let mut streamer = idle_streamer(config());
        streamer.update(center_of(RegionCoord::new(0, 0)));
        for c in RegionCoord::new(0, 0).square_around(1) {
            streamer.pool().inbox().push(package(c.x, c.z, true));
        }
        streamer.integrate_completed();
        assert_eq!(streamer.loaded_count(), 9);

        // (-1, *) is 6 away from (5, 0); (0, *) sits exactly on the radius
        streamer.update(center_of(RegionCoord::new(5, 0)));
        assert_eq!(streamer.loaded_count(), 6);
        assert!(streamer.loaded_coords().iter().all(|c| c.x >= 0 && c.x <= 1));
        assert_eq!(streamer.renderer().releases(), 3);
        assert_eq!(streamer.renderer().resident_count(), 6);
        assert_eq!(streamer.stats().evicted_total, 3);
    }

    #[test]
    fn test_throttle_limits_recompute() {
        let mut streamer = idle_streamer(StreamingConfig {
            update_interval_ms: 60_000,
            ..Default::default()
        });
        streamer.update(center_of(RegionCoord::new(0, 0)));
        streamer.update(center_of(RegionCoord::new(20, 20)));
        assert_eq!(streamer.viewer_region(), Some(RegionCoord::new(0, 0)));
        assert_eq!(streamer.stats().recomputes, 1);

        // Integration still runs every call
        streamer.pool().inbox().push(package(0, 0, true));
        assert_eq!(streamer.update(Vec3::ZERO), 1);
    }

    #[test]
    fn test_draw_culls_regions_behind_viewer() {
        let mut streamer = idle_streamer(config());
        streamer.update(center_of(RegionCoord::new(0, 0)));
        streamer.pool().inbox().push(package(0, -2, true));
        streamer.pool().inbox().push(package(0, 2, true));
        streamer.integrate_completed();

        // Looking down -Z from the middle of region (0, 0)
        let eye = Vec3::new(128.0, 200.0, 128.0);
        let view = Mat4::look_at_rh(eye, eye + Vec3::new(0.0, 0.0, -1.0), Vec3::Y);
        let proj = Mat4::perspective_rh_gl(60f32.to_radians(), 1.0, 0.1, 5000.0);
        let ctx = DrawContext::new(proj * view, eye);

        assert_eq!(streamer.visible_regions(&ctx.view_projection), vec![RegionCoord::new(0, -2)]);
        assert_eq!(streamer.draw(&ctx), 1);
        assert_eq!(streamer.renderer().draw_calls(), 1);
        let stats = streamer.stats();
        assert_eq!(stats.last_drawn, 1);
        assert_eq!(stats.last_culled, 1);
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let mut streamer = idle_streamer(config());
        streamer.update(center_of(RegionCoord::new(0, 0)));
        streamer.pool().inbox().push(package(0, 0, true));
        streamer.integrate_completed();

        streamer.shutdown();
        assert_eq!(streamer.loaded_count(), 0);
        assert_eq!(streamer.renderer().resident_count(), 0);
    }
}
