//! View frustum for culling

use crate::core::types::{Vec3, Vec4, Mat4};
use super::aabb::Aabb;

/// Planes whose normal is shorter than this are left unnormalized.
const MIN_PLANE_LENGTH: f32 = 1e-4;

/// A plane defined by normal and distance from origin
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Signed distance from point to plane (positive = in front)
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }

    /// Radius of a box with the given half-extents projected onto the normal
    pub fn projected_radius(&self, half_extent: Vec3) -> f32 {
        half_extent.dot(self.normal.abs())
    }
}

/// View frustum with 6 planes (Left, Right, Bottom, Top, Near, Far)
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Planes come from sums and differences of the matrix rows and point
    /// inward. Expects an OpenGL-style clip volume (z in [-w, w]).
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let r0 = vp.row(0);
        let r1 = vp.row(1);
        let r2 = vp.row(2);
        let r3 = vp.row(3);

        Self {
            planes: [
                Self::normalize_plane(r3 + r0), // left
                Self::normalize_plane(r3 - r0), // right
                Self::normalize_plane(r3 + r1), // bottom
                Self::normalize_plane(r3 - r1), // top
                Self::normalize_plane(r3 + r2), // near
                Self::normalize_plane(r3 - r2), // far
            ],
        }
    }

    fn normalize_plane(plane: Vec4) -> Plane {
        let normal = plane.truncate();
        let len = normal.length();
        if len > MIN_PLANE_LENGTH {
            Plane::new(normal / len, plane.w / len)
        } else {
            Plane::new(normal, plane.w)
        }
    }

    /// Check if point is inside frustum
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(point) >= 0.0)
    }

    /// Check if AABB intersects frustum (conservative test).
    ///
    /// The box is rejected only when it lies entirely behind at least one
    /// plane: its center distance plus its half-extents projected onto the
    /// plane normal is still negative.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let center = aabb.center();
        let half_extent = aabb.half_extent();

        for plane in &self.planes {
            let r = plane.projected_radius(half_extent);
            let s = plane.distance_to_point(center);
            if s + r < 0.0 {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looking_down_negative_z() -> Frustum {
        let proj = Mat4::perspective_rh_gl(90.0_f32.to_radians(), 1.0, 0.1, 100.0);
        let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y);
        Frustum::from_view_projection(&(proj * view))
    }

    #[test]
    fn test_plane_distance() {
        let plane = Plane::new(Vec3::Y, 0.0); // XZ plane
        assert_eq!(plane.distance_to_point(Vec3::new(0.0, 5.0, 0.0)), 5.0);
        assert_eq!(plane.distance_to_point(Vec3::new(0.0, -3.0, 0.0)), -3.0);
    }

    #[test]
    fn test_projected_radius() {
        let plane = Plane::new(Vec3::new(0.0, -1.0, 0.0), 0.0);
        assert_eq!(plane.projected_radius(Vec3::new(4.0, 2.0, 9.0)), 2.0);
    }

    #[test]
    fn test_planes_are_normalized() {
        let frustum = looking_down_negative_z();
        for plane in &frustum.planes {
            assert!((plane.normal.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_frustum_contains_point() {
        let proj = Mat4::orthographic_rh_gl(-1.0, 1.0, -1.0, 1.0, 0.1, 100.0);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let frustum = Frustum::from_view_projection(&(proj * view));

        assert!(frustum.contains_point(Vec3::ZERO));
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 10.0)));
    }

    #[test]
    fn test_box_in_front_is_visible() {
        let frustum = looking_down_negative_z();
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -20.0), Vec3::new(1.0, 1.0, -10.0));
        assert!(frustum.intersects_aabb(&aabb));
    }

    #[test]
    fn test_box_behind_is_culled() {
        let frustum = looking_down_negative_z();
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, 10.0), Vec3::new(1.0, 1.0, 20.0));
        assert!(!frustum.intersects_aabb(&aabb));
    }

    #[test]
    fn test_box_beyond_far_plane_is_culled() {
        let frustum = looking_down_negative_z();
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -300.0), Vec3::new(1.0, 1.0, -200.0));
        assert!(!frustum.intersects_aabb(&aabb));
    }

    #[test]
    fn test_box_straddling_side_plane_is_kept() {
        let frustum = looking_down_negative_z();
        // 90 degree fov: at z = -10 the left plane sits at x = -10.
        let aabb = Aabb::new(Vec3::new(-15.0, -1.0, -11.0), Vec3::new(-9.0, 1.0, -9.0));
        assert!(frustum.intersects_aabb(&aabb));

        let outside = Aabb::new(Vec3::new(-40.0, -1.0, -11.0), Vec3::new(-30.0, 1.0, -9.0));
        assert!(!frustum.intersects_aabb(&outside));
    }
}
