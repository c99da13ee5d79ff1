//! Distance-based ideal node size.
//!
//! The required resolution halves every time the distance doubles, so the
//! ideal edge length of a node is the power of two nearest to its distance
//! from the viewpoint (rounded in log space, half up).
//!
//! There is no hysteresis: a viewpoint sitting on a rounding boundary
//! (`distance == 2^(k + 0.5)`) flips the result between `2^k` and `2^(k+1)`
//! with a one-unit move.

use glam::{DVec2, IVec2};

/// Largest level returned by [`ideal_size`]; `1 << MAX_LEVEL` still fits a `u32`.
pub const MAX_LEVEL: u32 = 31;

/// Squared distance from `point` to the axis-aligned box `center ± half_extent`.
///
/// Zero when the point lies inside the box.
#[must_use]
pub fn closest_point_distance_squared(point: DVec2, center: DVec2, half_extent: DVec2) -> f64 {
    ((point - center).abs() - half_extent)
        .max(DVec2::ZERO)
        .length_squared()
}

/// Ideal edge length for a box seen from `viewpoint`.
#[must_use]
pub fn ideal_size(center: DVec2, half_extent: DVec2, viewpoint: DVec2) -> u32 {
    let distance = closest_point_distance_squared(viewpoint, center, half_extent)
        .sqrt()
        .max(1.0);
    let level = (distance.log2() + 0.5).floor().clamp(0.0, f64::from(MAX_LEVEL));
    1 << (level as u32)
}

/// Ideal edge length for the node at `origin` with edge `size`.
///
/// The box is derived with integer halving of `size`.
#[must_use]
pub fn ideal_size_for(origin: IVec2, size: u32, viewpoint: DVec2) -> u32 {
    let half = DVec2::splat(f64::from(size / 2));
    ideal_size(origin.as_dvec2() + half, half, viewpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_inside_box_has_zero_distance() {
        let d2 = closest_point_distance_squared(
            DVec2::new(3.0, 5.0),
            DVec2::new(4.0, 4.0),
            DVec2::splat(4.0),
        );
        assert_eq!(d2, 0.0);
    }

    #[test]
    fn test_distance_to_edge_and_corner() {
        let center = DVec2::new(4.0, 4.0);
        let half = DVec2::splat(4.0);
        // Only x is clamped.
        assert_eq!(closest_point_distance_squared(DVec2::new(11.0, 4.0), center, half), 9.0);
        // Both axes clamped: 3-4-5 triangle off the (8, 8) corner.
        assert_eq!(closest_point_distance_squared(DVec2::new(11.0, 12.0), center, half), 25.0);
        assert_eq!(closest_point_distance_squared(DVec2::new(-3.0, -4.0), center, half), 25.0);
    }

    /// Zero and sub-unit distances floor to size 1.
    #[test]
    fn test_near_viewpoint_returns_size_one() {
        assert_eq!(ideal_size_for(IVec2::ZERO, 1024, DVec2::ZERO), 1);
        assert_eq!(ideal_size_for(IVec2::ZERO, 1024, DVec2::new(512.0, 512.0)), 1);
        assert_eq!(ideal_size_for(IVec2::ZERO, 4, DVec2::new(4.5, 0.0)), 1);
    }

    #[test]
    fn test_rounds_half_up_in_log_space() {
        let at = |d: f64| ideal_size(DVec2::ZERO, DVec2::ZERO, DVec2::new(d, 0.0));
        assert_eq!(at(1.41), 1);
        assert_eq!(at(1.42), 2);
        assert_eq!(at(2.0), 2);
        assert_eq!(at(3.0), 4);
        assert_eq!(at(512.0), 512);
        assert_eq!(at(724.0), 512);
        assert_eq!(at(725.0), 1024);
    }

    #[test]
    fn test_monotonic_with_distance() {
        let mut prev = 0;
        for d in [0.0, 1.0, 5.0, 40.0, 300.0, 2_000.0, 1.0e5, 1.0e9] {
            let size = ideal_size(DVec2::ZERO, DVec2::ZERO, DVec2::new(0.0, d));
            assert!(size.is_power_of_two());
            assert!(size >= prev, "size shrank at distance {d}");
            prev = size;
        }
    }

    #[test]
    fn test_huge_distance_is_clamped() {
        let size = ideal_size(DVec2::ZERO, DVec2::ZERO, DVec2::new(1.0e300, 0.0));
        assert_eq!(size, 1 << MAX_LEVEL);
    }

    /// Far from a 1024 root, the root is already fine enough.
    #[test]
    fn test_distant_viewpoint_exceeds_root_size() {
        let size = ideal_size_for(IVec2::ZERO, 1024, DVec2::new(100_000.0, 100_000.0));
        assert!(size > 1024);
    }
}
