//! Viewpoint paths that stand in for a camera.

use std::f64::consts::{PI, TAU};

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use tessera_config::{DemoConfig, ViewpointPath};

/// How far outside the root square a path may wander, as a fraction of its size.
const MARGIN: f64 = 0.25;

/// Produces one viewpoint per step along the configured path.
pub(crate) struct ViewpointDriver {
    path: ViewpointPath,
    root_size: f64,
    speed: f64,
    orbit_radius: f64,
    rng: Xoshiro256StarStar,
    position: DVec2,
    heading: f64,
    frame: u32,
}

impl ViewpointDriver {
    pub(crate) fn new(config: &DemoConfig, root_size: u32) -> Self {
        let root_size = f64::from(root_size);
        Self {
            path: config.path,
            root_size,
            speed: config.speed.max(0.0),
            orbit_radius: config.orbit_radius * root_size,
            rng: Xoshiro256StarStar::seed_from_u64(config.seed),
            position: DVec2::splat(root_size / 2.0),
            heading: 0.0,
            frame: 0,
        }
    }

    /// Viewpoint for the next step.
    pub(crate) fn next_viewpoint(&mut self) -> DVec2 {
        let t = f64::from(self.frame);
        self.frame += 1;
        let center = DVec2::splat(self.root_size / 2.0);
        match self.path {
            ViewpointPath::Orbit => {
                if self.orbit_radius <= 0.0 {
                    return center;
                }
                let angle = t * self.speed / self.orbit_radius;
                center + self.orbit_radius * DVec2::from_angle(angle)
            }
            ViewpointPath::FlyBy => {
                let start = DVec2::splat(-MARGIN * self.root_size);
                let span = (1.0 + 2.0 * MARGIN) * self.root_size * std::f64::consts::SQRT_2;
                let travelled = if span > 0.0 { (t * self.speed) % span } else { 0.0 };
                start + DVec2::splat(travelled / std::f64::consts::SQRT_2)
            }
            ViewpointPath::RandomWalk => {
                let current = self.position;
                self.heading = (self.heading + self.rng.gen_range(-0.6..0.6)) % TAU;
                let step = self.speed * DVec2::from_angle(self.heading);
                let candidate = current + step;
                let (lo, hi) = (-MARGIN * self.root_size, (1.0 + MARGIN) * self.root_size);
                if candidate.cmplt(DVec2::splat(lo)).any() || candidate.cmpgt(DVec2::splat(hi)).any() {
                    self.heading += PI;
                } else {
                    self.position = candidate;
                }
                current
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(path: ViewpointPath) -> DemoConfig {
        DemoConfig {
            path,
            ..Default::default()
        }
    }

    #[test]
    fn test_orbit_keeps_radius() {
        let mut driver = ViewpointDriver::new(&config(ViewpointPath::Orbit), 1024);
        let center = DVec2::splat(512.0);
        for _ in 0..50 {
            let vp = driver.next_viewpoint();
            assert!((vp.distance(center) - 0.35 * 1024.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_fly_by_starts_outside_and_moves_diagonally() {
        let mut driver = ViewpointDriver::new(&config(ViewpointPath::FlyBy), 1024);
        let first = driver.next_viewpoint();
        assert_eq!(first, DVec2::splat(-256.0));
        let second = driver.next_viewpoint();
        assert!(second.x > first.x);
        assert_eq!(second.x, second.y);
    }

    #[test]
    fn test_random_walk_is_seeded_and_bounded() {
        let mut a = ViewpointDriver::new(&config(ViewpointPath::RandomWalk), 256);
        let mut b = ViewpointDriver::new(&config(ViewpointPath::RandomWalk), 256);
        for _ in 0..500 {
            let (va, vb) = (a.next_viewpoint(), b.next_viewpoint());
            assert_eq!(va, vb);
            assert!(va.min_element() >= -64.0 && va.max_element() <= 320.0);
        }
    }
}
