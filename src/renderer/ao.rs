use crate::core::{color::Color, coord::Coordinate, ray::Ray, rng::Rng, scene::Scene};

use super::IntegratorT;

/// One cosine-distributed occlusion probe per camera ray: white when nothing lies
/// within `distance` of the hit point along it, black otherwise. Misses are black.
pub struct AoIntegrator {
    distance: f32,
}

impl AoIntegrator {
    pub fn new(distance: f32) -> Self {
        Self { distance }
    }
}

impl IntegratorT for AoIntegrator {
    fn radiance(&self, scene: &Scene, ray: Ray, rng: &mut Rng) -> Color {
        let inter = scene.traverse(&ray);
        let index = match inter.triangle {
            Some(index) => index,
            None => return Color::BLACK,
        };

        let normal = scene.triangle(index).normal();
        let hemisphere = if ray.direction.dot(normal) > 0.0 {
            -normal
        } else {
            normal
        };
        let coord = Coordinate::from_z(hemisphere, hemisphere);
        let probe = Ray::new(
            inter.position,
            coord.to_world(rng.cosine_weighted_on_hemisphere()),
        );
        if scene.intersect_test(&probe, self.distance) {
            Color::BLACK
        } else {
            Color::WHITE
        }
    }
}
