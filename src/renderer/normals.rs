use crate::core::{color::Color, ray::Ray, rng::Rng, scene::Scene};

use super::IntegratorT;

/// Shading normal of the first hit remapped from [-1, 1] to [0, 1]; black on a miss.
#[derive(Default)]
pub struct NormalsIntegrator {}

impl NormalsIntegrator {
    pub fn new() -> Self {
        Self {}
    }
}

impl IntegratorT for NormalsIntegrator {
    fn radiance(&self, scene: &Scene, ray: Ray, _rng: &mut Rng) -> Color {
        let inter = scene.traverse(&ray);
        match inter.triangle {
            Some(index) => {
                let normal = scene.triangle(index).shading_normal(inter.barycentric);
                Color::from(normal) * 0.5 + Color::gray(0.5)
            }
            None => Color::BLACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::testing;

    #[test]
    fn maps_normal_to_color() {
        let scene = testing::single_triangle_scene(Color::WHITE);
        let integrator = NormalsIntegrator::new();
        let mut rng = Rng::with_seed(1);

        let color = integrator.radiance(&scene, testing::centroid_ray(), &mut rng);
        assert!((color.r - 0.5).abs() < 1e-5);
        assert!((color.g - 0.5).abs() < 1e-5);
        assert!((color.b - 1.0).abs() < 1e-5);

        let color = integrator.radiance(&scene, testing::missing_ray(), &mut rng);
        assert_eq!(color, Color::BLACK);
    }
}
