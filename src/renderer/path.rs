use crate::{
    bxdf::{Bxdf, BxdfT, ScatterDirection},
    core::{color::Color, coord::Coordinate, ray::Ray, rng::Rng, scene::Scene},
    light::EmitterT,
};

use super::IntegratorT;

/// Shadow rays stop this far short of the sampled emitter point.
const SHADOW_EPS: f32 = 0.001;
const MAX_SURVIVAL_PROBABILITY: f32 = 0.95;

/// Unidirectional path tracer with russian roulette and optional next-event
/// estimation.
pub struct PathIntegrator {
    max_path_length: u32,
    roulette_start_depth: u32,
    next_event_estimation: bool,
}

impl PathIntegrator {
    pub fn new(max_path_length: u32, roulette_start_depth: u32, next_event_estimation: bool) -> Self {
        Self {
            max_path_length,
            roulette_start_depth,
            next_event_estimation,
        }
    }

    fn segment_allowed(&self, depth: u32) -> bool {
        self.max_path_length == 0 || depth < self.max_path_length
    }

    /// Weight of emission found by a BSDF-sampled ray. `last_bsdf` holds the pdf of
    /// the sample that produced the ray, `None` after a delta lobe or for camera rays.
    fn bsdf_hit_weight<F>(&self, last_bsdf: Option<f32>, emitter_count: usize, light_pdf: F) -> f32
    where
        F: FnOnce() -> f32,
    {
        match last_bsdf {
            Some(bsdf_pdf) if self.next_event_estimation => {
                power_heuristic(1, bsdf_pdf, 1, light_pdf() / emitter_count as f32)
            }
            _ => 1.0,
        }
    }

    /// Direct light from one uniformly chosen emitter, MIS weighted against the BSDF.
    fn sample_emitter(
        &self,
        scene: &Scene,
        bxdf: &Bxdf,
        coord: &Coordinate,
        position: glam::Vec3A,
        wo: glam::Vec3A,
        rng: &mut Rng,
    ) -> Color {
        let emitters = scene.emitters();
        let chosen = ((rng.uniform_1d() * emitters.len() as f32) as usize).min(emitters.len() - 1);
        let inputs = scene.emitter_inputs();
        let sample = match emitters[chosen].sample(position, &inputs, rng) {
            Some(sample) => sample,
            None => return Color::BLACK,
        };
        let light_pdf = sample.pdf / emitters.len() as f32;
        if !(light_pdf > 0.0 && light_pdf.is_finite()) || sample.radiance.is_black() {
            return Color::BLACK;
        }

        let wi = coord.to_local(sample.wi);
        let direction = if wo.z * wi.z > 0.0 {
            ScatterDirection::Backward
        } else {
            ScatterDirection::Forward
        };
        if !coord.in_expected_hemisphere(sample.wi, direction) {
            return Color::BLACK;
        }
        let bxdf_value = bxdf.bxdf(wo, wi);
        if bxdf_value.is_black() {
            return Color::BLACK;
        }

        let shadow_ray = Ray::new(position, sample.wi);
        let t_max = if sample.dist.is_finite() {
            sample.dist - SHADOW_EPS
        } else {
            f32::INFINITY
        };
        if scene.intersect_test(&shadow_ray, t_max) {
            return Color::BLACK;
        }

        let weight = power_heuristic(1, light_pdf, 1, bxdf.pdf(wo, wi));
        sample.radiance * bxdf_value * (wi.z.abs() * weight / light_pdf)
    }
}

impl IntegratorT for PathIntegrator {
    fn radiance(&self, scene: &Scene, mut ray: Ray, rng: &mut Rng) -> Color {
        let mut final_color = Color::BLACK;
        let mut throughput = Color::WHITE;
        let mut depth = 0;
        let mut last_bsdf: Option<f32> = None;
        let emitter_count = scene.emitters().len();
        let inputs = scene.emitter_inputs();

        while self.segment_allowed(depth) {
            let inter = scene.traverse(&ray);
            let index = match inter.triangle {
                Some(index) => index,
                None => {
                    for emitter in scene.emitters() {
                        let background = emitter.background(ray.direction);
                        if background.is_black() {
                            continue;
                        }
                        let weight = self.bsdf_hit_weight(last_bsdf, emitter_count, || {
                            emitter.pdf(ray.origin, ray.direction, None, &inputs)
                        });
                        final_color += throughput * background * weight;
                    }
                    break;
                }
            };

            let triangle = scene.triangle(index);
            let material = scene.material(triangle.material());
            let position = inter.position;

            if material.is_emissive() {
                let weight = match scene.triangle_emitter(index) {
                    Some(emitter) => self.bsdf_hit_weight(last_bsdf, emitter_count, || {
                        scene.emitters()[emitter].pdf(
                            ray.origin,
                            ray.direction,
                            Some((index, position)),
                            &inputs,
                        )
                    }),
                    None => 1.0,
                };
                final_color += throughput * material.emissive * weight;
            }

            let normal = triangle.normal();
            let hemisphere = if ray.direction.dot(normal) > 0.0 {
                -normal
            } else {
                normal
            };
            let coord = Coordinate::from_z(triangle.shading_normal(inter.barycentric), hemisphere);
            let bxdf = scene.bxdf(triangle.material());
            let wo_world = -ray.direction;

            if self.next_event_estimation
                && emitter_count > 0
                && !bxdf.is_delta()
                && self.segment_allowed(depth + 1)
            {
                let wo = coord.to_local(wo_world);
                final_color +=
                    throughput * self.sample_emitter(scene, bxdf, &coord, position, wo, rng);
            }

            let (wi_world, sample) = match bxdf.sample_world(&coord, wo_world, rng) {
                Some(sample) => sample,
                None => break,
            };
            throughput *= sample.evaluate();
            if !throughput.is_finite() || throughput.is_black() {
                break;
            }
            last_bsdf = if bxdf.is_delta() {
                None
            } else {
                Some(sample.pdf)
            };
            ray = Ray::new(position, wi_world);
            depth += 1;

            if depth >= self.roulette_start_depth {
                let survival = throughput.max_component().min(MAX_SURVIVAL_PROBABILITY);
                if rng.uniform_1d() >= survival {
                    break;
                }
                throughput /= survival;
            }
        }

        final_color
    }
}

fn power_heuristic(n0: u32, p0: f32, n1: u32, p1: f32) -> f32 {
    let prod0 = n0 as f32 * p0;
    let prod1 = n1 as f32 * p1;
    let sum = prod0 * prod0 + prod1 * prod1;
    if sum > 0.0 {
        prod0 * prod0 / sum
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::testing;

    #[test]
    fn escaping_ray_returns_emitter_color() {
        let sky = Color::new(1.0, 0.5, 0.25);
        let scene = testing::single_triangle_scene(sky);
        let integrator = PathIntegrator::new(2, 16, false);
        let mut rng = Rng::with_seed(4);
        assert_eq!(
            integrator.radiance(&scene, testing::missing_ray(), &mut rng),
            sky
        );
    }

    #[test]
    fn diffuse_triangle_under_uniform_sky() {
        let scene = testing::single_triangle_scene(Color::WHITE);
        let mut rng = Rng::with_seed(5);

        // every bounce off the open triangle escapes, so each estimate is the albedo
        let integrator = PathIntegrator::new(2, 16, false);
        for _ in 0..32 {
            let color = integrator.radiance(&scene, testing::centroid_ray(), &mut rng);
            assert!(color.is_finite());
            for c in [color.r, color.g, color.b] {
                assert!(c >= 0.0 && c < 1.0, "{:?}", color);
            }
            assert!((color.g - testing::WHITE_ALBEDO).abs() < 1e-4);
        }

        let integrator = PathIntegrator::new(2, 16, true);
        let mut sum = Color::BLACK;
        for _ in 0..4000 {
            let color = integrator.radiance(&scene, testing::centroid_ray(), &mut rng);
            assert!(color.is_finite() && color.r >= 0.0);
            sum += color;
        }
        assert!((sum.g / 4000.0 - testing::WHITE_ALBEDO).abs() < 0.03, "{:?}", sum);
    }

    #[test]
    fn path_length_limits_bounces() {
        let scene = testing::single_triangle_scene(Color::WHITE);
        let integrator = PathIntegrator::new(1, 16, false);
        let mut rng = Rng::with_seed(6);
        assert_eq!(
            integrator.radiance(&scene, testing::centroid_ray(), &mut rng),
            Color::BLACK
        );
    }

    fn mean_radiance(integrator: &PathIntegrator, scene: &Scene, ray: Ray, n: usize) -> Color {
        let mut rng = Rng::with_seed(7);
        let mut sum = Color::BLACK;
        for _ in 0..n {
            sum += integrator.radiance(scene, ray, &mut rng);
        }
        sum / n as f32
    }

    #[test]
    fn russian_roulette_is_unbiased() {
        let scene = testing::floor_under_sky_scene(0.5);
        let ray = Ray::primary(glam::Vec3A::new(0.0, 1.0, 0.0), -glam::Vec3A::Y);

        let reference = mean_radiance(&PathIntegrator::new(0, 16, false), &scene, ray, 1000);
        assert!((reference.g - 0.5).abs() < 1e-4);

        let early = mean_radiance(&PathIntegrator::new(0, 0, false), &scene, ray, 20000);
        assert!((early.g - 0.5).abs() < 0.02, "{:?}", early);
    }

    #[test]
    fn next_event_estimation_matches_bsdf_sampling() {
        let scene = testing::floor_under_lamp_scene();
        let ray = Ray::primary(glam::Vec3A::new(0.0, 0.5, 0.0), -glam::Vec3A::Y);

        let brute = mean_radiance(&PathIntegrator::new(2, 16, false), &scene, ray, 40000);
        let nee = mean_radiance(&PathIntegrator::new(2, 16, true), &scene, ray, 40000);
        assert!(brute.g > 0.05);
        assert!((brute.g - nee.g).abs() < 0.02, "{:?} vs {:?}", brute, nee);
    }

    #[test]
    fn power_heuristic_weights_sum_to_one() {
        let a = power_heuristic(1, 0.3, 1, 1.7);
        let b = power_heuristic(1, 1.7, 1, 0.3);
        assert!((a + b - 1.0).abs() < 1e-6);
        assert_eq!(power_heuristic(1, 0.0, 1, 0.0), 0.0);
    }
}
