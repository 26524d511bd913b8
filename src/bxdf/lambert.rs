use crate::core::{color::Color, rng::Rng};

use super::{BsdfClass, BxdfSample, BxdfT, ScatterDirection};

pub struct Lambert {
    reflectance: Color,
}

impl Lambert {
    pub fn new(reflectance: Color) -> Self {
        Self { reflectance }
    }
}

impl BxdfT for Lambert {
    fn sample(&self, wo: glam::Vec3A, rng: &mut Rng) -> BxdfSample {
        let mut wi = rng.cosine_weighted_on_hemisphere();
        if wo.z < 0.0 {
            wi.z = -wi.z;
        }
        BxdfSample {
            wi,
            class: BsdfClass::Diffuse,
            direction: ScatterDirection::Backward,
            bxdf: self.reflectance * std::f32::consts::FRAC_1_PI,
            pdf: wi.z.abs() * std::f32::consts::FRAC_1_PI,
        }
    }

    fn pdf(&self, wo: glam::Vec3A, wi: glam::Vec3A) -> f32 {
        if wo.z * wi.z > 0.0 {
            wi.z.abs() * std::f32::consts::FRAC_1_PI
        } else {
            0.0
        }
    }

    fn bxdf(&self, wo: glam::Vec3A, wi: glam::Vec3A) -> Color {
        if wo.z * wi.z > 0.0 {
            self.reflectance * std::f32::consts::FRAC_1_PI
        } else {
            Color::BLACK
        }
    }

    fn is_delta(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bxdf::Bxdf, core::coord::Coordinate};

    #[test]
    fn mean_throughput_converges_to_albedo() {
        let albedo = Color::new(0.8, 0.5, 0.2);
        let bxdf: Bxdf = Lambert::new(albedo).into();
        let n = glam::Vec3A::new(0.2, 0.3, 0.9).normalize();
        let coord = Coordinate::from_z(n, n);
        let wo = glam::Vec3A::new(0.0, 0.6, 0.8).normalize();
        let mut rng = Rng::with_seed(5);

        let count = 20_000;
        let mut sum = Color::BLACK;
        for _ in 0..count {
            let (wi, sample) = bxdf.sample_world(&coord, wo, &mut rng).unwrap();
            assert!(wi.dot(n) > 0.0);
            assert_eq!(sample.class, BsdfClass::Diffuse);
            sum += sample.evaluate();
        }
        let mean = sum / count as f32;
        assert!((mean.r - 0.8).abs() < 1e-3);
        assert!((mean.g - 0.5).abs() < 1e-3);
        assert!((mean.b - 0.2).abs() < 1e-3);
    }

    #[test]
    fn sample_follows_outgoing_side() {
        let lambert = Lambert::new(Color::WHITE);
        let mut rng = Rng::with_seed(6);
        let sample = lambert.sample(glam::Vec3A::new(0.0, 0.0, -1.0), &mut rng);
        assert!(sample.wi.z <= 0.0);
        assert_eq!(lambert.pdf(-glam::Vec3A::Z, glam::Vec3A::Z), 0.0);
    }
}
