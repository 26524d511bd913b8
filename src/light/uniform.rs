use crate::core::{color::Color, rng::Rng};

use super::{EmitterInputs, EmitterSample, EmitterT};

/// Constant radiance arriving from every direction.
pub struct UniformEmitter {
    color: Color,
}

impl UniformEmitter {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    pub fn color(&self) -> Color {
        self.color
    }
}

impl EmitterT for UniformEmitter {
    fn background(&self, _dir: glam::Vec3A) -> Color {
        self.color
    }

    fn sample(
        &self,
        _position: glam::Vec3A,
        _inputs: &EmitterInputs,
        rng: &mut Rng,
    ) -> Option<EmitterSample> {
        Some(EmitterSample {
            wi: rng.uniform_on_sphere(),
            pdf: 0.25 * std::f32::consts::FRAC_1_PI,
            radiance: self.color,
            dist: f32::INFINITY,
        })
    }

    fn pdf(
        &self,
        _position: glam::Vec3A,
        _wi: glam::Vec3A,
        hit: Option<(usize, glam::Vec3A)>,
        _inputs: &EmitterInputs,
    ) -> f32 {
        if hit.is_none() {
            0.25 * std::f32::consts::FRAC_1_PI
        } else {
            0.0
        }
    }
}
