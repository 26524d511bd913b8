use crate::core::{color::Color, rng::Rng};

use super::{util, BsdfClass, BxdfSample, BxdfT, ScatterDirection, SchlickFresnel};

/// Perfect mirror.
pub struct SpecularConductor {
    fresnel: SchlickFresnel,
}

impl SpecularConductor {
    pub fn new(fresnel: SchlickFresnel) -> Self {
        Self { fresnel }
    }
}

impl BxdfT for SpecularConductor {
    fn sample(&self, wo: glam::Vec3A, _rng: &mut Rng) -> BxdfSample {
        let wi = util::reflect(wo);
        if wi.z == 0.0 {
            return BxdfSample::absorbed(BsdfClass::Reflection, ScatterDirection::Backward);
        }
        BxdfSample {
            wi,
            class: BsdfClass::Reflection,
            direction: ScatterDirection::Backward,
            bxdf: self.fresnel.reflectance(wo, glam::Vec3A::Z) / wi.z.abs(),
            pdf: 1.0,
        }
    }

    fn pdf(&self, _wo: glam::Vec3A, _wi: glam::Vec3A) -> f32 {
        0.0
    }

    fn bxdf(&self, _wo: glam::Vec3A, _wi: glam::Vec3A) -> Color {
        Color::BLACK
    }

    fn is_delta(&self) -> bool {
        true
    }
}
