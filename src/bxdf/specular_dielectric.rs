use crate::core::{color::Color, rng::Rng};

use super::{util, BsdfClass, BxdfSample, BxdfT, DielectricFresnel, ScatterDirection};

/// Smooth glass. The reflect/refract choice is made with probability equal to the
/// Fresnel reflectance, so the sampled weight carries no Fresnel term.
pub struct SpecularDielectric {
    fresnel: DielectricFresnel,
}

impl SpecularDielectric {
    pub fn new(fresnel: DielectricFresnel) -> Self {
        Self { fresnel }
    }
}

impl BxdfT for SpecularDielectric {
    fn sample(&self, wo: glam::Vec3A, rng: &mut Rng) -> BxdfSample {
        let reflect_prob = self.fresnel.reflectance(wo, glam::Vec3A::Z);

        if rng.uniform_1d() < reflect_prob {
            let wi = util::reflect(wo);
            BxdfSample {
                wi,
                class: BsdfClass::Reflection,
                direction: ScatterDirection::Backward,
                bxdf: Color::gray(reflect_prob / wi.z.abs()),
                pdf: reflect_prob,
            }
        } else {
            match util::refract(wo, self.fresnel.ior()) {
                Some(wi) => {
                    let eta = util::eta_ratio(wo.z, self.fresnel.ior());
                    BxdfSample {
                        wi,
                        class: BsdfClass::Transmittance,
                        direction: ScatterDirection::Forward,
                        bxdf: Color::gray(eta * eta * (1.0 - reflect_prob) / wi.z.abs()),
                        pdf: 1.0 - reflect_prob,
                    }
                }
                None => BxdfSample::absorbed(BsdfClass::Transmittance, ScatterDirection::Forward),
            }
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
