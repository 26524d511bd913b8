use crate::core::{color::Color, rng::Rng};

use super::{
    util, BsdfClass, BxdfSample, BxdfT, DielectricFresnel, GgxMicrofacet, ScatterDirection,
};

/// Rough glass: reflection or refraction about a GGX half vector, picked by the
/// Fresnel reflectance.
pub struct MicrofacetDielectric {
    microfacet: GgxMicrofacet,
    fresnel: DielectricFresnel,
}

impl MicrofacetDielectric {
    pub fn new(microfacet: GgxMicrofacet, fresnel: DielectricFresnel) -> Self {
        Self {
            microfacet,
            fresnel,
        }
    }

    /// `(pdf, bxdf)` of the transmitted lobe for a refraction about `half`.
    fn transmit_terms(
        &self,
        wo: glam::Vec3A,
        wi: glam::Vec3A,
        half: glam::Vec3A,
        half_pdf: f32,
        reflect_prob: f32,
    ) -> (f32, Color) {
        let eta = util::eta_ratio(wo.z, self.fresnel.ior());
        let denom = eta * wo.dot(half) + wi.dot(half);
        let denom = denom * denom;

        let pdf = (1.0 - reflect_prob) * half_pdf * wi.dot(half).abs() / denom;
        let num = 4.0 * wo.dot(half).abs() * wi.dot(half).abs();
        let bxdf = (1.0 - reflect_prob) * self.microfacet.ndf_visible(wo, wi, half) * num
            * (eta * eta)
            / denom;
        (pdf, Color::gray(bxdf))
    }
}

impl BxdfT for MicrofacetDielectric {
    fn sample(&self, wo: glam::Vec3A, rng: &mut Rng) -> BxdfSample {
        // the half vector stays in +Z, the sign of `wo.z` tells inside from outside
        let (half, half_pdf) = self.microfacet.sample_half(rng.uniform_2d());
        let reflect_prob = self.fresnel.reflectance(wo, half);

        if rng.uniform_1d() < reflect_prob {
            let wi = util::reflect_n(wo, half);
            if wo.z * wi.z <= 0.0 {
                return BxdfSample::absorbed(BsdfClass::Reflection, ScatterDirection::Backward);
            }
            BxdfSample {
                wi,
                class: BsdfClass::Reflection,
                direction: ScatterDirection::Backward,
                bxdf: Color::gray(reflect_prob * self.microfacet.ndf_visible(wo, wi, half)),
                pdf: reflect_prob * half_pdf / (4.0 * wo.dot(half).abs()),
            }
        } else {
            match util::refract_n(wo, half, self.fresnel.ior()) {
                Some(wi) if wo.z * wi.z < 0.0 => {
                    let (pdf, bxdf) = self.transmit_terms(wo, wi, half, half_pdf, reflect_prob);
                    BxdfSample {
                        wi,
                        class: BsdfClass::Transmittance,
                        direction: ScatterDirection::Forward,
                        bxdf,
                        pdf,
                    }
                }
                _ => BxdfSample::absorbed(BsdfClass::Transmittance, ScatterDirection::Forward),
            }
        }
    }

    fn pdf(&self, wo: glam::Vec3A, wi: glam::Vec3A) -> f32 {
        if wo.z * wi.z > 0.0 {
            let half = util::half_from_reflect(wo, wi);
            let reflect_prob = self.fresnel.reflectance(wo, half);
            reflect_prob * self.microfacet.half_pdf(half) / (4.0 * wo.dot(half).abs())
        } else {
            let half = util::half_from_refract(wo, wi, self.fresnel.ior());
            let reflect_prob = self.fresnel.reflectance(wo, half);
            let half_pdf = self.microfacet.half_pdf(half);
            self.transmit_terms(wo, wi, half, half_pdf, reflect_prob).0
        }
    }

    fn bxdf(&self, wo: glam::Vec3A, wi: glam::Vec3A) -> Color {
        if wo.z * wi.z > 0.0 {
            let half = util::half_from_reflect(wo, wi);
            Color::gray(self.fresnel.reflectance(wo, half) * self.microfacet.ndf_visible(wo, wi, half))
        } else {
            let half = util::half_from_refract(wo, wi, self.fresnel.ior());
            let reflect_prob = self.fresnel.reflectance(wo, half);
            let half_pdf = self.microfacet.half_pdf(half);
            self.transmit_terms(wo, wi, half, half_pdf, reflect_prob).1
        }
    }

    fn is_delta(&self) -> bool {
        false
    }
}
