use crate::core::{color::Color, rng::Rng};

use super::{
    util, BsdfClass, BxdfSample, BxdfT, GgxMicrofacet, ScatterDirection, SchlickFresnel,
};

pub struct MicrofacetConductor {
    microfacet: GgxMicrofacet,
    fresnel: SchlickFresnel,
}

impl MicrofacetConductor {
    pub fn new(microfacet: GgxMicrofacet, fresnel: SchlickFresnel) -> Self {
        Self {
            microfacet,
            fresnel,
        }
    }
}

impl BxdfT for MicrofacetConductor {
    fn sample(&self, wo: glam::Vec3A, rng: &mut Rng) -> BxdfSample {
        let (half, half_pdf) = self.microfacet.sample_half(rng.uniform_2d());
        let wi = util::reflect_n(wo, half);
        if wo.z * wi.z <= 0.0 {
            return BxdfSample::absorbed(BsdfClass::Reflection, ScatterDirection::Backward);
        }

        let fresnel = self.fresnel.reflectance(wo, half);
        BxdfSample {
            wi,
            class: BsdfClass::Reflection,
            direction: ScatterDirection::Backward,
            bxdf: fresnel * self.microfacet.ndf_visible(wo, wi, half),
            pdf: half_pdf / (4.0 * wo.dot(half).abs()),
        }
    }

    fn pdf(&self, wo: glam::Vec3A, wi: glam::Vec3A) -> f32 {
        if wo.z * wi.z > 0.0 {
            let half = util::half_from_reflect(wo, wi);
            self.microfacet.half_pdf(half) / (4.0 * wo.dot(half).abs())
        } else {
            0.0
        }
    }

    fn bxdf(&self, wo: glam::Vec3A, wi: glam::Vec3A) -> Color {
        if wo.z * wi.z > 0.0 {
            let half = util::half_from_reflect(wo, wi);
            self.fresnel.reflectance(wo, half) * self.microfacet.ndf_visible(wo, wi, half)
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

    #[test]
    fn sampled_pdf_matches_evaluated_pdf() {
        let bxdf = MicrofacetConductor::new(
            GgxMicrofacet::new(0.25),
            SchlickFresnel::new(Color::new(0.9, 0.6, 0.3)),
        );
        let wo = glam::Vec3A::new(0.3, -0.2, 0.9).normalize();
        let mut rng = Rng::with_seed(21);
        let mut accepted = 0;
        let mut mean = Color::BLACK;
        for _ in 0..5000 {
            let sample = bxdf.sample(wo, &mut rng);
            if sample.pdf <= 0.0 {
                continue;
            }
            accepted += 1;
            assert!(sample.wi.z > 0.0);
            let pdf = bxdf.pdf(wo, sample.wi);
            assert!((pdf - sample.pdf).abs() <= 1e-2 * sample.pdf.max(1.0));
            mean += sample.evaluate();
        }
        assert!(accepted > 4000);
        let mean = mean / accepted as f32;
        assert!(mean.is_finite());
        assert!(mean.r <= 1.0 && mean.r > 0.5);
    }
}
