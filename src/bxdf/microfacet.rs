use super::util;

/// Isotropic GGX distribution, `alpha` is the squared perceptual roughness.
pub struct GgxMicrofacet {
    a2: f32,
}

impl GgxMicrofacet {
    pub fn new(alpha: f32) -> Self {
        Self { a2: alpha * alpha }
    }

    /// Half vector in the +Z hemisphere drawn proportionally to `D(h) cos(theta_h)`.
    pub fn sample_half(&self, rand: (f32, f32)) -> (glam::Vec3A, f32) {
        let cos_theta_sqr = util::ggx_ndf_cdf_inverse(self.a2, rand.0).clamp(0.0, 1.0);
        let cos_theta = cos_theta_sqr.sqrt();
        let sin_theta = (1.0 - cos_theta_sqr).sqrt();
        let (sin_phi, cos_phi) = (2.0 * std::f32::consts::PI * rand.1).sin_cos();
        let half = glam::Vec3A::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta);
        (half, self.half_pdf(half))
    }

    pub fn half_pdf(&self, half: glam::Vec3A) -> f32 {
        util::ggx_ndf(half.z, self.a2) * half.z.abs()
    }

    pub fn ndf_visible(&self, wo: glam::Vec3A, wi: glam::Vec3A, half: glam::Vec3A) -> f32 {
        util::ggx_ndf(half.z, self.a2) * util::smith_separable_visible(wo.z, wi.z, self.a2)
    }
}
