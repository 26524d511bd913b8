use crate::core::color::Color;

use super::util;

/// Exact unpolarized reflectance at a smooth boundary between vacuum and a dielectric
/// of index `ior`. Which side `i` arrives from is read off the sign of `i·n`.
#[derive(Debug, Clone, Copy)]
pub struct DielectricFresnel {
    ior: f32,
}

impl DielectricFresnel {
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }

    pub fn ior(&self) -> f32 {
        self.ior
    }

    /// 1 under total internal reflection.
    pub fn reflectance(&self, i: glam::Vec3A, n: glam::Vec3A) -> f32 {
        let cos_i = i.dot(n);
        let (outer, inner) = if cos_i >= 0.0 {
            (1.0, self.ior)
        } else {
            (self.ior, 1.0)
        };

        let t = match util::refract_n(i, n, self.ior) {
            Some(t) => t,
            None => return 1.0,
        };
        let cos_i = cos_i.abs();
        let cos_t = t.dot(n).abs();
        let rs = (outer * cos_i - inner * cos_t) / (outer * cos_i + inner * cos_t);
        let rp = (outer * cos_t - inner * cos_i) / (outer * cos_t + inner * cos_i);
        0.5 * (rs * rs + rp * rp)
    }
}

/// Schlick's curve from a tinted reflectance at normal incidence, used for metals.
#[derive(Debug, Clone, Copy)]
pub struct SchlickFresnel {
    r0: Color,
}

impl SchlickFresnel {
    pub fn new(r0: Color) -> Self {
        Self { r0 }
    }

    pub fn reflectance(&self, i: glam::Vec3A, n: glam::Vec3A) -> Color {
        let grazing = 1.0 - i.dot(n).abs().min(1.0);
        let grazing2 = grazing * grazing;
        self.r0 + (Color::WHITE - self.r0) * (grazing2 * grazing2 * grazing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dielectric_at_normal_incidence() {
        let glass = DielectricFresnel::new(1.5);
        let outside = glass.reflectance(glam::Vec3A::Z, glam::Vec3A::Z);
        let inside = glass.reflectance(-glam::Vec3A::Z, glam::Vec3A::Z);
        assert!((outside - 0.04).abs() < 1e-4);
        assert!((inside - outside).abs() < 1e-5);
    }

    #[test]
    fn total_internal_reflection() {
        let i = glam::Vec3A::new(0.9, 0.0, -(1.0f32 - 0.81).sqrt());
        assert_eq!(DielectricFresnel::new(1.5).reflectance(i, glam::Vec3A::Z), 1.0);
    }

    #[test]
    fn schlick_spans_tint_to_white() {
        let gold = SchlickFresnel::new(Color::new(1.0, 0.7, 0.3));
        assert_eq!(
            gold.reflectance(glam::Vec3A::Z, glam::Vec3A::Z),
            Color::new(1.0, 0.7, 0.3)
        );
        let grazing = gold.reflectance(glam::Vec3A::X, glam::Vec3A::Z);
        assert!((grazing.b - 1.0).abs() < 1e-6);
    }
}
