use crate::{
    bxdf::{
        Bxdf, DielectricFresnel, GgxMicrofacet, Lambert, MicrofacetConductor,
        MicrofacetDielectric, SchlickFresnel, SpecularConductor, SpecularDielectric,
    },
    core::color::Color,
};

/// Below this GGX alpha the lobe is treated as a perfect delta.
const SMOOTH_ALPHA: f32 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    Diffuse,
    Conductor,
    Dielectric,
}

/// Read-only surface description shared by every triangle that indexes it.
#[derive(Debug, Clone)]
pub struct Material {
    pub kind: MaterialKind,
    pub diffuse: Color,
    /// Reflectance at normal incidence for conductors.
    pub specular: Color,
    pub emissive: Color,
    /// Perceptual roughness in [0, 1]; squared into the GGX alpha.
    pub roughness: f32,
    pub ior: f32,
}

impl Material {
    pub fn diffuse(diffuse: Color) -> Self {
        Self {
            kind: MaterialKind::Diffuse,
            diffuse,
            specular: Color::BLACK,
            emissive: Color::BLACK,
            roughness: 1.0,
            ior: 1.0,
        }
    }

    pub fn conductor(specular: Color, roughness: f32) -> Self {
        Self {
            kind: MaterialKind::Conductor,
            diffuse: Color::BLACK,
            specular,
            emissive: Color::BLACK,
            roughness,
            ior: 1.0,
        }
    }

    pub fn dielectric(ior: f32, roughness: f32) -> Self {
        Self {
            kind: MaterialKind::Dielectric,
            diffuse: Color::BLACK,
            specular: Color::WHITE,
            emissive: Color::BLACK,
            roughness,
            ior,
        }
    }

    pub fn with_emissive(mut self, emissive: Color) -> Self {
        self.emissive = emissive;
        self
    }

    pub fn is_emissive(&self) -> bool {
        !self.emissive.is_black()
    }

    pub fn bxdf(&self) -> Bxdf {
        let alpha = self.roughness.clamp(0.0, 1.0).powi(2);
        match self.kind {
            MaterialKind::Diffuse => Lambert::new(self.diffuse).into(),
            MaterialKind::Conductor => {
                let fresnel = SchlickFresnel::new(self.specular);
                if alpha < SMOOTH_ALPHA {
                    SpecularConductor::new(fresnel).into()
                } else {
                    MicrofacetConductor::new(GgxMicrofacet::new(alpha), fresnel).into()
                }
            }
            MaterialKind::Dielectric => {
                let fresnel = DielectricFresnel::new(self.ior);
                if alpha < SMOOTH_ALPHA {
                    SpecularDielectric::new(fresnel).into()
                } else {
                    MicrofacetDielectric::new(GgxMicrofacet::new(alpha), fresnel).into()
                }
            }
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::diffuse(Color::gray(0.8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bxdf::BxdfT;

    #[test]
    fn smooth_surfaces_become_delta_lobes() {
        assert!(Material::conductor(Color::WHITE, 0.0).bxdf().is_delta());
        assert!(!Material::conductor(Color::WHITE, 0.4).bxdf().is_delta());
        assert!(Material::dielectric(1.5, 0.0).bxdf().is_delta());
        assert!(!Material::dielectric(1.5, 0.3).bxdf().is_delta());
        assert!(!Material::diffuse(Color::WHITE).bxdf().is_delta());
    }

    #[test]
    fn emission_flag() {
        assert!(!Material::default().is_emissive());
        assert!(Material::default()
            .with_emissive(Color::gray(4.0))
            .is_emissive());
    }
}
