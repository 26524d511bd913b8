mod util;

mod lambert;

mod fresnel;
mod microfacet;
mod microfacet_conductor;
mod microfacet_dielectric;

mod specular_conductor;
mod specular_dielectric;

pub use lambert::*;

pub use fresnel::*;
pub use microfacet::*;
pub use microfacet_conductor::*;
pub use microfacet_dielectric::*;

pub use specular_conductor::*;
pub use specular_dielectric::*;

use crate::core::{color::Color, coord::Coordinate, rng::Rng};

/// Number of draws before a sample stuck on the wrong side of the surface is
/// treated as absorbed.
pub const MAX_SAMPLE_RETRIES: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BsdfClass {
    Diffuse,
    Reflection,
    Transmittance,
}

/// `Backward` scatters back to the side the path arrived from, `Forward` continues
/// through the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScatterDirection {
    Forward,
    Backward,
}

/// A sampled lobe direction in the local shading frame (+Z is the shading normal).
#[derive(Debug, Clone, Copy)]
pub struct BxdfSample {
    pub wi: glam::Vec3A,
    pub class: BsdfClass,
    pub direction: ScatterDirection,
    pub bxdf: Color,
    pub pdf: f32,
}

impl BxdfSample {
    fn absorbed(class: BsdfClass, direction: ScatterDirection) -> Self {
        Self {
            wi: glam::Vec3A::ZERO,
            class,
            direction,
            bxdf: Color::BLACK,
            pdf: 0.0,
        }
    }

    /// Throughput multiplier `bxdf * |cos| / pdf`.
    pub fn evaluate(&self) -> Color {
        if self.pdf > 0.0 {
            self.bxdf * (self.wi.z.abs() / self.pdf)
        } else {
            Color::BLACK
        }
    }
}

/// `wo` points away from the surface towards the previous path vertex. All vectors
/// are in the local shading frame.
#[enum_dispatch::enum_dispatch(Bxdf)]
pub trait BxdfT {
    fn sample(&self, wo: glam::Vec3A, rng: &mut Rng) -> BxdfSample;

    fn pdf(&self, wo: glam::Vec3A, wi: glam::Vec3A) -> f32;

    fn bxdf(&self, wo: glam::Vec3A, wi: glam::Vec3A) -> Color;

    fn is_delta(&self) -> bool;
}

#[enum_dispatch::enum_dispatch]
pub enum Bxdf {
    Lambert,
    MicrofacetConductor,
    MicrofacetDielectric,
    SpecularConductor,
    SpecularDielectric,
}

impl Bxdf {
    /// Draws a world-space scattering direction.
    ///
    /// A sample that lands on the wrong side of the geometric surface for its lobe is
    /// drawn again, up to `MAX_SAMPLE_RETRIES` times. `None` means the path is absorbed.
    pub fn sample_world(
        &self,
        coord: &Coordinate,
        wo_world: glam::Vec3A,
        rng: &mut Rng,
    ) -> Option<(glam::Vec3A, BxdfSample)> {
        let wo = coord.to_local(wo_world);
        for _ in 0..MAX_SAMPLE_RETRIES {
            let sample = self.sample(wo, rng);
            if sample.pdf <= 0.0 || !sample.pdf.is_finite() {
                continue;
            }
            let wi_world = coord.to_world(sample.wi);
            if coord.in_expected_hemisphere(wi_world, sample.direction) {
                return Some((wi_world, sample));
            }
        }
        None
    }
}
