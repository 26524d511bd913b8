mod ao;
mod config;
mod driver;
mod normals;
mod path;
#[cfg(test)]
mod testing;
mod util;

pub use ao::*;
pub use config::*;
pub use driver::*;
pub use normals::*;
pub use path::*;

use crate::core::{color::Color, ray::Ray, rng::Rng, scene::Scene};

/// Estimates the radiance arriving along a camera ray.
#[enum_dispatch::enum_dispatch(Integrator)]
pub trait IntegratorT: Send + Sync {
    fn radiance(&self, scene: &Scene, ray: Ray, rng: &mut Rng) -> Color;
}

#[enum_dispatch::enum_dispatch]
pub enum Integrator {
    PathIntegrator,
    NormalsIntegrator,
    AoIntegrator,
}

pub fn create_integrator(config: &RenderConfig) -> Integrator {
    match config.integrator {
        IntegratorMode::Path => PathIntegrator::new(
            config.max_path_length,
            config.roulette_start_depth,
            config.next_event_estimation,
        )
        .into(),
        IntegratorMode::Normals => NormalsIntegrator::new().into(),
        IntegratorMode::AmbientOcclusion => AoIntegrator::new(config.ao_distance).into(),
    }
}
