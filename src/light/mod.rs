mod environment;
mod mesh;
mod uniform;

pub use environment::*;
pub use mesh::*;
pub use uniform::*;

use crate::{
    core::{color::Color, error::BuildError, rng::Rng},
    material::Material,
    primitive::Triangle,
};

/// Scene data an emitter may need while sampling or evaluating.
pub struct EmitterInputs<'a> {
    pub triangles: &'a [Triangle],
    pub materials: &'a [Material],
}

/// Direction towards a point on an emitter, seen from a shading point.
#[derive(Debug, Clone, Copy)]
pub struct EmitterSample {
    pub wi: glam::Vec3A,
    /// Solid-angle density of `wi`.
    pub pdf: f32,
    pub radiance: Color,
    /// Distance to the sampled point, infinite for emitters at infinity.
    pub dist: f32,
}

#[enum_dispatch::enum_dispatch(Emitter)]
pub trait EmitterT: Send + Sync {
    /// Checks references into the scene and precomputes sampling tables. Called once
    /// by the scene before rendering.
    fn prepare(&mut self, _index: usize, _inputs: &EmitterInputs) -> Result<(), BuildError> {
        Ok(())
    }

    /// Radiance carried by a ray that leaves the scene along `dir`.
    fn background(&self, dir: glam::Vec3A) -> Color;

    fn sample(
        &self,
        position: glam::Vec3A,
        inputs: &EmitterInputs,
        rng: &mut Rng,
    ) -> Option<EmitterSample>;

    /// Solid-angle density with which `sample` would produce `wi` from `position`.
    /// `hit` is the triangle index and point the direction reaches, `None` for an
    /// escaping ray.
    fn pdf(
        &self,
        position: glam::Vec3A,
        wi: glam::Vec3A,
        hit: Option<(usize, glam::Vec3A)>,
        inputs: &EmitterInputs,
    ) -> f32;
}

#[enum_dispatch::enum_dispatch]
pub enum Emitter {
    UniformEmitter,
    EnvironmentEmitter,
    MeshEmitter,
}
