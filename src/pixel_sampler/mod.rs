mod hammersley;
mod random;
mod stratified;
mod uniform;

pub use hammersley::*;
pub use random::*;
pub use stratified::*;
pub use uniform::*;

use std::str::FromStr;

use crate::core::{error::BuildError, rng::Rng};

/// Generator of 2D sample positions inside a pixel.
///
/// A generator hands out a fixed budget of samples and then returns `None` for good;
/// the renderer copies a fresh generator for every pixel.
#[enum_dispatch::enum_dispatch(PixelSampler)]
pub trait PixelSamplerT: Send + Sync + Clone + Copy {
    fn spp(&self) -> u32;

    fn next_sample(&mut self, rng: &mut Rng) -> Option<(f32, f32)>;
}

#[enum_dispatch::enum_dispatch]
#[derive(Clone, Copy)]
pub enum PixelSampler {
    RandomSampler,
    UniformSampler,
    StratifiedSampler,
    HammersleySampler,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerKind {
    Random,
    Uniform,
    Stratified,
    Hammersley,
}

impl FromStr for SamplerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(Self::Random),
            "uniform" => Ok(Self::Uniform),
            "stratified" => Ok(Self::Stratified),
            "hammersley" => Ok(Self::Hammersley),
            _ => anyhow::bail!("unknown sampler '{}'", s),
        }
    }
}

/// Side length of the smallest square grid holding `spp` cells.
pub(crate) fn grid_subdivisions(spp: u32) -> u32 {
    let mut grid = (spp as f64).sqrt().ceil() as u32;
    while grid * grid < spp {
        grid += 1;
    }
    grid
}

pub fn create_pixel_sampler(
    kind: SamplerKind,
    spp: u32,
    jitter_offset: f32,
    jitter_scale: f32,
) -> Result<PixelSampler, BuildError> {
    if spp == 0 {
        return Err(BuildError::ZeroSamples);
    }
    let sampler = match kind {
        SamplerKind::Random => RandomSampler::new(spp).into(),
        SamplerKind::Uniform => UniformSampler::new(spp).into(),
        SamplerKind::Stratified => StratifiedSampler::new(spp, jitter_offset, jitter_scale)?.into(),
        SamplerKind::Hammersley => HammersleySampler::new(spp).into(),
    };
    Ok(sampler)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_ceiling_square_root() {
        assert_eq!(grid_subdivisions(1), 1);
        assert_eq!(grid_subdivisions(4), 2);
        assert_eq!(grid_subdivisions(5), 3);
        assert_eq!(grid_subdivisions(16), 4);
        assert_eq!(grid_subdivisions(17), 5);
    }

    #[test]
    fn factory_validates_budget() {
        assert!(matches!(
            create_pixel_sampler(SamplerKind::Random, 0, 0.0, 1.0),
            Err(BuildError::ZeroSamples)
        ));
        let sampler = create_pixel_sampler(SamplerKind::Hammersley, 8, 0.0, 1.0).unwrap();
        assert_eq!(sampler.spp(), 8);
        assert_eq!("stratified".parse::<SamplerKind>().unwrap(), SamplerKind::Stratified);
        assert!("sobol".parse::<SamplerKind>().is_err());
    }
}
