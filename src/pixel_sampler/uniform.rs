use crate::core::rng::Rng;

use super::{grid_subdivisions, PixelSamplerT};

/// Centers of a `g x g` grid in row-major order, `g = ceil(sqrt(spp))`.
#[derive(Clone, Copy)]
pub struct UniformSampler {
    grid: u32,
    grid_inv: f32,
    curr_index: u32,
}

impl UniformSampler {
    pub fn new(spp: u32) -> Self {
        let grid = grid_subdivisions(spp);
        Self {
            grid,
            grid_inv: 1.0 / grid as f32,
            curr_index: 0,
        }
    }

    pub fn grid(&self) -> u32 {
        self.grid
    }
}

impl PixelSamplerT for UniformSampler {
    /// Every cell is visited, so this can exceed the requested count.
    fn spp(&self) -> u32 {
        self.grid * self.grid
    }

    fn next_sample(&mut self, _rng: &mut Rng) -> Option<(f32, f32)> {
        if self.curr_index >= self.grid * self.grid {
            return None;
        }
        let x = self.curr_index % self.grid;
        let y = self.curr_index / self.grid;
        self.curr_index += 1;
        Some((
            (x as f32 + 0.5) * self.grid_inv,
            (y as f32 + 0.5) * self.grid_inv,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausts_after_full_grid() {
        let mut sampler = UniformSampler::new(5);
        assert_eq!(sampler.grid(), 3);
        let mut rng = Rng::with_seed(2);
        let samples: Vec<_> = std::iter::from_fn(|| sampler.next_sample(&mut rng)).collect();
        assert_eq!(samples.len(), 9);
        assert!(sampler.next_sample(&mut rng).is_none());

        let third = 1.0 / 3.0;
        assert!((samples[0].0 - 0.5 * third).abs() < 1e-6);
        assert!((samples[1].0 - 1.5 * third).abs() < 1e-6);
        assert!((samples[3].1 - 1.5 * third).abs() < 1e-6);
    }
}
