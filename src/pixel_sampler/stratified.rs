use crate::core::{error::BuildError, rng::Rng};

use super::{grid_subdivisions, PixelSamplerT};

/// One sample per cell of a `g x g` grid, placed at `offset + scale * rand` inside the
/// cell. `offset = 0, scale = 1` is classic jittering, `offset = 0.5, scale = 0`
/// degenerates to cell centers.
#[derive(Clone, Copy)]
pub struct StratifiedSampler {
    grid: u32,
    grid_inv: f32,
    offset: f32,
    scale: f32,
    curr_index: u32,
}

impl StratifiedSampler {
    pub fn new(spp: u32, offset: f32, scale: f32) -> Result<Self, BuildError> {
        let valid = offset >= 0.0 && scale >= 0.0 && offset + scale <= 1.0;
        if !valid {
            return Err(BuildError::InvalidJitter { offset, scale });
        }
        let grid = grid_subdivisions(spp);
        Ok(Self {
            grid,
            grid_inv: 1.0 / grid as f32,
            offset,
            scale,
            curr_index: 0,
        })
    }
}

impl PixelSamplerT for StratifiedSampler {
    fn spp(&self) -> u32 {
        self.grid * self.grid
    }

    fn next_sample(&mut self, rng: &mut Rng) -> Option<(f32, f32)> {
        if self.curr_index >= self.grid * self.grid {
            return None;
        }
        let x = self.curr_index % self.grid;
        let y = self.curr_index / self.grid;
        self.curr_index += 1;
        let (rand_x, rand_y) = rng.uniform_2d();
        // the jitter may round up to exactly 1.0, keep it inside the cell
        let jitter = |rand: f32| (self.offset + self.scale * rand).min(1.0 - f32::EPSILON);
        Some((
            (x as f32 + jitter(rand_x)) * self.grid_inv,
            (y as f32 + jitter(rand_y)) * self.grid_inv,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_sample_per_cell() {
        let mut sampler = StratifiedSampler::new(16, 0.0, 1.0).unwrap();
        let mut rng = Rng::with_seed(3);
        let mut cells = [false; 16];
        for _ in 0..16 {
            let (x, y) = sampler.next_sample(&mut rng).unwrap();
            let cell = (y * 4.0) as usize * 4 + (x * 4.0) as usize;
            assert!(!cells[cell]);
            cells[cell] = true;
        }
        assert!(cells.iter().all(|c| *c));
        assert!(sampler.next_sample(&mut rng).is_none());
    }

    #[test]
    fn zero_scale_gives_fixed_positions() {
        let mut sampler = StratifiedSampler::new(4, 0.5, 0.0).unwrap();
        let mut rng = Rng::with_seed(4);
        assert_eq!(sampler.next_sample(&mut rng), Some((0.25, 0.25)));
        assert_eq!(sampler.next_sample(&mut rng), Some((0.75, 0.25)));
    }

    #[test]
    fn rejects_jitter_outside_cell() {
        assert!(StratifiedSampler::new(4, 0.5, 0.8).is_err());
        assert!(StratifiedSampler::new(4, -0.1, 0.5).is_err());
    }
}
