use crate::core::rng::Rng;

use super::PixelSamplerT;

#[derive(Clone, Copy)]
pub struct RandomSampler {
    spp: u32,
    curr_index: u32,
}

impl RandomSampler {
    pub fn new(spp: u32) -> Self {
        Self { spp, curr_index: 0 }
    }
}

impl PixelSamplerT for RandomSampler {
    fn spp(&self) -> u32 {
        self.spp
    }

    fn next_sample(&mut self, rng: &mut Rng) -> Option<(f32, f32)> {
        if self.curr_index < self.spp {
            self.curr_index += 1;
            Some(rng.uniform_2d())
        } else {
            None
        }
    }
}
