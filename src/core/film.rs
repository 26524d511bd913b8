use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use image::{Rgba, RgbaImage};

/// RGBA pixel buffer written once per pixel from many threads without locking.
pub struct Film {
    width: u32,
    height: u32,
    pixels: Vec<[AtomicU32; 4]>,
    written: Vec<AtomicBool>,
}

impl Film {
    pub fn new(width: u32, height: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: (0..size).map(|_| Default::default()).collect(),
            written: (0..size).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index_of(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn set_pixel(&self, x: u32, y: u32, rgba: [f32; 4]) {
        let index = self.index_of(x, y);
        for (slot, value) in self.pixels[index].iter().zip(rgba) {
            slot.store(value.to_bits(), Ordering::Relaxed);
        }
        self.written[index].store(true, Ordering::Release);
    }

    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        let index = self.index_of(x, y);
        let mut rgba = [0.0; 4];
        for (value, slot) in rgba.iter_mut().zip(&self.pixels[index]) {
            *value = f32::from_bits(slot.load(Ordering::Relaxed));
        }
        rgba
    }

    pub fn is_written(&self, x: u32, y: u32) -> bool {
        self.written[self.index_of(x, y)].load(Ordering::Acquire)
    }

    pub fn written_count(&self) -> usize {
        self.written
            .iter()
            .filter(|written| written.load(Ordering::Acquire))
            .count()
    }

    /// Linear values clamped to [0, 1]; pixels never written stay transparent black.
    pub fn to_image(&self) -> RgbaImage {
        let mut image = RgbaImage::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                image.put_pixel(x, y, rgba_to_pixel(self.pixel(x, y)));
            }
        }
        image
    }
}

fn rgba_to_pixel(rgba: [f32; 4]) -> Rgba<u8> {
    let to_u8 = |value: f32| (value * 255.0).clamp(0.0, 255.0) as u8;
    Rgba([to_u8(rgba[0]), to_u8(rgba[1]), to_u8(rgba[2]), to_u8(rgba[3])])
}
