/// Rectangle of pixels `[x0, x1) x [y0, y1)` rendered by one worker at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Tile {
    pub fn pixel_count(&self) -> u64 {
        (self.x1 - self.x0) as u64 * (self.y1 - self.y0) as u64
    }
}

/// Row-major tiles covering the image; tiles on the right and bottom edges may be
/// smaller than `tile_size`.
pub fn create_tiles(width: u32, height: u32, tile_size: u32) -> Vec<Tile> {
    let tile_size = tile_size.max(1);
    let mut tiles = Vec::new();
    for y0 in (0..height).step_by(tile_size as usize) {
        for x0 in (0..width).step_by(tile_size as usize) {
            tiles.push(Tile {
                x0,
                y0,
                x1: (x0 + tile_size).min(width),
                y1: (y0 + tile_size).min(height),
            });
        }
    }
    tiles
}

pub fn render_progress_bar(width: u32, height: u32) -> indicatif::ProgressBar {
    let progress_bar = indicatif::ProgressBar::new(width as u64 * height as u64);
    progress_bar.set_style(
        indicatif::ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} (eta: {eta})")
            .progress_chars("#>-"),
    );
    progress_bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_cover_image_once() {
        let tiles = create_tiles(37, 20, 16);
        assert_eq!(tiles.len(), 3 * 2);
        assert_eq!(tiles.iter().map(Tile::pixel_count).sum::<u64>(), 37 * 20);
        assert_eq!(
            tiles[5],
            Tile {
                x0: 32,
                y0: 16,
                x1: 37,
                y1: 20
            }
        );
        assert!(create_tiles(0, 10, 4).is_empty());
    }
}
