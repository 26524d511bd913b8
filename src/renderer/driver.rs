use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
    thread::JoinHandle,
    time::{Duration, Instant},
};

use crate::{
    camera::{Camera, CameraT},
    core::{color::Color, error::BuildError, rng::Rng, scene::Scene},
    pixel_sampler::{PixelSampler, PixelSamplerT},
};

use super::{create_integrator, util, Integrator, IntegratorT, RenderConfig};

/// Summary of a finished or cancelled render.
#[derive(Debug, Clone, Copy)]
pub struct RenderOutcome {
    pub pixels_written: u64,
    pub total_pixels: u64,
    pub cancelled: bool,
    pub elapsed: Duration,
}

/// Per-render state shared by all workers.
struct RenderControl<'a> {
    stop: &'a AtomicBool,
    progress: &'a AtomicU64,
}

/// Splits the image into tiles and integrates them on a pool of scoped workers.
pub struct Renderer {
    integrator: Integrator,
    pixel_sampler: PixelSampler,
    threads: usize,
    tile_size: u32,
    seed: Option<u64>,
    show_progress: bool,
}

impl Renderer {
    pub fn new(config: &RenderConfig) -> Result<Self, BuildError> {
        config.validate()?;
        Ok(Self {
            integrator: create_integrator(config),
            pixel_sampler: config.pixel_sampler()?,
            threads: config.thread_count(),
            tile_size: config.tile_size.max(1),
            seed: config.seed,
            show_progress: false,
        })
    }

    pub fn with_progress_bar(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Renders the whole image, calling `output` once for every pixel, and returns when
    /// all workers are done.
    pub fn render<F>(
        &self,
        scene: &Scene,
        camera: &Camera,
        width: u32,
        height: u32,
        output: F,
    ) -> RenderOutcome
    where
        F: Fn(u32, u32, [f32; 4]) + Sync,
    {
        let stop = AtomicBool::new(false);
        let progress = AtomicU64::new(0);
        let control = RenderControl {
            stop: &stop,
            progress: &progress,
        };
        self.render_tiles(scene, camera, width, height, &control, &output)
    }

    /// Starts rendering on a background thread. Dropping the returned job without
    /// waiting leaves the render running to completion.
    pub fn spawn<F>(
        self,
        scene: Arc<Scene>,
        camera: Arc<Camera>,
        width: u32,
        height: u32,
        output: F,
    ) -> RenderJob
    where
        F: Fn(u32, u32, [f32; 4]) + Send + Sync + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let progress = Arc::new(AtomicU64::new(0));
        let handle = {
            let stop = stop.clone();
            let progress = progress.clone();
            std::thread::spawn(move || {
                let control = RenderControl {
                    stop: &stop,
                    progress: &progress,
                };
                self.render_tiles(&scene, &camera, width, height, &control, &output)
            })
        };
        RenderJob {
            stop,
            progress,
            total_pixels: width as u64 * height as u64,
            handle,
        }
    }

    fn render_tiles<F>(
        &self,
        scene: &Scene,
        camera: &Camera,
        width: u32,
        height: u32,
        control: &RenderControl,
        output: &F,
    ) -> RenderOutcome
    where
        F: Fn(u32, u32, [f32; 4]) + Sync,
    {
        let start = Instant::now();
        let total_pixels = width as u64 * height as u64;
        log::info!(
            "render: {}x{}, {} spp, {} threads",
            width,
            height,
            self.pixel_sampler.spp(),
            self.threads
        );

        let tiles = util::create_tiles(width, height, self.tile_size);
        let next_tile = AtomicUsize::new(0);
        let progress_bar = if self.show_progress {
            util::render_progress_bar(width, height)
        } else {
            indicatif::ProgressBar::hidden()
        };
        let aspect = width as f32 / height.max(1) as f32;

        let result = crossbeam::scope(|scope| {
            for _ in 0..self.threads.max(1) {
                let tiles = &tiles;
                let next_tile = &next_tile;
                let progress_bar = progress_bar.clone();

                scope.spawn(move |_| loop {
                    if control.stop.load(Ordering::Relaxed) {
                        break;
                    }
                    let tile_index = next_tile.fetch_add(1, Ordering::Relaxed);
                    let tile = match tiles.get(tile_index) {
                        Some(tile) => tile,
                        None => break,
                    };
                    let mut rng = match self.seed {
                        Some(seed) => Rng::with_seed(
                            seed ^ (tile_index as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15),
                        ),
                        None => Rng::new(),
                    };

                    for j in tile.y0..tile.y1 {
                        for i in tile.x0..tile.x1 {
                            let color = match self.render_pixel(
                                scene, camera, i, j, width, height, aspect, control, &mut rng,
                            ) {
                                Some(color) => color,
                                None => return,
                            };
                            output(i, j, color.to_rgba(1.0));
                            control.progress.fetch_add(1, Ordering::Relaxed);
                            progress_bar.inc(1);
                        }
                    }
                    log::debug!("tile {} done, {} pixels", tile_index, tile.pixel_count());
                });
            }
        });
        if let Err(err) = result {
            std::panic::resume_unwind(err);
        }

        let pixels_written = control.progress.load(Ordering::Relaxed);
        let cancelled = control.stop.load(Ordering::Relaxed) && pixels_written < total_pixels;
        let elapsed = start.elapsed();
        if cancelled {
            progress_bar.abandon();
            log::warn!(
                "render cancelled after {}/{} pixels",
                pixels_written,
                total_pixels
            );
        } else {
            progress_bar.finish();
            log::info!("render finished in {:.2}s", elapsed.as_secs_f32());
        }

        RenderOutcome {
            pixels_written,
            total_pixels,
            cancelled,
            elapsed,
        }
    }

    /// Averages every sample of one pixel. `None` when a stop was requested, in which
    /// case the partial estimate is dropped.
    #[allow(clippy::too_many_arguments)]
    fn render_pixel(
        &self,
        scene: &Scene,
        camera: &Camera,
        i: u32,
        j: u32,
        width: u32,
        height: u32,
        aspect: f32,
        control: &RenderControl,
        rng: &mut Rng,
    ) -> Option<Color> {
        let width_inv = 1.0 / width as f32;
        let height_inv = 1.0 / height as f32;
        let mut pixel_sampler = self.pixel_sampler;
        let mut sum = Color::BLACK;
        let mut count = 0;

        while let Some((offset_x, offset_y)) = pixel_sampler.next_sample(rng) {
            if control.stop.load(Ordering::Relaxed) {
                return None;
            }
            let x = ((i as f32 + offset_x) * width_inv - 0.5) * aspect;
            let y = ((height - j - 1) as f32 + offset_y) * height_inv - 0.5;
            let ray = camera.generate_ray((x, y));
            let color = self.integrator.radiance(scene, ray, rng);
            if color.is_finite() {
                sum += color;
            }
            count += 1;
        }

        Some(if count > 0 {
            sum / count as f32
        } else {
            Color::BLACK
        })
    }
}

/// Handle to a render running on a background thread.
pub struct RenderJob {
    stop: Arc<AtomicBool>,
    progress: Arc<AtomicU64>,
    total_pixels: u64,
    handle: JoinHandle<RenderOutcome>,
}

impl RenderJob {
    /// Asks the workers to finish; pixels in flight are discarded.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Completed and total pixel counts.
    pub fn progress(&self) -> (u64, u64) {
        (self.progress.load(Ordering::Relaxed), self.total_pixels)
    }

    pub fn wait_for_completion(self) -> anyhow::Result<RenderOutcome> {
        self.handle
            .join()
            .map_err(|_| anyhow::anyhow!("render thread panicked"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;

    use super::*;
    use crate::{
        camera::PerspectiveCamera,
        core::film::Film,
        renderer::{testing, IntegratorMode},
    };

    fn camera() -> Camera {
        PerspectiveCamera::look_at(
            glam::Vec3A::new(0.3, 0.3, 2.0),
            glam::Vec3A::new(0.3, 0.3, 0.0),
            glam::Vec3A::Y,
            std::f32::consts::FRAC_PI_3,
        )
        .into()
    }

    fn config(spp: u32) -> RenderConfig {
        RenderConfig {
            spp,
            threads: 3,
            tile_size: 4,
            max_path_length: 4,
            seed: Some(11),
            ..RenderConfig::default()
        }
    }

    #[test]
    fn output_called_once_per_pixel() {
        let scene = testing::single_triangle_scene(Color::WHITE);
        let (width, height) = (7, 5);
        let counts: Vec<AtomicU32> = (0..width * height).map(|_| AtomicU32::new(0)).collect();

        let renderer = Renderer::new(&config(4)).unwrap();
        let outcome = renderer.render(&scene, &camera(), width, height, |x, y, rgba| {
            assert!(rgba.iter().all(|c| c.is_finite() && *c >= 0.0));
            assert_eq!(rgba[3], 1.0);
            counts[(y * width + x) as usize].fetch_add(1, Ordering::Relaxed);
        });

        assert!(!outcome.cancelled);
        assert_eq!(outcome.pixels_written, (width * height) as u64);
        assert!(counts.iter().all(|c| c.load(Ordering::Relaxed) == 1));
    }

    #[test]
    fn seeded_renders_are_reproducible() {
        let scene = testing::single_triangle_scene(Color::gray(0.7));
        let render = || {
            let film = Film::new(8, 6);
            Renderer::new(&config(4))
                .unwrap()
                .render(&scene, &camera(), 8, 6, |x, y, rgba| film.set_pixel(x, y, rgba));
            film
        };
        let a = render();
        let b = render();
        for y in 0..6 {
            for x in 0..8 {
                assert_eq!(a.pixel(x, y), b.pixel(x, y));
            }
        }
    }

    #[test]
    fn normals_image_sees_the_triangle() {
        let scene = testing::single_triangle_scene(Color::WHITE);
        let config = RenderConfig {
            integrator: IntegratorMode::Normals,
            ..config(1)
        };
        let film = Film::new(16, 16);
        Renderer::new(&config)
            .unwrap()
            .render(&scene, &camera(), 16, 16, |x, y, rgba| film.set_pixel(x, y, rgba));

        // the camera looks straight at the triangle's centroid region
        let center = film.pixel(8, 8);
        assert!((center[2] - 1.0).abs() < 1e-5, "{:?}", center);
        let corner = film.pixel(15, 0);
        assert_eq!(corner, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn stop_discards_remaining_pixels() {
        let scene = Arc::new(testing::single_triangle_scene(Color::WHITE));
        let film = Arc::new(Film::new(64, 64));
        let renderer = Renderer::new(&RenderConfig {
            spp: 4096,
            ..config(1)
        })
        .unwrap();

        let target = film.clone();
        let job = renderer.spawn(scene, Arc::new(camera()), 64, 64, move |x, y, rgba| {
            target.set_pixel(x, y, rgba)
        });
        job.stop();
        let outcome = job.wait_for_completion().unwrap();

        assert!(outcome.cancelled);
        assert!(outcome.pixels_written < outcome.total_pixels);
        assert_eq!(film.written_count() as u64, outcome.pixels_written);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = RenderConfig {
            spp: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(Renderer::new(&config), Err(BuildError::ZeroSamples)));
    }
}
