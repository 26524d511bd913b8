use std::path::PathBuf;

use anyhow::Context;
use glam::Vec3A;
use structopt::StructOpt;

use kd_path_tracer::{
    camera::{Camera, PerspectiveCamera},
    core::{color::Color, film::Film, scene::Scene},
    light::{Emitter, MeshEmitter, UniformEmitter},
    loader,
    material::Material,
    pixel_sampler::SamplerKind,
    primitive::Triangle,
    renderer::{IntegratorMode, RenderConfig, Renderer},
};

#[derive(StructOpt)]
#[structopt(
    name = "kd-path-tracer",
    about = "Renders a Cornell-style box with a KD-tree accelerated path tracer"
)]
struct Opt {
    /// JSON file with render options and an optional `camera` section
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,
    #[structopt(long, default_value = "512")]
    width: u32,
    #[structopt(long, default_value = "512")]
    height: u32,
    #[structopt(short, long, parse(from_os_str), default_value = "output.png")]
    output: PathBuf,
    #[structopt(long)]
    spp: Option<u32>,
    /// path, normals or ao
    #[structopt(long)]
    integrator: Option<IntegratorMode>,
    /// random, uniform, stratified or hammersley
    #[structopt(long)]
    sampler: Option<SamplerKind>,
}

/// Two triangles spanning `corner + [0, 1] * u + [0, 1] * v`, facing `u x v`.
fn quad(corner: Vec3A, u: Vec3A, v: Vec3A, material: usize) -> [Triangle; 2] {
    [
        Triangle::new([corner, corner + u, corner + u + v], material),
        Triangle::new([corner, corner + u + v, corner + v], material),
    ]
}

/// Axis-aligned box with outward facing sides.
fn cuboid(min: Vec3A, max: Vec3A, material: usize) -> Vec<Triangle> {
    let d = max - min;
    let (dx, dy, dz) = (Vec3A::X * d.x, Vec3A::Y * d.y, Vec3A::Z * d.z);
    [
        quad(min, dz, dy, material),
        quad(Vec3A::new(max.x, min.y, min.z), dy, dz, material),
        quad(min, dx, dz, material),
        quad(Vec3A::new(min.x, max.y, min.z), dz, dx, material),
        quad(min, dy, dx, material),
        quad(Vec3A::new(min.x, min.y, max.z), dx, dy, material),
    ]
    .iter()
    .flatten()
    .cloned()
    .collect()
}

fn cornell_box() -> (Vec<Triangle>, Vec<Material>, Vec<Emitter>) {
    let materials = vec![
        Material::diffuse(Color::gray(0.8)),
        Material::diffuse(Color::new(0.63, 0.065, 0.05)),
        Material::diffuse(Color::new(0.14, 0.45, 0.091)),
        Material::diffuse(Color::gray(0.8)).with_emissive(Color::gray(15.0)),
        Material::conductor(Color::new(0.95, 0.64, 0.54), 0.3),
        Material::dielectric(1.5, 0.0),
    ];

    let mut triangles = Vec::new();
    let (x2, y2, z2) = (Vec3A::X * 2.0, Vec3A::Y * 2.0, Vec3A::Z * 2.0);
    triangles.extend(quad(Vec3A::new(-1.0, 0.0, -1.0), z2, x2, 0));
    triangles.extend(quad(Vec3A::new(-1.0, 2.0, -1.0), x2, z2, 0));
    triangles.extend(quad(Vec3A::new(-1.0, 0.0, -1.0), x2, y2, 0));
    triangles.extend(quad(Vec3A::new(-1.0, 0.0, -1.0), y2, z2, 1));
    triangles.extend(quad(Vec3A::new(1.0, 0.0, -1.0), z2, y2, 2));

    triangles.extend(cuboid(
        Vec3A::new(-0.7, 0.0, -0.7),
        Vec3A::new(-0.15, 1.2, -0.15),
        0,
    ));
    triangles.extend(cuboid(
        Vec3A::new(0.2, 0.0, -0.6),
        Vec3A::new(0.75, 0.6, -0.05),
        4,
    ));
    triangles.extend(cuboid(
        Vec3A::new(-0.25, 0.0, 0.2),
        Vec3A::new(0.25, 0.5, 0.7),
        5,
    ));

    let lamp_start = triangles.len();
    triangles.extend(quad(
        Vec3A::new(-0.25, 1.98, -0.25),
        Vec3A::X * 0.5,
        Vec3A::Z * 0.5,
        3,
    ));
    let emitters = vec![
        MeshEmitter::new(lamp_start..triangles.len(), 3).into(),
        UniformEmitter::new(Color::gray(0.05)).into(),
    ];

    (triangles, materials, emitters)
}

fn default_camera() -> Camera {
    PerspectiveCamera::new(
        Vec3A::new(0.0, 1.0, 3.4),
        -Vec3A::Z,
        Vec3A::Y,
        40.0_f32.to_radians(),
    )
    .into()
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opt = Opt::from_args();
    if opt.width == 0 || opt.height == 0 {
        anyhow::bail!("image size must be positive, got {}x{}", opt.width, opt.height);
    }

    let (mut config, camera) = match &opt.config {
        Some(path) => {
            let loaded = loader::load_config(path)?;
            (loaded.render, loaded.camera)
        }
        None => (RenderConfig::default(), None),
    };
    if let Some(spp) = opt.spp {
        config.spp = spp;
    }
    if let Some(integrator) = opt.integrator {
        config.integrator = integrator;
    }
    if let Some(sampler) = opt.sampler {
        config.sampler = sampler;
    }
    let camera = camera.unwrap_or_else(default_camera);

    let (triangles, materials, emitters) = cornell_box();
    let scene = Scene::new(
        triangles,
        materials,
        emitters,
        config.kd_max_depth,
        config.kd_min_leaf_size,
    )?;

    let film = Film::new(opt.width, opt.height);
    let renderer = Renderer::new(&config)?.with_progress_bar(true);
    renderer.render(&scene, &camera, opt.width, opt.height, |x, y, rgba| {
        film.set_pixel(x, y, rgba)
    });

    film.to_image()
        .save(&opt.output)
        .with_context(|| format!("can't save image to '{}'", opt.output.display()))?;
    log::info!("image saved to '{}'", opt.output.display());

    Ok(())
}
