pub mod bxdf;
pub mod camera;
pub mod core;
pub mod light;
pub mod loader;
pub mod material;
pub mod pixel_sampler;
pub mod primitive;
pub mod renderer;
