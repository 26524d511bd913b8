use glam::Vec3A;

use crate::{
    core::{color::Color, ray::Ray, scene::Scene},
    light::{MeshEmitter, UniformEmitter},
    material::Material,
    primitive::Triangle,
};

/// Reflectance standing in for a "white" diffuse surface.
pub const WHITE_ALBEDO: f32 = 0.8;

/// Triangle (0,0,0)-(1,0,0)-(0,1,0), facing +Z, under a uniform sky.
pub fn single_triangle_scene(sky: Color) -> Scene {
    let triangle = Triangle::new([Vec3A::ZERO, Vec3A::X, Vec3A::Y], 0);
    Scene::new(
        vec![triangle],
        vec![Material::diffuse(Color::gray(WHITE_ALBEDO))],
        vec![UniformEmitter::new(sky).into()],
        24,
        5,
    )
    .unwrap()
}

pub fn centroid_ray() -> Ray {
    Ray::primary(Vec3A::new(1.0 / 3.0, 1.0 / 3.0, 1.0), -Vec3A::Z)
}

pub fn missing_ray() -> Ray {
    Ray::primary(Vec3A::new(5.0, 5.0, 1.0), -Vec3A::Z)
}

/// Square in the plane `y = height` spanning [-half, half] in x and z, facing -Y.
pub fn quad_facing_down(height: f32, half: f32, material: usize) -> Vec<Triangle> {
    let p = |x: f32, z: f32| Vec3A::new(x * half, height, z * half);
    vec![
        Triangle::new([p(-1.0, -1.0), p(1.0, 1.0), p(-1.0, 1.0)], material),
        Triangle::new([p(-1.0, -1.0), p(1.0, -1.0), p(1.0, 1.0)], material),
    ]
}

/// Square in the plane `y = 0` facing +Y.
pub fn floor(half: f32, material: usize) -> Vec<Triangle> {
    let p = |x: f32, z: f32| Vec3A::new(x * half, 0.0, z * half);
    vec![
        Triangle::new([p(-1.0, -1.0), p(-1.0, 1.0), p(1.0, 1.0)], material),
        Triangle::new([p(-1.0, -1.0), p(1.0, 1.0), p(1.0, -1.0)], material),
    ]
}

pub fn floor_under_sky_scene(albedo: f32) -> Scene {
    Scene::new(
        floor(100.0, 0),
        vec![Material::diffuse(Color::gray(albedo))],
        vec![UniformEmitter::new(Color::WHITE).into()],
        24,
        5,
    )
    .unwrap()
}

/// Floor with a huge ceiling one unit above it and no light.
pub fn covered_floor_scene() -> Scene {
    let mut triangles = floor(1000.0, 0);
    triangles.extend(quad_facing_down(1.0, 1000.0, 0));
    Scene::new(triangles, vec![Material::default()], vec![], 24, 5).unwrap()
}

/// Albedo 0.5 floor lit only by a 2x2 emissive square one unit above the origin.
pub fn floor_under_lamp_scene() -> Scene {
    let mut triangles = floor(100.0, 0);
    let lamp_start = triangles.len();
    triangles.extend(quad_facing_down(1.0, 1.0, 1));
    let lamp_end = triangles.len();
    Scene::new(
        triangles,
        vec![
            Material::diffuse(Color::gray(0.5)),
            Material::diffuse(Color::BLACK).with_emissive(Color::WHITE),
        ],
        vec![MeshEmitter::new(lamp_start..lamp_end, 1).into()],
        24,
        5,
    )
    .unwrap()
}
