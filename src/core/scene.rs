use crate::{
    bxdf::Bxdf,
    core::{error::BuildError, intersection::TraverseResult, ray::Ray},
    light::{Emitter, EmitterInputs, EmitterT},
    material::Material,
    primitive::{KdTree, Triangle},
};

/// Immutable render input: triangles behind a KD-tree, materials and emitters.
pub struct Scene {
    kdtree: KdTree,
    materials: Vec<Material>,
    bxdfs: Vec<Bxdf>,
    emitters: Vec<Emitter>,
    /// Mesh emitter covering each triangle, if any.
    triangle_emitters: Vec<Option<usize>>,
}

impl Scene {
    /// Validates every cross reference, then builds the acceleration structure.
    pub fn new(
        triangles: Vec<Triangle>,
        materials: Vec<Material>,
        mut emitters: Vec<Emitter>,
        kd_max_depth: u32,
        kd_min_leaf_size: usize,
    ) -> Result<Self, BuildError> {
        for (index, triangle) in triangles.iter().enumerate() {
            if triangle.material() >= materials.len() {
                return Err(BuildError::InvalidMaterial {
                    triangle: index,
                    material: triangle.material(),
                    count: materials.len(),
                });
            }
        }

        let inputs = EmitterInputs {
            triangles: &triangles,
            materials: &materials,
        };
        for (index, emitter) in emitters.iter_mut().enumerate() {
            emitter.prepare(index, &inputs)?;
        }

        let mut triangle_emitters = vec![None; triangles.len()];
        for (index, emitter) in emitters.iter().enumerate() {
            if let Emitter::MeshEmitter(mesh) = emitter {
                for slot in &mut triangle_emitters[mesh.triangles()] {
                    *slot = Some(index);
                }
            }
        }

        let kdtree = KdTree::build(triangles, kd_max_depth, kd_min_leaf_size)?;
        let bxdfs = materials.iter().map(Material::bxdf).collect();
        log::info!(
            "scene: {} triangles, {} materials, {} emitters",
            kdtree.triangles().len(),
            materials.len(),
            emitters.len()
        );

        Ok(Self {
            kdtree,
            materials,
            bxdfs,
            emitters,
            triangle_emitters,
        })
    }

    pub fn kdtree(&self) -> &KdTree {
        &self.kdtree
    }

    pub fn traverse(&self, ray: &Ray) -> TraverseResult {
        self.kdtree.traverse(ray)
    }

    pub fn intersect_test(&self, ray: &Ray, t_max: f32) -> bool {
        self.kdtree.intersect_test(ray, t_max)
    }

    pub fn triangle(&self, index: usize) -> &Triangle {
        self.kdtree.triangle(index)
    }

    pub fn material(&self, index: usize) -> &Material {
        &self.materials[index]
    }

    /// Scattering model of a material, built once per scene.
    pub fn bxdf(&self, material: usize) -> &Bxdf {
        &self.bxdfs[material]
    }

    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    pub fn triangle_emitter(&self, triangle: usize) -> Option<usize> {
        self.triangle_emitters[triangle]
    }

    pub fn emitter_inputs(&self) -> EmitterInputs<'_> {
        EmitterInputs {
            triangles: self.kdtree.triangles(),
            materials: &self.materials,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::color::Color, light::MeshEmitter, light::UniformEmitter};

    fn triangle(material: usize) -> Triangle {
        Triangle::new([glam::Vec3A::ZERO, glam::Vec3A::X, glam::Vec3A::Y], material)
    }

    #[test]
    fn rejects_dangling_material() {
        let err = Scene::new(
            vec![triangle(0), triangle(2)],
            vec![Material::default(), Material::default()],
            vec![],
            16,
            5,
        )
        .err();
        assert_eq!(
            err,
            Some(BuildError::InvalidMaterial {
                triangle: 1,
                material: 2,
                count: 2
            })
        );
    }

    #[test]
    fn rejects_empty_scene() {
        let err = Scene::new(vec![], vec![], vec![UniformEmitter::new(Color::WHITE).into()], 16, 5);
        assert_eq!(err.err(), Some(BuildError::NoTriangles));
    }

    #[test]
    fn maps_triangles_to_mesh_emitters() {
        let lamp = Material::default().with_emissive(Color::WHITE);
        let scene = Scene::new(
            vec![triangle(0), triangle(1), triangle(1)],
            vec![Material::default(), lamp],
            vec![
                UniformEmitter::new(Color::gray(0.1)).into(),
                MeshEmitter::new(1..3, 1).into(),
            ],
            16,
            5,
        )
        .unwrap();
        assert_eq!(scene.triangle_emitter(0), None);
        assert_eq!(scene.triangle_emitter(1), Some(1));
        assert_eq!(scene.triangle_emitter(2), Some(1));
    }
}
