use std::ops::Range;

use crate::core::{alias_table::AliasTable, color::Color, error::BuildError, rng::Rng};

use super::{EmitterInputs, EmitterSample, EmitterT};

/// Area light over a contiguous range of already loaded triangles. Emits from the
/// front face only, with the radiance of its material's emissive color.
pub struct MeshEmitter {
    triangles: Range<usize>,
    material: usize,
    alias_table: Option<AliasTable>,
    total_area: f32,
}

impl MeshEmitter {
    pub fn new(triangles: Range<usize>, material: usize) -> Self {
        Self {
            triangles,
            material,
            alias_table: None,
            total_area: 0.0,
        }
    }

    pub fn triangles(&self) -> Range<usize> {
        self.triangles.clone()
    }

    pub fn material(&self) -> usize {
        self.material
    }

    pub fn total_area(&self) -> f32 {
        self.total_area
    }

    fn area_pdf_to_solid_angle(
        &self,
        position: glam::Vec3A,
        point: glam::Vec3A,
        normal: glam::Vec3A,
    ) -> f32 {
        let offset = point - position;
        let dist_sqr = offset.length_squared();
        let cos = -offset.dot(normal) / dist_sqr.sqrt();
        if cos <= 0.0 || dist_sqr <= 0.0 {
            0.0
        } else {
            dist_sqr / (cos * self.total_area)
        }
    }
}

impl EmitterT for MeshEmitter {
    fn prepare(&mut self, index: usize, inputs: &EmitterInputs) -> Result<(), BuildError> {
        let Range { start, end } = self.triangles;
        if start > end || end > inputs.triangles.len() {
            return Err(BuildError::EmitterRangeOutOfBounds {
                emitter: index,
                start,
                end,
                count: inputs.triangles.len(),
            });
        }
        if self.material >= inputs.materials.len() {
            return Err(BuildError::InvalidEmitterMaterial {
                emitter: index,
                material: self.material,
                count: inputs.materials.len(),
            });
        }

        for (offset, tri) in inputs.triangles[start..end].iter().enumerate() {
            if tri.material() != self.material {
                return Err(BuildError::EmitterMaterialMismatch {
                    emitter: index,
                    triangle: start + offset,
                    expected: self.material,
                    found: tri.material(),
                });
            }
        }

        let areas: Vec<f32> = inputs.triangles[start..end]
            .iter()
            .map(|tri| if tri.is_degenerate() { 0.0 } else { tri.area() })
            .collect();
        self.total_area = areas.iter().sum();
        if self.total_area <= 0.0 {
            return Err(BuildError::EmptyEmitter(index));
        }
        self.alias_table = Some(AliasTable::new(&areas));
        Ok(())
    }

    fn background(&self, _dir: glam::Vec3A) -> Color {
        Color::BLACK
    }

    fn sample(
        &self,
        position: glam::Vec3A,
        inputs: &EmitterInputs,
        rng: &mut Rng,
    ) -> Option<EmitterSample> {
        let alias_table = self.alias_table.as_ref()?;
        let (offset, _) = alias_table.sample(rng.uniform_1d());
        let triangle = &inputs.triangles[self.triangles.start + offset];
        let (point, _) = triangle.sample_point(rng.uniform_2d());

        let pdf = self.area_pdf_to_solid_angle(position, point, triangle.normal());
        if pdf <= 0.0 || !pdf.is_finite() {
            return None;
        }
        let offset = point - position;
        let dist = offset.length();
        Some(EmitterSample {
            wi: offset / dist,
            pdf,
            radiance: inputs.materials[self.material].emissive,
            dist,
        })
    }

    fn pdf(
        &self,
        position: glam::Vec3A,
        _wi: glam::Vec3A,
        hit: Option<(usize, glam::Vec3A)>,
        inputs: &EmitterInputs,
    ) -> f32 {
        match hit {
            Some((index, point)) if self.triangles.contains(&index) && self.total_area > 0.0 => {
                self.area_pdf_to_solid_angle(position, point, inputs.triangles[index].normal())
            }
            _ => 0.0,
        }
    }
}
