use crate::core::{bbox::Bbox, ray::Ray};

/// Immutable triangle with its edge vectors, face normal and barycentric solve
/// coefficients precomputed at construction.
#[derive(Clone, Debug)]
pub struct Triangle {
    positions: [glam::Vec3A; 3],
    normals: Option<[glam::Vec3A; 3]>,
    texcoords: Option<[glam::Vec2; 3]>,
    material: usize,
    e1: glam::Vec3A,
    e2: glam::Vec3A,
    normal: glam::Vec3A,
    area: f32,
    d00: f32,
    d01: f32,
    d11: f32,
    inv_denom: f32,
    bbox: Bbox,
}

impl Triangle {
    /// Triangles with less area than this are dropped from the KD-tree.
    pub const MIN_AREA: f32 = 1e-12;
    const PARALLEL_EPS: f32 = 1e-9;

    pub fn new(positions: [glam::Vec3A; 3], material: usize) -> Self {
        let [p0, p1, p2] = positions;
        let e1 = p1 - p0;
        let e2 = p2 - p0;
        let cross = e1.cross(e2);
        let double_area = cross.length();
        let normal = if double_area > 0.0 {
            cross / double_area
        } else {
            glam::Vec3A::ZERO
        };

        let d00 = e1.dot(e1);
        let d01 = e1.dot(e2);
        let d11 = e2.dot(e2);
        let denom = d00 * d11 - d01 * d01;
        let inv_denom = if denom != 0.0 { 1.0 / denom } else { 0.0 };

        Self {
            positions,
            normals: None,
            texcoords: None,
            material,
            e1,
            e2,
            normal,
            area: double_area * 0.5,
            d00,
            d01,
            d11,
            inv_denom,
            bbox: Bbox::from_points(&positions),
        }
    }

    pub fn with_normals(mut self, normals: [glam::Vec3A; 3]) -> Self {
        self.normals = Some([
            normals[0].normalize(),
            normals[1].normalize(),
            normals[2].normalize(),
        ]);
        self
    }

    pub fn with_texcoords(mut self, texcoords: [glam::Vec2; 3]) -> Self {
        self.texcoords = Some(texcoords);
        self
    }

    pub fn positions(&self) -> &[glam::Vec3A; 3] {
        &self.positions
    }

    pub fn material(&self) -> usize {
        self.material
    }

    /// Normalized geometric normal, following the winding of the vertices.
    pub fn normal(&self) -> glam::Vec3A {
        self.normal
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    pub fn bbox(&self) -> Bbox {
        self.bbox
    }

    pub fn centroid(&self) -> glam::Vec3A {
        (self.positions[0] + self.positions[1] + self.positions[2]) / 3.0
    }

    /// Zero-area or non-finite triangles cannot be intersected stably.
    pub fn is_degenerate(&self) -> bool {
        let finite = self.positions.iter().all(|p| p.is_finite());
        !finite || !self.area.is_finite() || self.area < Self::MIN_AREA
    }

    /// Möller–Trumbore test.
    ///
    /// Returns the parametric distance and the barycentric weights of the three
    /// vertices. The caller decides which `t` range is acceptable.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, glam::Vec3A)> {
        let q = ray.direction.cross(self.e2);
        let det = self.e1.dot(q);
        if det.abs() < Self::PARALLEL_EPS {
            return None;
        }
        let det_inv = 1.0 / det;
        let s = ray.origin - self.positions[0];
        let v = s.dot(q) * det_inv;
        if !(0.0..=1.0).contains(&v) {
            return None;
        }
        let r = s.cross(self.e1);
        let w = ray.direction.dot(r) * det_inv;
        if w < 0.0 || v + w > 1.0 {
            return None;
        }
        let t = self.e2.dot(r) * det_inv;
        Some((t, glam::Vec3A::new(1.0 - v - w, v, w)))
    }

    /// Barycentric weights of a point lying in the triangle's plane.
    pub fn barycentric_of(&self, p: glam::Vec3A) -> glam::Vec3A {
        let d = p - self.positions[0];
        let d20 = d.dot(self.e1);
        let d21 = d.dot(self.e2);
        let v = (self.d11 * d20 - self.d01 * d21) * self.inv_denom;
        let w = (self.d00 * d21 - self.d01 * d20) * self.inv_denom;
        glam::Vec3A::new(1.0 - v - w, v, w)
    }

    pub fn point_at(&self, barycentric: glam::Vec3A) -> glam::Vec3A {
        self.positions[0] * barycentric.x
            + self.positions[1] * barycentric.y
            + self.positions[2] * barycentric.z
    }

    /// Interpolated vertex normal, or the face normal when none were supplied.
    pub fn shading_normal(&self, barycentric: glam::Vec3A) -> glam::Vec3A {
        match &self.normals {
            Some([n0, n1, n2]) => {
                let n = *n0 * barycentric.x + *n1 * barycentric.y + *n2 * barycentric.z;
                if n.length_squared() > 0.0 {
                    n.normalize()
                } else {
                    self.normal
                }
            }
            None => self.normal,
        }
    }

    pub fn texcoords_at(&self, barycentric: glam::Vec3A) -> glam::Vec2 {
        match &self.texcoords {
            Some([uv0, uv1, uv2]) => {
                *uv0 * barycentric.x + *uv1 * barycentric.y + *uv2 * barycentric.z
            }
            None => glam::Vec2::new(barycentric.y, barycentric.z),
        }
    }

    /// Uniformly distributed point on the triangle, with its barycentric weights.
    pub fn sample_point(&self, rand: (f32, f32)) -> (glam::Vec3A, glam::Vec3A) {
        let r0_sqrt = rand.0.sqrt();
        let u = 1.0 - r0_sqrt;
        let v = r0_sqrt * (1.0 - rand.1);
        let barycentric = glam::Vec3A::new(u, v, 1.0 - u - v);
        (self.point_at(barycentric), barycentric)
    }
}
