/// Closest hit reported by a KD-tree query. Created per query and not retained.
#[derive(Copy, Clone, Debug)]
pub struct TraverseResult {
    /// Index into the tree's triangle list, `None` on a miss.
    pub triangle: Option<usize>,
    /// Parametric distance along the ray.
    pub t: f32,
    /// Weights of the triangle's three vertices, summing to 1.
    pub barycentric: glam::Vec3A,
    pub position: glam::Vec3A,
}

impl TraverseResult {
    pub fn miss() -> Self {
        Self {
            triangle: None,
            t: f32::INFINITY,
            barycentric: glam::Vec3A::ZERO,
            position: glam::Vec3A::ZERO,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.triangle.is_some()
    }
}

impl Default for TraverseResult {
    fn default() -> Self {
        Self::miss()
    }
}
