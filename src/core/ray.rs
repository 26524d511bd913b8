#[derive(Debug, Copy, Clone)]
pub struct Ray {
    pub origin: glam::Vec3A,
    pub direction: glam::Vec3A,
    /// Component-wise reciprocal of `direction`, used by slab tests and split-plane crossings.
    pub inv_direction: glam::Vec3A,
    pub t_min: f32,
}

impl Ray {
    /// Offset that keeps a bounce from re-hitting the surface it left.
    pub const T_MIN_EPS: f32 = 0.001;

    /// `direction` is normalized here; callers may pass any non-zero vector.
    pub fn new(origin: glam::Vec3A, direction: glam::Vec3A) -> Self {
        let direction = direction.normalize();
        Self {
            origin,
            direction,
            inv_direction: direction.recip(),
            t_min: Self::T_MIN_EPS,
        }
    }

    /// Ray starting exactly at `origin`, used for primary rays.
    pub fn primary(origin: glam::Vec3A, direction: glam::Vec3A) -> Self {
        Self {
            t_min: 0.0,
            ..Self::new(origin, direction)
        }
    }

    pub fn point_at(&self, t: f32) -> glam::Vec3A {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_is_normalized_with_reciprocal() {
        let ray = Ray::new(glam::Vec3A::ZERO, glam::Vec3A::new(0.0, 3.0, 4.0));
        assert!((ray.direction.length() - 1.0).abs() < 1e-6);
        assert!((ray.inv_direction.y - 1.0 / 0.6).abs() < 1e-4);
        assert!(ray.inv_direction.x.is_infinite());
        let p = ray.point_at(5.0);
        assert!((p - glam::Vec3A::new(0.0, 3.0, 4.0)).length() < 1e-5);
    }
}
