use crate::core::ray::Ray;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bbox {
    pub p_min: glam::Vec3A,
    pub p_max: glam::Vec3A,
}

impl Bbox {
    pub fn new(p_min: glam::Vec3A, p_max: glam::Vec3A) -> Self {
        Self { p_min, p_max }
    }

    pub fn from_points(points: &[glam::Vec3A]) -> Self {
        points
            .iter()
            .fold(Self::empty(), |bbox, p| bbox.merge_point(*p))
    }

    pub fn empty() -> Self {
        Self {
            p_min: glam::Vec3A::splat(f32::MAX),
            p_max: glam::Vec3A::splat(f32::MIN),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.p_min.x > self.p_max.x || self.p_min.y > self.p_max.y || self.p_min.z > self.p_max.z
    }

    pub fn merge(mut self, another: Bbox) -> Self {
        self.p_min = self.p_min.min(another.p_min);
        self.p_max = self.p_max.max(another.p_max);
        self
    }

    pub fn merge_point(mut self, p: glam::Vec3A) -> Self {
        self.p_min = self.p_min.min(p);
        self.p_max = self.p_max.max(p);
        self
    }

    /// Grows the box by `eps` on every side.
    pub fn padded(self, eps: f32) -> Self {
        Self {
            p_min: self.p_min - glam::Vec3A::splat(eps),
            p_max: self.p_max + glam::Vec3A::splat(eps),
        }
    }

    pub fn diagonal(&self) -> glam::Vec3A {
        self.p_max - self.p_min
    }

    pub fn surface_area(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            let d = self.diagonal();
            2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
        }
    }

    pub fn centroid(&self) -> glam::Vec3A {
        (self.p_min + self.p_max) * 0.5
    }

    pub fn longest_axis(&self) -> usize {
        let d = self.diagonal();
        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }

    /// Clips the box at the plane `axis = position`, returning the (below, above) halves.
    pub fn split(&self, axis: usize, position: f32) -> (Bbox, Bbox) {
        let mut below = *self;
        let mut above = *self;
        below.p_max[axis] = position;
        above.p_min[axis] = position;
        (below, above)
    }

    /// Slab test using the ray's precomputed reciprocal direction.
    ///
    /// Returns the parametric `(t_near, t_far)` interval, or `None` when the ray misses
    /// the box or the box lies entirely behind the origin. `t_near` may be negative when
    /// the origin is inside the box.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, f32)> {
        if self.is_empty() {
            return None;
        }

        let mut t_near = f32::MIN;
        let mut t_far = f32::MAX;
        for axis in 0..3 {
            let inv = ray.inv_direction[axis];
            let (near, far) = if inv >= 0.0 {
                (self.p_min[axis], self.p_max[axis])
            } else {
                (self.p_max[axis], self.p_min[axis])
            };
            // 0 * inf yields NaN for an origin lying on a slab boundary, f32::max/min
            // ignore NaN so such an axis does not restrict the interval
            t_near = t_near.max((near - ray.origin[axis]) * inv);
            t_far = t_far.min((far - ray.origin[axis]) * inv);
        }

        if t_near > t_far || t_far < 0.0 {
            None
        } else {
            Some((t_near, t_far))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    fn brute_force(bbox: &Bbox, ray: &Ray) -> Option<(f32, f32)> {
        let mut lo = f32::MIN;
        let mut hi = f32::MAX;
        for axis in 0..3 {
            let o = ray.origin[axis];
            let d = ray.direction[axis];
            if d == 0.0 {
                if o < bbox.p_min[axis] || o > bbox.p_max[axis] {
                    return None;
                }
                continue;
            }
            let t0 = (bbox.p_min[axis] - o) / d;
            let t1 = (bbox.p_max[axis] - o) / d;
            lo = lo.max(t0.min(t1));
            hi = hi.min(t0.max(t1));
        }
        if lo > hi || hi < 0.0 {
            None
        } else {
            Some((lo, hi))
        }
    }

    #[test]
    fn slab_test_matches_per_axis_intervals() {
        let mut rng = rand::rngs::SmallRng::seed_from_u64(7);
        let bbox = Bbox::new(
            glam::Vec3A::new(-1.0, -0.5, 0.0),
            glam::Vec3A::new(1.0, 2.0, 3.0),
        );
        let mut hits = 0;
        for _ in 0..10_000 {
            let origin = glam::Vec3A::new(
                rng.gen_range(-4.0..4.0),
                rng.gen_range(-4.0..4.0),
                rng.gen_range(-4.0..4.0),
            );
            let dir = glam::Vec3A::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if dir.length() < 1e-3 {
                continue;
            }
            let ray = Ray::new(origin, dir);
            let fast = bbox.intersect_ray(&ray);
            let slow = brute_force(&bbox, &ray);
            match (fast, slow) {
                (Some((a0, a1)), Some((b0, b1))) => {
                    hits += 1;
                    assert!((a0 - b0).abs() < 1e-3, "{} vs {}", a0, b0);
                    assert!((a1 - b1).abs() < 1e-3, "{} vs {}", a1, b1);
                }
                (None, None) => {}
                (fast, slow) => {
                    // only grazing rays may disagree
                    let (t0, t1) = fast.or(slow).unwrap();
                    assert!((t1 - t0).abs() < 1e-3 || t1.abs() < 1e-3);
                }
            }
        }
        assert!(hits > 100);
    }

    #[test]
    fn axis_parallel_ray_inside_slab() {
        let bbox = Bbox::new(glam::Vec3A::ZERO, glam::Vec3A::ONE);
        let ray = Ray::new(glam::Vec3A::new(0.5, 0.5, -1.0), glam::Vec3A::Z);
        let (t0, t1) = bbox.intersect_ray(&ray).unwrap();
        assert!((t0 - 1.0).abs() < 1e-6);
        assert!((t1 - 2.0).abs() < 1e-6);

        let outside = Ray::new(glam::Vec3A::new(1.5, 0.5, -1.0), glam::Vec3A::Z);
        assert!(bbox.intersect_ray(&outside).is_none());

        let behind = Ray::new(glam::Vec3A::new(0.5, 0.5, 2.0), glam::Vec3A::Z);
        assert!(bbox.intersect_ray(&behind).is_none());
    }

    #[test]
    fn split_clips_at_plane() {
        let bbox = Bbox::new(glam::Vec3A::ZERO, glam::Vec3A::new(4.0, 2.0, 2.0));
        assert_eq!(bbox.longest_axis(), 0);
        let (below, above) = bbox.split(0, 1.0);
        assert_eq!(below.p_max.x, 1.0);
        assert_eq!(above.p_min.x, 1.0);
        assert_eq!(below.p_min, bbox.p_min);
        assert_eq!(above.p_max, bbox.p_max);
        assert!((bbox.surface_area() - 40.0).abs() < 1e-6);
    }
}
