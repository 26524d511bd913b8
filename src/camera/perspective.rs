use crate::core::{loader::InputParams, ray::Ray};

use super::CameraT;

/// Pinhole camera with a vertical field of view.
pub struct PerspectiveCamera {
    eye: glam::Vec3A,
    forward: glam::Vec3A,
    up: glam::Vec3A,
    right: glam::Vec3A,
    half_cot_half_fov: f32,
}

impl PerspectiveCamera {
    pub fn new(eye: glam::Vec3A, forward: glam::Vec3A, up: glam::Vec3A, fov: f32) -> Self {
        let forward = forward.normalize();
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);
        Self {
            eye,
            forward,
            up,
            right,
            half_cot_half_fov: 0.5 / (fov * 0.5).tan(),
        }
    }

    pub fn look_at(eye: glam::Vec3A, target: glam::Vec3A, up: glam::Vec3A, fov: f32) -> Self {
        Self::new(eye, target - eye, up, fov)
    }

    /// Reads `eye`, `forward`, `up` and `fov` (degrees).
    pub fn load(params: &mut InputParams) -> anyhow::Result<Self> {
        let eye = params.get_float3("eye")?.into();
        let forward = params.get_float3("forward")?.into();
        let up = params.get_float3_or("up", [0.0, 1.0, 0.0])?.into();
        let fov_deg = params.get_float_or("fov", 45.0)?;
        if !(fov_deg > 0.0 && fov_deg < 180.0) {
            anyhow::bail!("{} - 'fov' should be in (0, 180), got {}", params.name(), fov_deg);
        }
        let fov = fov_deg * std::f32::consts::PI / 180.0;

        Ok(Self::new(eye, forward, up, fov))
    }

    pub fn eye(&self) -> glam::Vec3A {
        self.eye
    }
}

impl CameraT for PerspectiveCamera {
    fn generate_ray(&self, point: (f32, f32)) -> Ray {
        let direction =
            self.forward * self.half_cot_half_fov + self.right * point.0 + self.up * point.1;
        Ray::primary(self.eye, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_ray_looks_forward() {
        let camera = PerspectiveCamera::look_at(
            glam::Vec3A::new(0.0, 1.0, 5.0),
            glam::Vec3A::new(0.0, 1.0, 0.0),
            glam::Vec3A::Y,
            std::f32::consts::FRAC_PI_2,
        );
        let ray = camera.generate_ray((0.0, 0.0));
        assert_eq!(ray.origin, camera.eye());
        assert!((ray.direction - glam::Vec3A::new(0.0, 0.0, -1.0)).length() < 1e-5);

        // with a 90 degree fov the top edge of the film is 45 degrees up
        let top = camera.generate_ray((0.0, 0.5));
        assert!((top.direction.y - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
        let right = camera.generate_ray((0.25, 0.0));
        assert!(right.direction.x > 0.0);
    }
}
