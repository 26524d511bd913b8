use crate::core::{alias_table::AliasTable, color::Color, error::BuildError, rng::Rng};

use super::{EmitterInputs, EmitterSample, EmitterT};

/// Equirectangular environment map, +Y up. Rows run from the zenith (theta = 0) to the
/// nadir, columns sweep phi = atan2(x, z) over [0, 2pi).
pub struct EnvironmentEmitter {
    texture: Vec<Vec<Color>>,
    scale: Color,
    height: usize,
    width: usize,
    alias_table: AliasTable,
}

impl EnvironmentEmitter {
    pub fn new(texture: Vec<Vec<Color>>, scale: Color) -> Result<Self, BuildError> {
        let height = texture.len();
        let width = texture.first().map_or(0, |row| row.len());
        if width == 0 || texture.iter().any(|row| row.len() != width) {
            return Err(BuildError::EmptyEnvironmentMap);
        }

        let height_inv = 1.0 / height as f32;
        let mut weights = Vec::with_capacity(width * height);
        for (row_ind, row) in texture.iter().enumerate() {
            let theta = (row_ind as f32 + 0.5) * height_inv * std::f32::consts::PI;
            let sin_theta = theta.sin();
            weights.extend(row.iter().map(|pixel| pixel.luminance().max(0.0) * sin_theta));
        }
        if weights.iter().sum::<f32>() <= 0.0 {
            weights.iter_mut().for_each(|w| *w = 1.0);
        }

        Ok(Self {
            texture,
            scale,
            height,
            width,
            alias_table: AliasTable::new(&weights),
        })
    }

    fn direction_to_angles(dir: glam::Vec3A) -> (f32, f32) {
        let theta = dir.y.clamp(-1.0, 1.0).acos();
        let mut phi = dir.x.atan2(dir.z);
        if phi < 0.0 {
            phi += 2.0 * std::f32::consts::PI;
        }
        (theta, phi)
    }

    fn angles_to_direction(theta: f32, phi: f32) -> glam::Vec3A {
        let (sin_theta, cos_theta) = theta.sin_cos();
        let (sin_phi, cos_phi) = phi.sin_cos();
        glam::Vec3A::new(sin_theta * sin_phi, cos_theta, sin_theta * cos_phi)
    }

    fn texel_of(&self, theta: f32, phi: f32) -> (usize, usize) {
        let x = (phi * 0.5 * std::f32::consts::FRAC_1_PI * self.width as f32) as usize;
        let y = (theta * std::f32::consts::FRAC_1_PI * self.height as f32) as usize;
        (x.min(self.width - 1), y.min(self.height - 1))
    }

    /// Bilinear lookup, wrapping around in phi and clamping in theta.
    fn radiance(&self, theta: f32, phi: f32) -> Color {
        let x = phi * 0.5 * std::f32::consts::FRAC_1_PI * self.width as f32 - 0.5;
        let y = theta * std::f32::consts::FRAC_1_PI * self.height as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let xt = x - x0;
        let yt = y - y0;

        let width = self.width as i32;
        let wrap_x = |x: i32| x.rem_euclid(width) as usize;
        let clamp_y = |y: i32| y.clamp(0, self.height as i32 - 1) as usize;
        let (x0, x1) = (wrap_x(x0 as i32), wrap_x(x0 as i32 + 1));
        let (y0, y1) = (clamp_y(y0 as i32), clamp_y(y0 as i32 + 1));

        let c0 = self.texture[y0][x0] * (1.0 - xt) + self.texture[y0][x1] * xt;
        let c1 = self.texture[y1][x0] * (1.0 - xt) + self.texture[y1][x1] * xt;
        (c0 * (1.0 - yt) + c1 * yt) * self.scale
    }

    /// Converts the discrete texel probability into a solid-angle density.
    fn texel_pdf(&self, prob: f32, theta: f32) -> f32 {
        let sin_theta = theta.sin();
        if sin_theta <= 0.0 {
            return 0.0;
        }
        let texel_count = (self.width * self.height) as f32;
        prob * texel_count
            / (2.0 * std::f32::consts::PI * std::f32::consts::PI * sin_theta)
    }
}

impl EmitterT for EnvironmentEmitter {
    fn background(&self, dir: glam::Vec3A) -> Color {
        let (theta, phi) = Self::direction_to_angles(dir);
        self.radiance(theta, phi)
    }

    fn sample(
        &self,
        _position: glam::Vec3A,
        _inputs: &EmitterInputs,
        rng: &mut Rng,
    ) -> Option<EmitterSample> {
        let (index, prob) = self.alias_table.sample(rng.uniform_1d());
        let x = index % self.width;
        let y = index / self.width;

        let (rand_x, rand_y) = rng.uniform_2d();
        let theta = (y as f32 + rand_y) / self.height as f32 * std::f32::consts::PI;
        let phi = (x as f32 + rand_x) / self.width as f32 * 2.0 * std::f32::consts::PI;
        let pdf = self.texel_pdf(prob, theta);
        if pdf <= 0.0 {
            return None;
        }

        Some(EmitterSample {
            wi: Self::angles_to_direction(theta, phi),
            pdf,
            radiance: self.radiance(theta, phi),
            dist: f32::INFINITY,
        })
    }

    fn pdf(
        &self,
        _position: glam::Vec3A,
        wi: glam::Vec3A,
        hit: Option<(usize, glam::Vec3A)>,
        _inputs: &EmitterInputs,
    ) -> f32 {
        if hit.is_some() {
            return 0.0;
        }
        let (theta, phi) = Self::direction_to_angles(wi);
        let (x, y) = self.texel_of(theta, phi);
        self.texel_pdf(self.alias_table.probability(y * self.width + x), theta)
    }
}
