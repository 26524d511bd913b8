/// Mirror of `i` about the local +Z axis.
pub fn reflect(i: glam::Vec3A) -> glam::Vec3A {
    glam::Vec3A::new(-i.x, -i.y, i.z)
}

pub fn reflect_n(i: glam::Vec3A, n: glam::Vec3A) -> glam::Vec3A {
    2.0 * i.dot(n) * n - i
}

/// Refraction about local +Z; `ior` is inside over outside, with +Z pointing outside.
pub fn refract(i: glam::Vec3A, ior: f32) -> Option<glam::Vec3A> {
    refract_n(i, glam::Vec3A::Z, ior)
}

pub fn refract_n(i: glam::Vec3A, n: glam::Vec3A, ior: f32) -> Option<glam::Vec3A> {
    let cos_i = i.dot(n);
    let eta = eta_ratio(cos_i, ior);
    let cos_t_sqr = 1.0 - (1.0 - cos_i * cos_i) * eta * eta;
    if cos_t_sqr < 0.0 {
        return None;
    }
    let cos_t = cos_t_sqr.sqrt();
    let o = if cos_i >= 0.0 {
        (eta * cos_i - cos_t) * n - eta * i
    } else {
        (eta * cos_i + cos_t) * n - eta * i
    };
    Some(o)
}

/// Ratio of the index on the incident side over the transmitted side.
pub fn eta_ratio(cos_i: f32, ior: f32) -> f32 {
    if cos_i >= 0.0 {
        1.0 / ior
    } else {
        ior
    }
}

pub fn half_from_reflect(i: glam::Vec3A, o: glam::Vec3A) -> glam::Vec3A {
    let half = (i + o).normalize();
    if i.z >= 0.0 {
        half
    } else {
        -half
    }
}

pub fn half_from_refract(i: glam::Vec3A, o: glam::Vec3A, ior: f32) -> glam::Vec3A {
    let half = if i.z >= 0.0 {
        (i + ior * o).normalize()
    } else {
        (ior * i + o).normalize()
    };
    if half.z < 0.0 {
        -half
    } else {
        half
    }
}

pub fn ggx_ndf(ndoth: f32, a2: f32) -> f32 {
    a2 * std::f32::consts::FRAC_1_PI / pow2(ndoth * ndoth * (a2 - 1.0) + 1.0).max(0.0001)
}

/// Inverse CDF of `D(h) cos(theta_h)`, returning the sampled `cos^2(theta_h)`.
pub fn ggx_ndf_cdf_inverse(a2: f32, rand: f32) -> f32 {
    (1.0 - rand) / (1.0 - rand * (1.0 - a2))
}

/// Height-uncorrelated Smith term with the `1 / (4 |n.v| |n.l|)` factor folded in.
pub fn smith_separable_visible(ndotv: f32, ndotl: f32, a2: f32) -> f32 {
    let v = ndotv.abs() + ((1.0 - a2) * ndotv * ndotv + a2).sqrt();
    let l = ndotl.abs() + ((1.0 - a2) * ndotl * ndotl + a2).sqrt();
    1.0 / (v * l)
}

fn pow2(x: f32) -> f32 {
    x * x
}
