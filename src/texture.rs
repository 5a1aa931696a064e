use crate::math::{Color, Point3};

/// Surface pattern evaluated at a hit point. Closed enum rather than a
/// `dyn Texture` trait object: the set of pattern kinds is fixed and known at
/// compile time, so matching on it devirtualizes the hot material-shading path.
#[derive(Debug, Clone, Copy)]
pub enum Texture {
    /// A single flat color, independent of `(u, v, p)`.
    Constant(Color),
    /// Floor-sum parity of world position — a 3D checkerboard that doesn't
    /// swim with the surface's own `(u, v)` parametrization.
    Checker3D { scale: f64, a: Color, b: Color },
    /// Stripes along the `v` surface parameter (e.g. sphere latitude bands).
    StripedV { stripes: f64, a: Color, b: Color },
    /// Stripes along both `u` and `v`, alternating like a checkerboard in
    /// sphere-parameter space.
    CheckeredUV { stripes: f64, a: Color, b: Color },
    /// A three-band value ramp driven by a deterministic lattice-noise
    /// function of world position.
    Noise { c0: Color, c1: Color, c2: Color },
}

impl Texture {
    pub fn value(&self, u: f64, v: f64, p: Point3) -> Color {
        match *self {
            Texture::Constant(c) => c,
            Texture::Checker3D { scale, a, b } => {
                let eps = 1e-6;
                let sum = (scale * p.x + eps).floor()
                    + (scale * p.y + eps).floor()
                    + (scale * p.z + eps).floor();
                if (sum as i64) % 2 != 0 {
                    a
                } else {
                    b
                }
            }
            Texture::StripedV { stripes, a, b } => {
                if ((v * stripes) as i64) % 2 != 0 {
                    a
                } else {
                    b
                }
            }
            Texture::CheckeredUV { stripes, a, b } => {
                if ((v * stripes) as i64 + (u * stripes) as i64) % 2 != 0 {
                    a
                } else {
                    b
                }
            }
            Texture::Noise { c0, c1, c2 } => {
                const T0: f64 = 0.220;
                const T1: f64 = 0.423;
                const T2: f64 = 0.614;
                let n = lattice_noise(p);
                if n < T0 {
                    c0
                } else if n < T1 {
                    let t = (n - T0) / (T1 - T0);
                    c0.lerp(c1, t)
                } else if n < T2 {
                    let t = (n - T1) / (T2 - T1);
                    c1.lerp(c2, t)
                } else {
                    c2
                }
            }
        }
    }
}

/// A small deterministic hash-based value-noise lattice standing in for a
/// ported Perlin lattice: smooth trilinear interpolation between hashed
/// corner values of the unit lattice cell containing `p`, folded into [0, 1).
fn lattice_noise(p: Point3) -> f64 {
    let xi = p.x.floor();
    let yi = p.y.floor();
    let zi = p.z.floor();
    let xf = p.x - xi;
    let yf = p.y - yi;
    let zf = p.z - zi;

    let u = smoothstep(xf);
    let v = smoothstep(yf);
    let w = smoothstep(zf);

    let mut accum = 0.0;
    for di in 0..2 {
        for dj in 0..2 {
            for dk in 0..2 {
                let weight = (if di == 1 { u } else { 1.0 - u })
                    * (if dj == 1 { v } else { 1.0 - v })
                    * (if dk == 1 { w } else { 1.0 - w });
                accum += weight
                    * hash_to_unit(xi as i64 + di as i64, yi as i64 + dj as i64, zi as i64 + dk as i64);
            }
        }
    }
    accum
}

fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

fn hash_to_unit(x: i64, y: i64, z: i64) -> f64 {
    let mut h = x
        .wrapping_mul(374_761_393)
        .wrapping_add(y.wrapping_mul(668_265_263))
        .wrapping_add(z.wrapping_mul(2_147_483_647));
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    h ^= h >> 16;
    ((h as u64 & 0xFFFF_FFFF) as f64) / (u32::MAX as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_is_position_independent() {
        let t = Texture::Constant(Color::new(0.5, 0.25, 0.1));
        assert_eq!(t.value(0.0, 0.0, Point3::zero()), t.value(1.0, 1.0, Point3::ones()));
    }

    #[test]
    fn checker_alternates_across_unit_cube_boundary() {
        let t = Texture::Checker3D {
            scale: 1.0,
            a: Color::zero(),
            b: Color::ones(),
        };
        let at_origin = t.value(0.0, 0.0, Point3::new(0.1, 0.1, 0.1));
        let one_over = t.value(0.0, 0.0, Point3::new(1.1, 0.1, 0.1));
        assert_ne!(at_origin, one_over);
    }

    #[test]
    fn noise_stays_in_bounds() {
        let t = Texture::Noise {
            c0: Color::zero(),
            c1: Color::new(0.5, 0.5, 0.5),
            c2: Color::ones(),
        };
        for i in 0..20 {
            let p = Point3::new(i as f64 * 0.37, -i as f64 * 0.11, i as f64 * 0.07);
            let c = t.value(0.0, 0.0, p);
            assert!(c.x >= 0.0 && c.x <= 1.0);
            assert!(c.y >= 0.0 && c.y <= 1.0);
            assert!(c.z >= 0.0 && c.z <= 1.0);
        }
    }
}
