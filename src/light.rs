use crate::math::{Color, Point3, Vec3};
use rand::RngCore;

/// The emitting surface shape of a `Light`. A `Quad`-shaped rectangular area
/// emitter, generalizing the original's point light into a sampleable area
/// light as the photon tracer's emission step requires.
#[derive(Debug, Clone, Copy)]
pub enum AreaLightShape {
    Rect { q: Point3, u: Vec3, v: Vec3 },
}

impl AreaLightShape {
    /// The outward-facing unit normal of the emitting surface.
    pub fn normal(&self) -> Vec3 {
        match *self {
            AreaLightShape::Rect { u, v, .. } => u.cross(v).normalized(),
        }
    }

    /// A uniformly distributed point on the emitting surface.
    pub fn sample_point(&self, rng: &mut dyn RngCore) -> Point3 {
        match *self {
            AreaLightShape::Rect { q, u, v } => {
                let a = next_uniform(rng);
                let b = next_uniform(rng);
                q + u * a + v * b
            }
        }
    }
}

/// An emitter consulted by the photon pass: a shape plus a radiant emission
/// color. Direction is sampled uniformly over the outward hemisphere
/// (cosine-free, matching the photon-emission contract).
#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub shape: AreaLightShape,
    pub emission: Color,
}

impl Light {
    pub fn new(shape: AreaLightShape, emission: Color) -> Self {
        Self { shape, emission }
    }

    /// Emits a single photon origin and direction: a uniformly sampled
    /// surface point, paired with a direction drawn uniformly over the
    /// hemisphere on the outward-normal side.
    pub fn emit(&self, rng: &mut dyn RngCore) -> (Point3, Vec3) {
        let p = self.shape.sample_point(rng);
        let n = self.shape.normal();
        let dir = Vec3::random_on_hemisphere(rng, n);
        (p, dir)
    }
}

fn next_uniform(rng: &mut dyn RngCore) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn emitted_direction_stays_on_normal_side() {
        let light = Light::new(
            AreaLightShape::Rect {
                q: Point3::new(-1.0, 5.0, -1.0),
                u: Vec3::new(2.0, 0.0, 0.0),
                v: Vec3::new(0.0, 0.0, 2.0),
            },
            Color::ones(),
        );
        let mut rng = SmallRng::seed_from_u64(42);
        let n = light.shape.normal();
        for _ in 0..100 {
            let (_, dir) = light.emit(&mut rng);
            assert!(dir.dot(n) >= -1e-9);
        }
    }

    #[test]
    fn sampled_points_stay_within_quad_span() {
        let q = Point3::zero();
        let u = Vec3::new(2.0, 0.0, 0.0);
        let v = Vec3::new(0.0, 0.0, 3.0);
        let light = Light::new(AreaLightShape::Rect { q, u, v }, Color::ones());
        let mut rng = SmallRng::seed_from_u64(9);
        for _ in 0..50 {
            let p = light.shape.sample_point(&mut rng);
            assert!(p.x >= -1e-9 && p.x <= 2.0 + 1e-9);
            assert!(p.z >= -1e-9 && p.z <= 3.0 + 1e-9);
        }
    }
}
