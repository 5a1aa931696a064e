use crate::math::{Color, Point3, Ray, Vec3};
use crate::texture::Texture;
use rand::RngCore;

/// Broad family a material falls into, consulted by the integrator to decide
/// how a ray should continue (and whether the photon tracer should deposit a
/// photon at all, since only diffuse hits store energy in the map).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    Diffuse,
    Specular,
    Refractive,
    Emissive,
}

/// A scattering result: the attenuation to apply and the outgoing ray.
pub struct Scatter {
    pub attenuation: Color,
    pub ray: Ray,
}

/// Closed enum of surface materials. A tagged variant in place of a
/// `dyn Material` trait object keeps `Scene`'s primitive storage `Send + Sync`
/// without lifetime parameters, and lets the photon tracer and integrator
/// match on `kind()` instead of doing a virtual dispatch per bounce.
#[derive(Debug, Clone, Copy)]
pub enum Material {
    Lambertian { albedo: Texture },
    Metal { albedo: Texture },
    Dielectric { ior: f64 },
    Emissive { emit: Texture, intensity: f64 },
}

impl Material {
    pub fn kind(&self) -> MaterialKind {
        match self {
            Material::Lambertian { .. } => MaterialKind::Diffuse,
            Material::Metal { .. } => MaterialKind::Specular,
            Material::Dielectric { .. } => MaterialKind::Refractive,
            Material::Emissive { .. } => MaterialKind::Emissive,
        }
    }

    pub fn albedo_color(&self, u: f64, v: f64, p: Point3) -> Color {
        match self {
            Material::Lambertian { albedo } => albedo.value(u, v, p),
            Material::Metal { albedo } => albedo.value(u, v, p),
            Material::Dielectric { .. } => Color::new(0.99, 0.99, 0.99),
            Material::Emissive { .. } => Color::zero(),
        }
    }

    pub fn emitted(&self, u: f64, v: f64, p: Point3) -> Color {
        match self {
            Material::Emissive { emit, intensity } => emit.value(u, v, p) * *intensity,
            _ => Color::zero(),
        }
    }

    /// Produces the scattered ray for a non-diffuse (specular/refractive)
    /// bounce, or a cosine-weighted diffuse bounce when no photon map is
    /// consulted (direct-lighting fallback). Returns `None` when the
    /// scattered direction degenerates (near-zero Lambertian bounce, a
    /// mirror reflection that ends up on the wrong side of the normal) —
    /// the caller terminates that path to black rather than propagating NaNs.
    pub fn scatter(
        &self,
        ray_in: &Ray,
        hit_point: Point3,
        normal: Vec3,
        front_face: bool,
        u: f64,
        v: f64,
        rng: &mut dyn RngCore,
    ) -> Option<Scatter> {
        match self {
            Material::Lambertian { albedo } => {
                let mut direction = normal + Vec3::random_unit_vector(rng);
                if direction.near_zero() {
                    direction = normal;
                }
                Some(Scatter {
                    attenuation: albedo.value(u, v, hit_point),
                    ray: Ray::new(hit_point, direction),
                })
            }
            Material::Metal { albedo } => {
                let reflected = ray_in.direction.normalized().reflect(normal);
                if reflected.dot(normal) <= 0.0 {
                    return None;
                }
                Some(Scatter {
                    attenuation: albedo.value(u, v, hit_point),
                    ray: Ray::new(hit_point, reflected),
                })
            }
            Material::Dielectric { ior } => {
                let refraction_ratio = if front_face { 1.0 / ior } else { *ior };
                let unit_dir = ray_in.direction.normalized();
                let cos_theta = (-unit_dir).dot(normal).min(1.0);
                let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
                let cannot_refract = refraction_ratio * sin_theta > 1.0;
                let direction = if cannot_refract
                    || schlick_reflectance(cos_theta, refraction_ratio) > next_uniform(rng)
                {
                    unit_dir.reflect(normal)
                } else {
                    unit_dir
                        .refract(normal, refraction_ratio)
                        .unwrap_or_else(|| unit_dir.reflect(normal))
                };
                Some(Scatter {
                    attenuation: Color::new(0.99, 0.99, 0.99),
                    ray: Ray::new(hit_point, direction),
                })
            }
            Material::Emissive { .. } => None,
        }
    }
}

/// Schlick's approximation to the Fresnel reflectance of a dielectric,
/// trading the full Fresnel equations for a cheap polynomial that is
/// accurate to within a fraction of a percent.
pub fn schlick_reflectance(cosine: f64, refraction_ratio: f64) -> f64 {
    let r0 = (1.0 - refraction_ratio) / (1.0 + refraction_ratio);
    let r0 = r0 * r0;
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

fn next_uniform(rng: &mut dyn RngCore) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn lambertian_scatter_never_points_strictly_below_normal() {
        let mat = Material::Lambertian {
            albedo: Texture::Constant(Color::new(0.5, 0.5, 0.5)),
        };
        let mut rng = SmallRng::seed_from_u64(7);
        let normal = Vec3::unit_y();
        let incoming = Ray::new(Point3::zero(), Vec3::new(0.0, -1.0, 0.0));
        for _ in 0..50 {
            let s = mat
                .scatter(&incoming, Point3::zero(), normal, true, 0.0, 0.0, &mut rng)
                .unwrap();
            assert!(s.ray.direction.dot(normal) > -1e-9);
        }
    }

    #[test]
    fn metal_scatter_is_pure_mirror_reflection() {
        let mat = Material::Metal {
            albedo: Texture::Constant(Color::ones()),
        };
        let mut rng = SmallRng::seed_from_u64(1);
        let normal = Vec3::unit_y();
        let incoming = Ray::new(Point3::zero(), Vec3::new(1.0, -1.0, 0.0).normalized());
        let s = mat
            .scatter(&incoming, Point3::zero(), normal, true, 0.0, 0.0, &mut rng)
            .unwrap();
        let expected = incoming.direction.reflect(normal);
        assert!((s.ray.direction - expected).length() < 1e-9);
    }

    #[test]
    fn schlick_at_normal_incidence_matches_r0() {
        let eta = 1.5;
        let r0 = ((1.0 - eta) / (1.0 + eta)).powi(2);
        assert!((schlick_reflectance(1.0, eta) - r0).abs() < 1e-9);
    }

    #[test]
    fn emissive_never_scatters() {
        let mat = Material::Emissive {
            emit: Texture::Constant(Color::ones()),
            intensity: 4.0,
        };
        let mut rng = SmallRng::seed_from_u64(3);
        let incoming = Ray::new(Point3::zero(), Vec3::unit_y());
        assert!(mat
            .scatter(&incoming, Point3::zero(), Vec3::unit_y(), true, 0.0, 0.0, &mut rng)
            .is_none());
        assert_eq!(mat.emitted(0.0, 0.0, Point3::zero()), Color::new(4.0, 4.0, 4.0));
    }
}
