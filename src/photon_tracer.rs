use crate::error::{PhotonError, Result};
use crate::light::Light;
use crate::material::MaterialKind;
use crate::photon::Photon;
use crate::scene::Scene;
use rand::{rngs::SmallRng, RngCore, SeedableRng};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Parameters controlling a photon emission pass.
#[derive(Debug, Clone, Copy)]
pub struct PhotonPassConfig {
    pub max_photons: usize,
    pub max_bounces: u32,
    pub seed: u64,
}

/// Recursively traces one emitted photon through the scene, pushing a
/// deposited `Photon` into `out` on every diffuse hit. Depth is decremented
/// exactly once per bounce. Russian roulette uses `p = max(albedo
/// channels)` without the `1/p` unbiasing division — a known, intentionally
/// preserved bias (see DESIGN.md).
pub fn trace_photon(
    scene: &Scene,
    mut origin: crate::math::Point3,
    mut direction: crate::math::Vec3,
    mut power: crate::math::Color,
    mut depth: u32,
    out: &mut Vec<Photon>,
    rng: &mut dyn RngCore,
) {
    while depth > 0 {
        let ray = crate::math::Ray::new(origin, direction);
        let Some((hit, _)) = scene.hit(&ray, 1e-4, f64::INFINITY) else {
            return;
        };
        let material = scene.material(hit.material);

        match material.kind() {
            MaterialKind::Emissive => return,
            MaterialKind::Diffuse => {
                let albedo = material.albedo_color(hit.u, hit.v, hit.p);
                out.push(Photon::new(hit.p, direction, power.hadamard(albedo)));

                let p_survive = albedo.x.max(albedo.y).max(albedo.z);
                if next_uniform(rng) >= p_survive {
                    return;
                }
                let Some(scatter) = material.scatter(&ray, hit.p, hit.normal, hit.front_face, hit.u, hit.v, rng)
                else {
                    return;
                };
                power = power.hadamard(albedo);
                origin = scatter.ray.origin;
                direction = scatter.ray.direction.normalized();
            }
            MaterialKind::Specular | MaterialKind::Refractive => {
                let Some(scatter) = material.scatter(&ray, hit.p, hit.normal, hit.front_face, hit.u, hit.v, rng)
                else {
                    return;
                };
                power = power.hadamard(scatter.attenuation);
                origin = scatter.ray.origin;
                direction = scatter.ray.direction.normalized();
            }
        }
        depth -= 1;
    }
}

fn next_uniform(rng: &mut dyn RngCore) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

pub struct PhotonPass;

impl PhotonPass {
    /// Emits photons from `lights` until `config.max_photons` emission
    /// attempts have deposited at least one photon, then scales every
    /// deposited photon's power by `1 / total_attempts` (the attempt count,
    /// not the deposited count). Runs across a `rayon` thread pool with
    /// per-worker `SmallRng` streams and thread-local accumulation
    /// buffers concatenated at the end.
    pub fn run(scene: &Scene, lights: &[Light], config: PhotonPassConfig) -> Result<Vec<Photon>> {
        if lights.is_empty() || config.max_photons == 0 {
            return Err(PhotonError::Build(
                "photon pass requires at least one light and a nonzero photon budget".into(),
            ));
        }

        let deposited_attempts = AtomicUsize::new(0);
        let total_attempts = AtomicUsize::new(0);
        const BATCH: usize = 4096;

        let light_power_sum: f64 = lights
            .iter()
            .map(|l| l.emission.x.max(l.emission.y).max(l.emission.z))
            .sum();

        let mut all_photons: Vec<Photon> = Vec::new();
        'outer: loop {
            let batches: Vec<Vec<Photon>> = (0..rayon::current_num_threads())
                .into_par_iter()
                .map(|worker_id| {
                    let mut rng = SmallRng::seed_from_u64(
                        config.seed ^ (worker_id as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15),
                    );
                    let mut local = Vec::new();
                    for _ in 0..BATCH {
                        if deposited_attempts.load(Ordering::Relaxed) >= config.max_photons {
                            break;
                        }
                        let light = pick_light(lights, light_power_sum, &mut rng);
                        let (origin, direction) = light.emit(&mut rng);
                        let before = local.len();
                        trace_photon(
                            scene,
                            origin,
                            direction,
                            light.emission,
                            config.max_bounces,
                            &mut local,
                            &mut rng,
                        );
                        total_attempts.fetch_add(1, Ordering::Relaxed);
                        if local.len() > before {
                            deposited_attempts.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                    local
                })
                .collect();

            for mut batch in batches {
                all_photons.append(&mut batch);
            }

            if deposited_attempts.load(Ordering::Relaxed) >= config.max_photons {
                break 'outer;
            }
        }

        if all_photons.is_empty() {
            return Err(PhotonError::Build(
                "photon pass deposited zero photons".into(),
            ));
        }

        let norm = 1.0 / total_attempts.load(Ordering::Relaxed) as f64;
        for p in all_photons.iter_mut() {
            p.power = p.power * norm;
        }
        Ok(all_photons)
    }
}

fn pick_light<'a>(lights: &'a [Light], power_sum: f64, rng: &mut dyn RngCore) -> &'a Light {
    if lights.len() == 1 || power_sum <= 0.0 {
        return &lights[0];
    }
    let mut target = next_uniform(rng) * power_sum;
    for light in lights {
        let w = light.emission.x.max(light.emission.y).max(light.emission.z);
        if target < w {
            return light;
        }
        target -= w;
    }
    lights.last().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::{MaterialId, Primitive};
    use crate::light::AreaLightShape;
    use crate::material::Material;
    use crate::math::{Color, Point3, Vec3};
    use crate::scene::Scene;
    use crate::texture::Texture;

    fn single_sphere_scene() -> Scene {
        let mut scene = Scene::new();
        let mat = scene.add_material(Material::Lambertian {
            albedo: Texture::Constant(Color::new(0.8, 0.8, 0.8)),
        });
        scene.add_primitive(Primitive::Sphere {
            center: Point3::zero(),
            radius: 1.0,
            material: mat,
        });
        scene.build().unwrap();
        scene
    }

    #[test]
    fn photon_pass_deposits_photons_and_normalizes_power() {
        let scene = single_sphere_scene();
        let light = Light::new(
            AreaLightShape::Rect {
                q: Point3::new(-0.5, 5.0, -0.5),
                u: Vec3::new(1.0, 0.0, 0.0),
                v: Vec3::new(0.0, 0.0, 1.0),
            },
            Color::new(10.0, 10.0, 10.0),
        );
        let config = PhotonPassConfig {
            max_photons: 200,
            max_bounces: 6,
            seed: 123,
        };
        let photons = PhotonPass::run(&scene, &[light], config).unwrap();
        assert!(!photons.is_empty());
        for p in &photons {
            assert!(p.power.x.is_finite() && p.power.x >= 0.0);
        }
    }

    #[test]
    fn empty_lights_is_a_build_error() {
        let scene = single_sphere_scene();
        let config = PhotonPassConfig {
            max_photons: 10,
            max_bounces: 4,
            seed: 1,
        };
        assert!(PhotonPass::run(&scene, &[], config).is_err());
    }
}
