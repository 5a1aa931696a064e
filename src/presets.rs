use crate::camera::{Camera, CameraConfig};
use crate::error::Result;
use crate::hittable::Primitive;
use crate::integrator::SkyModel;
use crate::light::{AreaLightShape, Light};
use crate::material::Material;
use crate::math::{Color, Point3, Vec3};
use crate::scene::Scene;
use crate::texture::Texture;
use rand::Rng;

/// A complete scene description bundling geometry, lights, camera, and sky.
/// Scene presets allow users to quickly render showcase images without
/// manual configuration.
pub struct SceneDescription {
    pub name: &'static str,
    pub scene: Scene,
    pub lights: Vec<Light>,
    pub camera_config: CameraConfig,
    pub sky: SkyModel,
}

/// Available built-in scene presets.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ScenePreset {
    /// The classic "Ray Tracing in One Weekend" spheres scene — a random
    /// arrangement of diffuse, metallic, and glass spheres on a checkerboard ground.
    Showcase,
    /// A Cornell box with quad walls, an area light, and mixed materials.
    Cornell,
    /// A single reflective sphere on a ground plane — useful for benchmarking.
    Minimal,
    /// A gallery scene demonstrating every geometry type and material.
    Gallery,
    /// A stress-test scene with many random objects to exercise BVH performance.
    Stress,
}

impl ScenePreset {
    pub fn build(self) -> SceneDescription {
        match self {
            ScenePreset::Showcase => build_showcase(),
            ScenePreset::Cornell => build_cornell(),
            ScenePreset::Minimal => build_minimal(),
            ScenePreset::Gallery => build_gallery(),
            ScenePreset::Stress => build_stress(),
        }
    }
}

fn checker(a: Color, b: Color, scale: f64) -> Texture {
    Texture::Checker3D { scale, a, b }
}

fn build_showcase() -> SceneDescription {
    let mut scene = Scene::new();
    let mut rng = rand::thread_rng();

    let ground_mat = scene.add_material(Material::Lambertian {
        albedo: checker(Color::new(0.05, 0.05, 0.05), Color::new(0.95, 0.95, 0.95), 10.0),
    });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(0.0, -1000.0, 0.0),
        radius: 1000.0,
        material: ground_mat,
    });

    let glass = scene.add_material(Material::Dielectric { ior: 1.5 });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(0.0, 1.0, 0.0),
        radius: 1.0,
        material: glass,
    });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(0.0, 1.0, 0.0),
        radius: -0.95,
        material: glass,
    });

    let matte = scene.add_material(Material::Lambertian {
        albedo: Texture::Constant(Color::new(0.7, 0.15, 0.15)),
    });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(-4.0, 1.0, 0.0),
        radius: 1.0,
        material: matte,
    });

    let chrome = scene.add_material(Material::Metal {
        albedo: Texture::Constant(Color::new(0.85, 0.85, 0.9)),
    });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(4.0, 1.0, 0.0),
        radius: 1.0,
        material: chrome,
    });

    for a in -8..8 {
        for b in -8..8 {
            let center = Point3::new(
                a as f64 + 0.9 * rng.gen::<f64>(),
                0.2,
                b as f64 + 0.9 * rng.gen::<f64>(),
            );
            if (center - Point3::new(4.0, 0.2, 0.0)).length() < 0.9
                || (center - Point3::new(-4.0, 0.2, 0.0)).length() < 0.9
                || (center - Point3::new(0.0, 0.2, 0.0)).length() < 0.9
            {
                continue;
            }

            let choose_mat: f64 = rng.gen();
            let material = if choose_mat < 0.7 {
                let albedo = Color::new(
                    rng.gen::<f64>() * rng.gen::<f64>(),
                    rng.gen::<f64>() * rng.gen::<f64>(),
                    rng.gen::<f64>() * rng.gen::<f64>(),
                );
                scene.add_material(Material::Lambertian {
                    albedo: Texture::Constant(albedo),
                })
            } else if choose_mat < 0.9 {
                let albedo = Color::new(
                    rng.gen_range(0.5..1.0),
                    rng.gen_range(0.5..1.0),
                    rng.gen_range(0.5..1.0),
                );
                scene.add_material(Material::Metal {
                    albedo: Texture::Constant(albedo),
                })
            } else {
                scene.add_material(Material::Dielectric { ior: 1.5 })
            };
            scene.add_primitive(Primitive::Sphere {
                center,
                radius: 0.2,
                material,
            });
        }
    }

    SceneDescription {
        name: "Showcase",
        scene,
        lights: Vec::new(),
        camera_config: CameraConfig {
            look_from: Point3::new(13.0, 2.0, 3.0),
            look_at: Point3::new(0.0, 0.5, 0.0),
            vup: Vec3::unit_y(),
            vfov_degrees: 20.0,
            aspect_ratio: 2.0,
            aperture: 0.1,
            focus_dist: 10.0,
        },
        sky: SkyModel::Gradient {
            horizon: Color::new(1.0, 1.0, 1.0),
            zenith: Color::new(0.5, 0.7, 1.0),
        },
    }
}

/// A complete Cornell box: four white walls, a red and a green side wall,
/// one diffuse sphere, one specular sphere, one refractive (IOR 1.5)
/// sphere, and a small rectangular light set into the ceiling — the
/// canonical global-illumination test scene, feeding the photon pass via
/// `lights`.
fn build_cornell() -> SceneDescription {
    let mut scene = Scene::new();

    let white = scene.add_material(Material::Lambertian {
        albedo: Texture::Constant(Color::new(0.73, 0.73, 0.73)),
    });
    let red = scene.add_material(Material::Lambertian {
        albedo: Texture::Constant(Color::new(0.65, 0.05, 0.05)),
    });
    let green = scene.add_material(Material::Lambertian {
        albedo: Texture::Constant(Color::new(0.12, 0.45, 0.15)),
    });
    let light_emission = Color::new(1.0, 0.95, 0.85) * 18.0;
    let light_mat = scene.add_material(Material::Emissive {
        emit: Texture::Constant(Color::new(1.0, 0.95, 0.85)),
        intensity: 18.0,
    });

    // Floor
    scene.add_primitive(Primitive::Quad {
        q: Point3::new(-2.0, 0.0, -4.0),
        u: Vec3::new(4.0, 0.0, 0.0),
        v: Vec3::new(0.0, 0.0, 4.0),
        material: white,
    });
    // Ceiling
    scene.add_primitive(Primitive::Quad {
        q: Point3::new(-2.0, 4.0, -4.0),
        u: Vec3::new(4.0, 0.0, 0.0),
        v: Vec3::new(0.0, 0.0, 4.0),
        material: white,
    });
    // Back wall
    scene.add_primitive(Primitive::Quad {
        q: Point3::new(-2.0, 0.0, -4.0),
        u: Vec3::new(4.0, 0.0, 0.0),
        v: Vec3::new(0.0, 4.0, 0.0),
        material: white,
    });
    // Left wall (red)
    scene.add_primitive(Primitive::Quad {
        q: Point3::new(-2.0, 0.0, -4.0),
        u: Vec3::new(0.0, 0.0, 4.0),
        v: Vec3::new(0.0, 4.0, 0.0),
        material: red,
    });
    // Right wall (green)
    scene.add_primitive(Primitive::Quad {
        q: Point3::new(2.0, 0.0, -4.0),
        u: Vec3::new(0.0, 0.0, 4.0),
        v: Vec3::new(0.0, 4.0, 0.0),
        material: green,
    });

    let light_q = Point3::new(-0.5, 3.99, -2.5);
    let light_u = Vec3::new(1.0, 0.0, 0.0);
    let light_v = Vec3::new(0.0, 0.0, 1.0);
    scene.add_primitive(Primitive::Quad {
        q: light_q,
        u: light_u,
        v: light_v,
        material: light_mat,
    });

    let metal = scene.add_material(Material::Metal {
        albedo: Texture::Constant(Color::new(0.9, 0.9, 0.95)),
    });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(-0.7, 0.6, -2.2),
        radius: 0.6,
        material: metal,
    });

    let glass = scene.add_material(Material::Dielectric { ior: 1.5 });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(0.7, 0.45, -1.5),
        radius: 0.45,
        material: glass,
    });

    let lambertian_center = scene.add_material(Material::Lambertian {
        albedo: Texture::Constant(Color::new(0.3, 0.4, 0.8)),
    });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(0.0, 0.4, -2.7),
        radius: 0.4,
        material: lambertian_center,
    });

    let lights = vec![Light::new(
        AreaLightShape::Rect {
            q: light_q,
            u: light_u,
            v: light_v,
        },
        light_emission,
    )];

    SceneDescription {
        name: "Cornell Box",
        scene,
        lights,
        camera_config: CameraConfig {
            look_from: Point3::new(0.0, 2.0, 3.5),
            look_at: Point3::new(0.0, 1.5, -2.0),
            vup: Vec3::unit_y(),
            vfov_degrees: 50.0,
            aspect_ratio: 1.0,
            aperture: 0.0,
            focus_dist: 5.0,
        },
        sky: SkyModel::Black,
    }
}

fn build_minimal() -> SceneDescription {
    let mut scene = Scene::new();

    let ground_mat = scene.add_material(Material::Lambertian {
        albedo: checker(Color::new(0.1, 0.1, 0.1), Color::new(0.9, 0.9, 0.9), 15.0),
    });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(0.0, -100.5, -1.0),
        radius: 100.0,
        material: ground_mat,
    });

    let chrome = scene.add_material(Material::Metal {
        albedo: Texture::Constant(Color::new(0.95, 0.95, 0.97)),
    });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(0.0, 0.5, -1.0),
        radius: 0.5,
        material: chrome,
    });

    let red = scene.add_material(Material::Lambertian {
        albedo: Texture::Constant(Color::new(0.9, 0.2, 0.1)),
    });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(-1.2, 0.25, -0.5),
        radius: 0.25,
        material: red,
    });

    let glass = scene.add_material(Material::Dielectric { ior: 1.5 });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(1.0, 0.3, -0.8),
        radius: 0.3,
        material: glass,
    });

    SceneDescription {
        name: "Minimal",
        scene,
        lights: Vec::new(),
        camera_config: CameraConfig {
            look_from: Point3::new(0.0, 1.5, 2.0),
            look_at: Point3::new(0.0, 0.3, -1.0),
            vup: Vec3::unit_y(),
            vfov_degrees: 40.0,
            aspect_ratio: 2.0,
            aperture: 0.02,
            focus_dist: 3.0,
        },
        sky: SkyModel::Gradient {
            horizon: Color::new(1.0, 1.0, 1.0),
            zenith: Color::new(0.3, 0.5, 1.0),
        },
    }
}

/// Gallery scene — demonstrates every geometry type and material in one frame.
fn build_gallery() -> SceneDescription {
    let mut scene = Scene::new();

    let ground_mat = scene.add_material(Material::Lambertian {
        albedo: checker(Color::new(0.08, 0.08, 0.12), Color::new(0.85, 0.85, 0.80), 8.0),
    });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(0.0, -1000.0, 0.0),
        radius: 1000.0,
        material: ground_mat,
    });

    let backdrop_mat = scene.add_material(Material::Lambertian {
        albedo: Texture::Constant(Color::new(0.15, 0.15, 0.2)),
    });
    scene.add_primitive(Primitive::Quad {
        q: Point3::new(-6.0, 0.0, -5.0),
        u: Vec3::new(12.0, 0.0, 0.0),
        v: Vec3::new(0.0, 6.0, 0.0),
        material: backdrop_mat,
    });

    let pedestal_mat = scene.add_material(Material::Metal {
        albedo: Texture::Constant(Color::new(0.7, 0.7, 0.75)),
    });
    scene.add_primitive(Primitive::Disk {
        center: Point3::new(0.0, 0.01, -1.0),
        normal: Vec3::unit_y(),
        radius: 2.5,
        material: pedestal_mat,
    });

    let glass = scene.add_material(Material::Dielectric { ior: 1.5 });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(0.0, 1.0, -1.0),
        radius: 1.0,
        material: glass,
    });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(0.0, 1.0, -1.0),
        radius: -0.92,
        material: glass,
    });

    let warm_gradient = scene.add_material(Material::Lambertian {
        albedo: Texture::CheckeredUV {
            stripes: 8.0,
            a: Color::new(0.95, 0.3, 0.1),
            b: Color::new(0.95, 0.85, 0.2),
        },
    });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(-2.8, 0.7, -0.5),
        radius: 0.7,
        material: warm_gradient,
    });

    let brushed = scene.add_material(Material::Metal {
        albedo: Texture::Constant(Color::new(0.9, 0.75, 0.6)),
    });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(2.8, 0.8, -0.8),
        radius: 0.8,
        material: brushed,
    });

    let blue = scene.add_material(Material::Lambertian {
        albedo: Texture::Constant(Color::new(0.1, 0.4, 0.85)),
    });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(-1.2, 0.3, 0.8),
        radius: 0.3,
        material: blue,
    });

    let mirror = scene.add_material(Material::Metal {
        albedo: Texture::Constant(Color::new(0.95, 0.95, 0.95)),
    });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(1.5, 0.25, 1.0),
        radius: 0.25,
        material: mirror,
    });

    let pink = scene.add_material(Material::Lambertian {
        albedo: Texture::Constant(Color::new(0.8, 0.15, 0.5)),
    });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(0.8, 0.2, 0.5),
        radius: 0.2,
        material: pink,
    });

    let warm_light_pos = Point3::new(-1.0, 3.5, -2.0);
    let warm_light_emit = scene.add_material(Material::Emissive {
        emit: Texture::Constant(Color::new(1.0, 0.9, 0.7)),
        intensity: 12.0,
    });
    scene.add_primitive(Primitive::Sphere {
        center: warm_light_pos,
        radius: 0.3,
        material: warm_light_emit,
    });

    let cool_light_emit = scene.add_material(Material::Emissive {
        emit: Texture::Constant(Color::new(0.5, 0.7, 1.0)),
        intensity: 10.0,
    });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(2.0, 2.5, 0.0),
        radius: 0.2,
        material: cool_light_emit,
    });

    SceneDescription {
        name: "Gallery",
        scene,
        lights: Vec::new(),
        camera_config: CameraConfig {
            look_from: Point3::new(0.0, 2.5, 6.0),
            look_at: Point3::new(0.0, 0.8, -1.0),
            vup: Vec3::unit_y(),
            vfov_degrees: 35.0,
            aspect_ratio: 16.0 / 9.0,
            aperture: 0.05,
            focus_dist: 7.0,
        },
        sky: SkyModel::Gradient {
            horizon: Color::new(0.15, 0.15, 0.2),
            zenith: Color::new(0.02, 0.02, 0.08),
        },
    }
}

fn build_stress() -> SceneDescription {
    let mut scene = Scene::new();
    let mut rng = rand::thread_rng();

    let ground_mat = scene.add_material(Material::Lambertian {
        albedo: Texture::Constant(Color::new(0.5, 0.5, 0.5)),
    });
    scene.add_primitive(Primitive::Sphere {
        center: Point3::new(0.0, -1000.0, 0.0),
        radius: 1000.0,
        material: ground_mat,
    });

    for _ in 0..500 {
        let center = Point3::new(
            rng.gen_range(-15.0..15.0),
            rng.gen_range(0.1..0.4),
            rng.gen_range(-15.0..15.0),
        );
        let radius = rng.gen_range(0.08..0.35);
        let albedo = Color::new(rng.gen(), rng.gen(), rng.gen());
        let mat = scene.add_material(Material::Lambertian {
            albedo: Texture::Constant(albedo),
        });
        scene.add_primitive(Primitive::Sphere {
            center,
            radius,
            material: mat,
        });
    }

    SceneDescription {
        name: "Stress Test (500 spheres)",
        scene,
        lights: Vec::new(),
        camera_config: CameraConfig {
            look_from: Point3::new(10.0, 4.0, 10.0),
            look_at: Point3::zero(),
            vup: Vec3::unit_y(),
            vfov_degrees: 30.0,
            aspect_ratio: 2.0,
            aperture: 0.0,
            focus_dist: 14.0,
        },
        sky: SkyModel::Gradient {
            horizon: Color::new(1.0, 0.95, 0.88),
            zenith: Color::new(0.4, 0.6, 1.0),
        },
    }
}

/// Finalizes a scene description by building its BVH, constructing the
/// camera, and returning everything the render loop needs.
pub fn build_world(mut desc: SceneDescription) -> Result<(Scene, Vec<Light>, Camera, SkyModel, f64)> {
    desc.scene.build()?;
    let camera = Camera::new(&desc.camera_config);
    let aspect = desc.camera_config.aspect_ratio;
    Ok((desc.scene, desc.lights, camera, desc.sky, aspect))
}
