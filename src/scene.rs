use crate::bvh::BvhNode;
use crate::error::Result;
use crate::hittable::{HitRecord, MaterialId, Primitive, PrimitiveId};
use crate::material::Material;
use crate::math::Ray;

/// The scene: two arenas (materials, primitives) indexed by stable
/// `u32` ids, a BVH over the finite (boundable) primitives, and a linear
/// list of unbounded ones (currently only `Plane`) checked on every `hit`
/// after the BVH. Arena indices stand in for a `Box<dyn Hittable>`/`Rc<dyn
/// Material>` ownership graph so the whole scene is `Send + Sync` and
/// cheaply shared (by reference) across `rayon` worker threads.
pub struct Scene {
    materials: Vec<Material>,
    primitives: Vec<Primitive>,
    bvh: Option<BvhNode>,
    unbounded: Vec<PrimitiveId>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            materials: Vec::new(),
            primitives: Vec::new(),
            bvh: None,
            unbounded: Vec::new(),
        }
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.materials.len() as u32);
        self.materials.push(material);
        id
    }

    pub fn add_primitive(&mut self, primitive: Primitive) -> PrimitiveId {
        let id = PrimitiveId(self.primitives.len() as u32);
        self.primitives.push(primitive);
        id
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0 as usize]
    }

    pub fn primitive(&self, id: PrimitiveId) -> Primitive {
        self.primitives[id.0 as usize]
    }

    /// Builds the BVH over every boundable primitive; primitives whose
    /// `bounding_box()` is `None` (infinite planes) are routed into the
    /// `unbounded` list instead of erroring — the "separate list" strategy
    /// for unbounded geometry (see DESIGN.md). A scene with no primitives at
    /// all builds successfully into one whose `hit()` always misses, falling
    /// through to the sky on every ray — a sky-only scene is a valid, if
    /// unusual, render target, not a build error.
    pub fn build(&mut self) -> Result<()> {
        let mut entries = Vec::with_capacity(self.primitives.len());
        self.unbounded.clear();
        for (i, p) in self.primitives.iter().enumerate() {
            let id = PrimitiveId(i as u32);
            match p.bounding_box() {
                Some(bbox) => entries.push((id, bbox, p.centroid())),
                None => self.unbounded.push(id),
            }
        }

        self.bvh = if entries.is_empty() {
            None
        } else {
            Some(BvhNode::build(&mut entries))
        };

        Ok(())
    }

    /// Finds the closest intersection across both the BVH and the
    /// unbounded primitive list within `[t_min, t_max]`.
    pub fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<(HitRecord, PrimitiveId)> {
        let lookup = |id: PrimitiveId| self.primitive(id);

        let mut best = self
            .bvh
            .as_ref()
            .and_then(|bvh| bvh.hit(ray, t_min, t_max, &lookup));

        let mut closest = best.as_ref().map(|(h, _)| h.t).unwrap_or(t_max);
        for &id in &self.unbounded {
            if let Some(hit) = self.primitive(id).hit(ray, t_min, closest) {
                closest = hit.t;
                best = Some((hit, id));
            }
        }
        best
    }

    /// Whether any point between `ray`'s origin and `t_max` is occluded —
    /// used for shadow testing in the direct-lighting fallback path.
    pub fn occluded(&self, ray: &Ray, t_min: f64, t_max: f64) -> bool {
        self.hit(ray, t_min, t_max).is_some()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::Primitive;
    use crate::material::Material;
    use crate::math::{Color, Point3, Vec3};
    use crate::texture::Texture;

    #[test]
    fn empty_scene_builds_and_always_misses() {
        let mut scene = Scene::new();
        scene.build().unwrap();
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 0.0, -1.0));
        assert!(scene.hit(&ray, 1e-4, f64::INFINITY).is_none());
    }

    #[test]
    fn hit_prefers_closer_of_two_spheres() {
        let mut scene = Scene::new();
        let mat = scene.add_material(Material::Lambertian {
            albedo: Texture::Constant(Color::ones()),
        });
        scene.add_primitive(Primitive::Sphere {
            center: Point3::new(0.0, 0.0, -3.0),
            radius: 1.0,
            material: mat,
        });
        scene.add_primitive(Primitive::Sphere {
            center: Point3::new(0.0, 0.0, -8.0),
            radius: 1.0,
            material: mat,
        });
        scene.build().unwrap();

        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 0.0, -1.0));
        let (hit, _) = scene.hit(&ray, 1e-4, f64::INFINITY).unwrap();
        assert!((hit.t - 2.0).abs() < 1e-6);
    }

    #[test]
    fn unbounded_plane_is_still_hit_without_a_bvh() {
        let mut scene = Scene::new();
        let mat = scene.add_material(Material::Lambertian {
            albedo: Texture::Constant(Color::ones()),
        });
        scene.add_primitive(Primitive::Plane {
            point: Point3::new(0.0, 0.0, -5.0),
            normal: Vec3::unit_z(),
            material: mat,
        });
        scene.build().unwrap();
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 0.0, -1.0));
        assert!(scene.hit(&ray, 1e-4, f64::INFINITY).is_some());
    }
}
