use crate::math::{Aabb, Point3, Ray, Vec3};

/// A stable index into `Scene::materials`. Arena-allocated handles replace
/// `Rc<dyn Material>`/lifetime-tied references so primitives stay `Copy` and
/// the scene can be shared freely across `rayon` worker threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

/// A stable index into `Scene::primitives`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveId(pub u32);

/// The result of a successful ray-primitive intersection.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord {
    pub p: Point3,
    pub normal: Vec3,
    pub t: f64,
    pub u: f64,
    pub v: f64,
    pub front_face: bool,
    pub material: MaterialId,
}

impl HitRecord {
    /// Orients `outward_normal` against the ray direction and records whether
    /// the hit was on the front (outward-facing) side, which dielectric
    /// scattering needs to pick the correct refraction ratio.
    pub fn set_face_normal(ray: &Ray, outward_normal: Vec3) -> (Vec3, bool) {
        let front_face = ray.direction.dot(outward_normal) < 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };
        (normal, front_face)
    }
}

/// Closed enum of intersectable shapes. A tagged variant here (rather than
/// `Box<dyn Hittable>`) lets `Scene::primitives` be one contiguous, `Copy`
/// vector that the BVH indexes by `PrimitiveId` instead of by pointer.
#[derive(Debug, Clone, Copy)]
pub enum Primitive {
    Sphere {
        center: Point3,
        radius: f64,
        material: MaterialId,
    },
    /// An infinite plane, defined by a point and a unit normal. Has no finite
    /// bounding box and is therefore kept out of the BVH (see `Scene::unbounded`).
    Plane {
        point: Point3,
        normal: Vec3,
        material: MaterialId,
    },
    /// A triangle with optional per-vertex normals. When all three are
    /// present the shading normal is barycentric-interpolated from them
    /// (smooth shading, as an OBJ-loaded mesh would supply); when any is
    /// absent the flat geometric face normal is used instead.
    Triangle {
        v0: Point3,
        v1: Point3,
        v2: Point3,
        n0: Option<Vec3>,
        n1: Option<Vec3>,
        n2: Option<Vec3>,
        material: MaterialId,
    },
    /// A finite parallelogram spanned by edge vectors `u`/`v` from corner `q`.
    Quad {
        q: Point3,
        u: Vec3,
        v: Vec3,
        material: MaterialId,
    },
    /// A finite disk of `radius` centered at `center`, lying in the plane
    /// perpendicular to `normal`.
    Disk {
        center: Point3,
        normal: Vec3,
        radius: f64,
        material: MaterialId,
    },
}

const T_EPS: f64 = 1e-4;

impl Primitive {
    pub fn material(&self) -> MaterialId {
        match *self {
            Primitive::Sphere { material, .. }
            | Primitive::Plane { material, .. }
            | Primitive::Triangle { material, .. }
            | Primitive::Quad { material, .. }
            | Primitive::Disk { material, .. } => material,
        }
    }

    /// The finite bounding box of this primitive, or `None` for shapes
    /// (currently only `Plane`) that are unbounded and must be excluded
    /// from the BVH.
    pub fn bounding_box(&self) -> Option<Aabb> {
        match *self {
            Primitive::Sphere { center, radius, .. } => {
                let r = Vec3::new(radius, radius, radius);
                Some(Aabb::new(center - r, center + r))
            }
            Primitive::Plane { .. } => None,
            Primitive::Triangle { v0, v1, v2, .. } => {
                let mut b = Aabb::new(v0, v0);
                b.fit(v1);
                b.fit(v2);
                pad(&mut b);
                Some(b)
            }
            Primitive::Quad { q, u, v, .. } => {
                let mut b = Aabb::new(q, q);
                b.fit(q + u);
                b.fit(q + v);
                b.fit(q + u + v);
                pad(&mut b);
                Some(b)
            }
            Primitive::Disk {
                center,
                normal,
                radius,
                ..
            } => {
                // Bound the disk by its defining plane's normal-aligned extent:
                // a cube of the radius expanded along the two tangent axes and
                // flattened (then padded) along the normal.
                let n = normal.normalized();
                let r = Vec3::new(
                    radius * (1.0 - n.x * n.x).max(0.0).sqrt().max(1e-6),
                    radius * (1.0 - n.y * n.y).max(0.0).sqrt().max(1e-6),
                    radius * (1.0 - n.z * n.z).max(0.0).sqrt().max(1e-6),
                );
                let mut b = Aabb::new(center - r, center + r);
                pad(&mut b);
                Some(b)
            }
        }
    }

    pub fn centroid(&self) -> Point3 {
        match *self {
            Primitive::Sphere { center, .. } => center,
            Primitive::Plane { point, .. } => point,
            Primitive::Triangle { v0, v1, v2, .. } => (v0 + v1 + v2) / 3.0,
            Primitive::Quad { q, u, v, .. } => q + (u + v) * 0.5,
            Primitive::Disk { center, .. } => center,
        }
    }

    pub fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord> {
        match *self {
            Primitive::Sphere {
                center,
                radius,
                material,
            } => hit_sphere(ray, center, radius, material, t_min, t_max),
            Primitive::Plane {
                point,
                normal,
                material,
            } => hit_plane(ray, point, normal, material, t_min, t_max),
            Primitive::Triangle {
                v0,
                v1,
                v2,
                n0,
                n1,
                n2,
                material,
            } => hit_triangle(ray, v0, v1, v2, n0, n1, n2, material, t_min, t_max),
            Primitive::Quad { q, u, v, material } => hit_quad(ray, q, u, v, material, t_min, t_max),
            Primitive::Disk {
                center,
                normal,
                radius,
                material,
            } => hit_disk(ray, center, normal, radius, material, t_min, t_max),
        }
    }
}

fn pad(b: &mut Aabb) {
    const EPS: f64 = 1e-4;
    for axis in [0usize, 1, 2] {
        if b.max[axis] - b.min[axis] < EPS {
            match axis {
                0 => {
                    b.min.x -= EPS;
                    b.max.x += EPS;
                }
                1 => {
                    b.min.y -= EPS;
                    b.max.y += EPS;
                }
                _ => {
                    b.min.z -= EPS;
                    b.max.z += EPS;
                }
            }
        }
    }
}

fn hit_sphere(
    ray: &Ray,
    center: Point3,
    radius: f64,
    material: MaterialId,
    t_min: f64,
    t_max: f64,
) -> Option<HitRecord> {
    let oc = ray.origin - center;
    let a = ray.direction.length_squared();
    let half_b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let mut root = (-half_b - sqrt_d) / a;
    if root <= t_min || root >= t_max {
        root = (-half_b + sqrt_d) / a;
        if root <= t_min || root >= t_max {
            return None;
        }
    }
    let p = ray.at(root);
    let outward_normal = (p - center) / radius;
    let (normal, front_face) = HitRecord::set_face_normal(ray, outward_normal);
    let (u, v) = sphere_uv(outward_normal);
    Some(HitRecord {
        p,
        normal,
        t: root,
        u,
        v,
        front_face,
        material,
    })
}

fn sphere_uv(p: Vec3) -> (f64, f64) {
    let theta = (-p.y).acos();
    let phi = (-p.z).atan2(p.x) + std::f64::consts::PI;
    (
        phi / (2.0 * std::f64::consts::PI),
        theta / std::f64::consts::PI,
    )
}

fn hit_plane(
    ray: &Ray,
    point: Point3,
    normal: Vec3,
    material: MaterialId,
    t_min: f64,
    t_max: f64,
) -> Option<HitRecord> {
    let denom = normal.dot(ray.direction);
    if denom.abs() < 1e-8 {
        return None;
    }
    let t = (point - ray.origin).dot(normal) / denom;
    if t <= t_min || t >= t_max {
        return None;
    }
    let p = ray.at(t);
    let (n, front_face) = HitRecord::set_face_normal(ray, normal.normalized());
    Some(HitRecord {
        p,
        normal: n,
        t,
        u: 0.0,
        v: 0.0,
        front_face,
        material,
    })
}

#[allow(clippy::too_many_arguments)]
fn hit_triangle(
    ray: &Ray,
    v0: Point3,
    v1: Point3,
    v2: Point3,
    n0: Option<Vec3>,
    n1: Option<Vec3>,
    n2: Option<Vec3>,
    material: MaterialId,
    t_min: f64,
    t_max: f64,
) -> Option<HitRecord> {
    const EPS: f64 = 1e-8;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < EPS {
        return None;
    }
    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = f * edge2.dot(q);
    if t <= t_min || t >= t_max {
        return None;
    }
    let p = ray.at(t);
    let geometric_normal = edge1.cross(edge2).normalized();
    let outward_normal = match (n0, n1, n2) {
        (Some(n0), Some(n1), Some(n2)) => {
            let shading = n0 * u + n1 * v + n2 * (1.0 - u - v);
            if shading.near_zero() {
                geometric_normal
            } else {
                shading.normalized()
            }
        }
        _ => geometric_normal,
    };
    let (normal, front_face) = HitRecord::set_face_normal(ray, outward_normal);
    Some(HitRecord {
        p,
        normal,
        t,
        u,
        v,
        front_face,
        material,
    })
}

/// Planar-hit quad test in the style of a barycentric plane parametrization:
/// `w = n / dot(n, n)` lets `alpha`/`beta` be recovered with a single dot
/// product each instead of solving a 2x2 linear system per hit.
fn hit_quad(
    ray: &Ray,
    q: Point3,
    u: Vec3,
    v: Vec3,
    material: MaterialId,
    t_min: f64,
    t_max: f64,
) -> Option<HitRecord> {
    let n = u.cross(v);
    let normal = n.normalized();
    let denom = normal.dot(ray.direction);
    if denom.abs() < 1e-8 {
        return None;
    }
    let d = normal.dot(q);
    let t = (d - normal.dot(ray.origin)) / denom;
    if t <= t_min || t >= t_max {
        return None;
    }
    let p = ray.at(t);
    let planar_hit = p - q;
    let w = n / n.dot(n);
    let alpha = w.dot(planar_hit.cross(v));
    let beta = w.dot(u.cross(planar_hit));
    if !(0.0..=1.0).contains(&alpha) || !(0.0..=1.0).contains(&beta) {
        return None;
    }
    let (normal, front_face) = HitRecord::set_face_normal(ray, normal);
    Some(HitRecord {
        p,
        normal,
        t,
        u: alpha,
        v: beta,
        front_face,
        material,
    })
}

fn hit_disk(
    ray: &Ray,
    center: Point3,
    normal: Vec3,
    radius: f64,
    material: MaterialId,
    t_min: f64,
    t_max: f64,
) -> Option<HitRecord> {
    let n = normal.normalized();
    let denom = n.dot(ray.direction);
    if denom.abs() < 1e-8 {
        return None;
    }
    let t = (center - ray.origin).dot(n) / denom;
    if t <= t_min || t >= t_max {
        return None;
    }
    let p = ray.at(t);
    if (p - center).length_squared() > radius * radius {
        return None;
    }
    let (normal, front_face) = HitRecord::set_face_normal(ray, n);
    Some(HitRecord {
        p,
        normal,
        t,
        u: 0.0,
        v: 0.0,
        front_face,
        material,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mid() -> MaterialId {
        MaterialId(0)
    }

    #[test]
    fn sphere_hit_reports_outward_normal_on_front_face() {
        let s = Primitive::Sphere {
            center: Point3::zero(),
            radius: 1.0,
            material: mid(),
        };
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::unit_z());
        let hit = s.hit(&ray, T_EPS, f64::INFINITY).unwrap();
        assert!(hit.front_face);
        assert!((hit.normal - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-9);
    }

    #[test]
    fn quad_hit_within_bounds_but_miss_outside() {
        let quad = Primitive::Quad {
            q: Point3::new(-1.0, -1.0, 0.0),
            u: Vec3::new(2.0, 0.0, 0.0),
            v: Vec3::new(0.0, 2.0, 0.0),
            material: mid(),
        };
        let hit_ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::unit_z());
        assert!(quad.hit(&hit_ray, T_EPS, f64::INFINITY).is_some());
        let miss_ray = Ray::new(Point3::new(5.0, 5.0, -5.0), Vec3::unit_z());
        assert!(quad.hit(&miss_ray, T_EPS, f64::INFINITY).is_none());
    }

    #[test]
    fn disk_hit_respects_radius() {
        let disk = Primitive::Disk {
            center: Point3::zero(),
            normal: Vec3::unit_z(),
            radius: 1.0,
            material: mid(),
        };
        let inside = Ray::new(Point3::new(0.5, 0.0, -5.0), Vec3::unit_z());
        let outside = Ray::new(Point3::new(5.0, 0.0, -5.0), Vec3::unit_z());
        assert!(disk.hit(&inside, T_EPS, f64::INFINITY).is_some());
        assert!(disk.hit(&outside, T_EPS, f64::INFINITY).is_none());
    }

    #[test]
    fn plane_has_no_bounding_box() {
        let plane = Primitive::Plane {
            point: Point3::zero(),
            normal: Vec3::unit_y(),
            material: mid(),
        };
        assert!(plane.bounding_box().is_none());
    }

    #[test]
    fn triangle_hit_respects_barycentric_bounds() {
        let tri = Primitive::Triangle {
            v0: Point3::new(-1.0, -1.0, 0.0),
            v1: Point3::new(1.0, -1.0, 0.0),
            v2: Point3::new(0.0, 1.0, 0.0),
            n0: None,
            n1: None,
            n2: None,
            material: mid(),
        };
        let inside = Ray::new(Point3::new(0.0, -0.5, -5.0), Vec3::unit_z());
        let outside = Ray::new(Point3::new(-5.0, -5.0, -5.0), Vec3::unit_z());
        assert!(tri.hit(&inside, T_EPS, f64::INFINITY).is_some());
        assert!(tri.hit(&outside, T_EPS, f64::INFINITY).is_none());
    }

    #[test]
    fn triangle_with_vertex_normals_interpolates_shading_normal() {
        let tri = Primitive::Triangle {
            v0: Point3::new(-1.0, -1.0, 0.0),
            v1: Point3::new(1.0, -1.0, 0.0),
            v2: Point3::new(0.0, 1.0, 0.0),
            n0: Some(Vec3::new(-0.3, 0.0, 1.0).normalized()),
            n1: Some(Vec3::new(0.3, 0.0, 1.0).normalized()),
            n2: Some(Vec3::unit_z()),
            material: mid(),
        };
        let ray = Ray::new(Point3::new(0.0, -0.5, -5.0), Vec3::unit_z());
        let hit = tri.hit(&ray, T_EPS, f64::INFINITY).unwrap();
        // Interpolated normal should still point roughly toward the ray origin
        // but need not equal the flat face normal (0, 0, -1) exactly.
        assert!(hit.normal.z < 0.0);
    }
}
