use crate::hittable::{HitRecord, Primitive, PrimitiveId};
use crate::math::{Aabb, Ray};

/// A bounding volume hierarchy over a scene's finite (boundable) primitives.
/// Nodes are stored as a tagged enum of owned subtrees rather than
/// `Box<dyn Hittable>` children: each node holds indices into
/// `Scene::primitives`, so the whole tree is plain data with no virtual
/// dispatch during traversal.
#[derive(Debug, Clone)]
pub enum BvhNode {
    Leaf {
        prim: PrimitiveId,
        bbox: Aabb,
    },
    Interior {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
}

impl BvhNode {
    pub fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Interior { bbox, .. } => *bbox,
        }
    }

    /// Builds a BVH over `entries` (primitive id, bounding box, centroid)
    /// triples. Splits at the midpoint of the centroid-spread axis; falls
    /// back to an equal-count (median) split by that axis when all centroids
    /// in the range coincide, so a degenerate cluster (many primitives on
    /// the same point) still produces a balanced tree rather than infinite
    /// recursion on an empty partition.
    pub fn build(entries: &mut [(PrimitiveId, Aabb, crate::math::Point3)]) -> BvhNode {
        assert!(!entries.is_empty(), "cannot build a BVH over zero primitives");
        if entries.len() == 1 {
            let (id, bbox, _) = entries[0];
            return BvhNode::Leaf { prim: id, bbox };
        }

        let mut centroid_bounds = Aabb::EMPTY;
        for (_, _, c) in entries.iter() {
            centroid_bounds.fit(*c);
        }
        let axis = centroid_bounds.sep_axis();
        let axis_idx = axis as usize;

        let mid_value = (centroid_bounds.min[axis_idx] + centroid_bounds.max[axis_idx]) / 2.0;
        let split = partition_point(entries, axis_idx, mid_value);

        let (left_entries, right_entries) = if split == 0 || split == entries.len() {
            // All centroids landed on one side of the midpoint: fall back to
            // an equal-count split so both halves stay non-empty.
            let mid = entries.len() / 2;
            entries.select_nth_unstable_by(mid, |a, b| {
                a.2[axis_idx].partial_cmp(&b.2[axis_idx]).unwrap()
            });
            entries.split_at_mut(mid)
        } else {
            entries.split_at_mut(split)
        };

        let left = Box::new(BvhNode::build(left_entries));
        let right = Box::new(BvhNode::build(right_entries));
        let bbox = Aabb::union(&left.bbox(), &right.bbox());
        BvhNode::Interior { left, right, bbox }
    }

    /// Finds the closest hit among this subtree's primitives within
    /// `[t_min, t_max]`, consulting `lookup` to intersect an actual
    /// primitive once a leaf is reached. `t_max` tightens as better hits are
    /// found, pruning sibling subtrees whose box lies entirely beyond it.
    pub fn hit(
        &self,
        ray: &Ray,
        t_min: f64,
        t_max: f64,
        lookup: &dyn Fn(PrimitiveId) -> Primitive,
    ) -> Option<(HitRecord, PrimitiveId)> {
        if !self.bbox().hit(ray, t_min, t_max) {
            return None;
        }
        match self {
            BvhNode::Leaf { prim, .. } => {
                let primitive = lookup(*prim);
                primitive.hit(ray, t_min, t_max).map(|h| (h, *prim))
            }
            BvhNode::Interior { left, right, .. } => {
                let left_hit = left.hit(ray, t_min, t_max, lookup);
                let new_t_max = left_hit.as_ref().map(|(h, _)| h.t).unwrap_or(t_max);
                let right_hit = right.hit(ray, t_min, new_t_max, lookup);
                right_hit.or(left_hit)
            }
        }
    }
}

/// Partitions `entries` in place so that all entries with
/// `centroid[axis] < mid_value` precede the rest, returning the split index.
fn partition_point(
    entries: &mut [(PrimitiveId, Aabb, crate::math::Point3)],
    axis: usize,
    mid_value: f64,
) -> usize {
    let mut i = 0;
    for j in 0..entries.len() {
        if entries[j].2[axis] < mid_value {
            entries.swap(i, j);
            i += 1;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::MaterialId;
    use crate::math::{Point3, Vec3};

    fn sphere_at(x: f64) -> Primitive {
        Primitive::Sphere {
            center: Point3::new(x, 0.0, 0.0),
            radius: 0.4,
            material: MaterialId(0),
        }
    }

    #[test]
    fn bvh_finds_closest_of_many_colinear_spheres() {
        let prims: Vec<Primitive> = (0..20).map(|i| sphere_at(i as f64 * 2.0)).collect();
        let mut entries: Vec<_> = prims
            .iter()
            .enumerate()
            .map(|(i, p)| {
                (
                    PrimitiveId(i as u32),
                    p.bounding_box().unwrap(),
                    p.centroid(),
                )
            })
            .collect();
        let bvh = BvhNode::build(&mut entries);
        let lookup = |id: PrimitiveId| prims[id.0 as usize];
        let ray = Ray::new(Point3::new(-10.0, 0.0, 0.0), Vec3::unit_x());
        let (hit, id) = bvh.hit(&ray, 1e-4, f64::INFINITY, &lookup).unwrap();
        assert_eq!(id, PrimitiveId(0));
        assert!(hit.t > 0.0);
    }

    #[test]
    fn bvh_handles_coincident_centroids_without_panic() {
        let prims: Vec<Primitive> = (0..8).map(|_| sphere_at(0.0)).collect();
        let mut entries: Vec<_> = prims
            .iter()
            .enumerate()
            .map(|(i, p)| {
                (
                    PrimitiveId(i as u32),
                    p.bounding_box().unwrap(),
                    p.centroid(),
                )
            })
            .collect();
        let bvh = BvhNode::build(&mut entries);
        let lookup = |id: PrimitiveId| prims[id.0 as usize];
        let ray = Ray::new(Point3::new(-10.0, 0.0, 0.0), Vec3::unit_x());
        assert!(bvh.hit(&ray, 1e-4, f64::INFINITY, &lookup).is_some());
    }

    #[test]
    fn single_primitive_builds_a_leaf() {
        let prim = sphere_at(0.0);
        let mut entries = vec![(PrimitiveId(0), prim.bounding_box().unwrap(), prim.centroid())];
        let bvh = BvhNode::build(&mut entries);
        assert!(matches!(bvh, BvhNode::Leaf { .. }));
    }
}
