use crate::math::{Aabb, Axis, Point3};
use crate::photon::Photon;

/// A left-balanced k-d tree over stored photons, laid out as an implicit
/// heap in a flat array (1-indexed: the root lives at index 1, node `i`'s
/// children at `2i` and `2i+1`). This is the same layout Jensen's photon
/// map uses — it needs no parent/child pointers, so the whole structure is
/// one contiguous allocation that's cheap to share read-only across
/// `rayon` worker threads during the render pass.
pub struct PhotonMap {
    /// 1-indexed: `nodes[0]` is an unused placeholder.
    nodes: Vec<Photon>,
}

impl PhotonMap {
    pub fn len(&self) -> usize {
        nodes_len(&self.nodes)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds a balanced k-d tree from an unordered list of photons.
    pub fn build(mut photons: Vec<Photon>) -> Self {
        let n = photons.len();
        if n == 0 {
            return PhotonMap { nodes: vec![dummy()] };
        }
        let mut nodes = vec![dummy(); n + 1];
        balance(&mut photons, &mut nodes, 1);
        PhotonMap { nodes }
    }

    /// Finds the `k` photons nearest to `query`, returning them sorted by
    /// ascending squared distance. Descends the near child first, only
    /// visiting the far child when the splitting plane lies within the
    /// current worst-of-`k` distance — the standard k-d tree pruning rule.
    pub fn k_nearest(&self, query: Point3, k: usize) -> Vec<(f64, &Photon)> {
        if k == 0 || self.is_empty() {
            return Vec::new();
        }
        let mut heap: Vec<(f64, usize)> = vec![(f64::INFINITY, usize::MAX); k];
        self.nearest_recurse(1, query, &mut heap);
        heap.into_iter()
            .filter(|(d, idx)| d.is_finite() && *idx != usize::MAX)
            .map(|(d, idx)| (d, &self.nodes[idx]))
            .collect()
    }

    fn nearest_recurse(&self, i: usize, query: Point3, heap: &mut [(f64, usize)]) {
        if i >= self.nodes.len() {
            return;
        }
        let node = &self.nodes[i];
        let is_leaf = 2 * i >= self.nodes.len();

        if !is_leaf {
            if let Some(axis) = node.split_axis {
                let axis_idx = axis as usize;
                let delta = query[axis_idx] - node.pos[axis_idx];
                let (near, far) = if delta < 0.0 {
                    (2 * i, 2 * i + 1)
                } else {
                    (2 * i + 1, 2 * i)
                };
                self.nearest_recurse(near, query, heap);
                let worst = heap[heap.len() - 1].0;
                if delta * delta < worst || !worst.is_finite() {
                    self.nearest_recurse(far, query, heap);
                }
            }
        }

        let dist_sq = (query - node.pos).length_squared();
        insert_sorted(heap, dist_sq, i);
    }
}

fn nodes_len(nodes: &[Photon]) -> usize {
    nodes.len().saturating_sub(1)
}

fn dummy() -> Photon {
    Photon::new(Point3::zero(), Point3::zero(), Point3::zero())
}

/// Inserts `(dist_sq, idx)` into `heap` (sorted ascending by distance,
/// fixed capacity `k`) if it beats the current worst entry, shifting the
/// tail down by one slot to make room. A real binary max-heap would be
/// asymptotically better for large `k`, but k-NN queries here use small,
/// fixed `k` (tens of photons), where a linear shift on a sorted array
/// wins on constant factors and simplicity.
fn insert_sorted(heap: &mut [(f64, usize)], dist_sq: f64, idx: usize) {
    let worst = heap.len() - 1;
    if dist_sq >= heap[worst].0 {
        return;
    }
    let mut pos = worst;
    while pos > 0 && heap[pos - 1].0 > dist_sq {
        heap[pos] = heap[pos - 1];
        pos -= 1;
    }
    heap[pos] = (dist_sq, idx);
}

/// Size of the left subtree in a left-balanced tree of `n` nodes: fills
/// complete levels first, then packs the remainder into the left side
/// before the right, matching `s = 2^⌊log2 n⌋`,
/// `left = min(s - 1, n - s/2)`.
pub fn left_subtree_size(n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let log2n = (n as u32).ilog2();
    let s = 1usize << log2n;
    (s - 1).min(n - s / 2)
}

/// Recursively places `photons` into the implicit-heap `nodes` array
/// starting at 1-indexed position `root`, selecting the median along the
/// range's bounding box's widest axis at each step via `select_nth_unstable_by`
/// (equivalent to the original's quickselect-based `median_func`).
fn balance(photons: &mut [Photon], nodes: &mut [Photon], root: usize) {
    let n = photons.len();
    if n == 0 {
        return;
    }
    if n == 1 {
        let mut p = photons[0];
        p.split_axis = None;
        nodes[root] = p;
        return;
    }

    let mut bbox = Aabb::EMPTY;
    for p in photons.iter() {
        bbox.fit(p.pos);
    }
    let axis = bbox.sep_axis();
    let axis_idx = axis as usize;

    let left_size = left_subtree_size(n);
    photons.select_nth_unstable_by(left_size, |a, b| {
        a.pos[axis_idx].partial_cmp(&b.pos[axis_idx]).unwrap()
    });

    let mut median = photons[left_size];
    median.split_axis = Some(axis);
    nodes[root] = median;

    let (left, rest) = photons.split_at_mut(left_size);
    let right = &mut rest[1..];
    balance(left, nodes, 2 * root);
    balance(right, nodes, 2 * root + 1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    #[test]
    fn left_subtree_size_matches_known_values() {
        let cases: &[(usize, usize)] = &[
            (1, 0),
            (2, 1),
            (3, 1),
            (7, 3),
            (8, 4),
            (9, 5),
            (15, 7),
            (16, 8),
            (17, 9),
            (1024, 512),
            (1025, 513),
        ];
        for &(n, expected) in cases {
            assert_eq!(left_subtree_size(n), expected, "n={n}");
        }
    }

    fn make_photons(n: usize) -> Vec<Photon> {
        (0..n)
            .map(|i| {
                Photon::new(
                    Point3::new(i as f64, (i * 7 % 13) as f64, (i * 3 % 5) as f64),
                    Vec3::unit_y(),
                    Vec3::ones(),
                )
            })
            .collect()
    }

    #[test]
    fn build_preserves_photon_count() {
        for n in [1usize, 2, 3, 7, 8, 9, 15, 16, 17, 200] {
            let map = PhotonMap::build(make_photons(n));
            assert_eq!(map.len(), n, "n={n}");
        }
    }

    #[test]
    fn k_nearest_matches_brute_force() {
        let photons = make_photons(300);
        let map = PhotonMap::build(photons.clone());
        let query = Point3::new(50.0, 5.0, 2.0);
        let k = 10;

        let mut brute: Vec<(f64, Point3)> = photons
            .iter()
            .map(|p| ((query - p.pos).length_squared(), p.pos))
            .collect();
        brute.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        let brute_k: Vec<f64> = brute.iter().take(k).map(|(d, _)| *d).collect();

        let found = map.k_nearest(query, k);
        assert_eq!(found.len(), k);
        let found_d: Vec<f64> = found.iter().map(|(d, _)| *d).collect();
        for (a, b) in found_d.iter().zip(brute_k.iter()) {
            assert!((a - b).abs() < 1e-9, "{a} vs {b}");
        }
    }

    #[test]
    fn k_nearest_on_empty_map_returns_empty() {
        let map = PhotonMap::build(Vec::new());
        assert!(map.k_nearest(Point3::zero(), 5).is_empty());
    }

    #[test]
    fn k_nearest_caps_at_available_photon_count() {
        let map = PhotonMap::build(make_photons(3));
        let found = map.k_nearest(Point3::zero(), 50);
        assert_eq!(found.len(), 3);
    }
}
