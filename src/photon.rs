use crate::math::{Axis, Color, Point3, Vec3};

/// A single stored photon: an incident direction and power at a surface
/// point, plus the split axis this node uses once it's placed into the
/// k-d tree. `split_axis` is `None` for leaves (nodes with no children in
/// the implicit heap layout) — an explicit field rather than an overloaded
/// flag byte, so a leaf is identified by its position in the array, not by
/// a sentinel value sharing the axis field's encoding.
#[derive(Debug, Clone, Copy)]
pub struct Photon {
    pub pos: Point3,
    pub dir: Vec3,
    pub power: Color,
    pub split_axis: Option<Axis>,
}

impl Photon {
    pub fn new(pos: Point3, dir: Vec3, power: Color) -> Self {
        Self {
            pos,
            dir,
            power,
            split_axis: None,
        }
    }
}
