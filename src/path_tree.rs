//! The path tree (spec §3, §9): nodes own their children through `Box`, so
//! the tree is freed automatically when the root drops — replacing the
//! original's manual node deletion and the leak-prone raw-pointer tree the
//! Design Notes call out for re-architecture.

use crate::math::{Color, Point3, Vec3};

/// A non-owning reference to an object in the scene's object list. A
/// newtype rather than a bare `usize` so path-tree code reads as
/// referencing scene objects, not arbitrary indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectIndex(pub usize);

/// One vertex of a traced light path: the hit point, surface normal, the
/// object hit, the path's importance at this vertex, and up to two owned
/// children (reflected / refracted) produced by continuing the path from
/// here. `radiance` is the total outgoing radiance the kernel computed at
/// this vertex, combining direct illumination and whatever children exist.
pub struct PathNode {
    pub point: Point3,
    pub normal: Vec3,
    pub object: ObjectIndex,
    pub importance: f64,
    pub radiance: Color,
    pub reflected: Option<Box<PathNode>>,
    pub refracted: Option<Box<PathNode>>,
}

impl PathNode {
    pub fn leaf(point: Point3, normal: Vec3, object: ObjectIndex, importance: f64, radiance: Color) -> Self {
        Self {
            point,
            normal,
            object,
            importance,
            radiance,
            reflected: None,
            refracted: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_a_deep_tree_does_not_overflow_the_stack() {
        let mut root = PathNode::leaf(
            Point3::zero(),
            Vec3::unit_z(),
            ObjectIndex(0),
            1.0,
            Color::zero(),
        );
        let mut cursor = &mut root;
        for _ in 0..10_000 {
            cursor.reflected = Some(Box::new(PathNode::leaf(
                Point3::zero(),
                Vec3::unit_z(),
                ObjectIndex(0),
                1.0,
                Color::zero(),
            )));
            cursor = cursor.reflected.as_mut().unwrap();
        }
        drop(root);
    }
}
