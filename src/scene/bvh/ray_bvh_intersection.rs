use assert2::debug_assert;

use super::{Bvh, NodeIdx, NodeKind};
use crate::{
    geometry::{Intersection, Ray, RayIntersectionExt as _},
    scene::Primitive,
};

/// Traversal stack that can be kept around between queries to avoid allocating
/// for every ray.
#[derive(Clone, Debug, Default)]
pub struct StackCache {
    stack: Vec<NodeIdx>,
}

impl Bvh {
    /// Finds the closest intersection of the ray with the primitives.
    /// `primitives` must be the slice this BVH was built over.
    pub fn intersect<P: Primitive>(
        &self,
        primitives: &[P],
        ray: &Ray,
        stack: &mut StackCache,
    ) -> Option<Intersection> {
        if self.nodes.is_empty() {
            return None;
        }

        debug_assert!(stack.stack.is_empty());
        stack.stack.push(NodeIdx::ROOT);

        let mut best: Option<Intersection> = None;

        while let Some(index) = stack.stack.pop() {
            let node = &self.nodes[index];
            if !node.bounds.intersects(ray) {
                continue;
            }

            match node.kind {
                NodeKind::Inner { left } => {
                    // TODO: Perf: Push the further child first, so that the nearer one is
                    // visited first and could limit the search through ray.t_max
                    stack.stack.push(left + 1);
                    stack.stack.push(left);
                }
                NodeKind::Leaf { first, count } => {
                    for primitive in &primitives[first..first + count] {
                        let Some(hit) = primitive.intersect(ray) else {
                            continue;
                        };
                        if best.as_ref().is_none_or(|b| hit.travel_t < b.travel_t) {
                            best = Some(hit);
                        }
                    }
                }
            }
        }

        best
    }
}
