use std::ops::Range;

use index_vec::IndexVec;
use tracing::debug;

use crate::{
    geometry::{FloatType, WorldBox},
    scene::Primitive,
};

use super::{Bvh, BvhNode, BvhSettings, NodeIdx, NodeKind};

/// Node whose primitive range still needs to be processed.
#[derive(Clone, Debug)]
struct BuildTask {
    node: NodeIdx,
    range: Range<usize>,
}

impl Bvh {
    /// Builds the hierarchy, reordering `primitives` in place.
    ///
    /// Uses an explicit work stack instead of recursion, so arbitrarily unbalanced
    /// splits can't overflow the call stack.
    #[tracing::instrument(skip_all, fields(primitives = primitives.len()))]
    pub fn build<P: Primitive>(primitives: &mut [P], settings: &BvhSettings) -> Bvh {
        // A binary tree with at most n leaves has less than 2n nodes,
        // so this never reallocates.
        let mut nodes = IndexVec::with_capacity(2 * primitives.len());

        if primitives.is_empty() {
            return Bvh { nodes };
        }

        let root = nodes.push(BvhNode::placeholder());
        let mut stack = vec![BuildTask {
            node: root,
            range: 0..primitives.len(),
        }];

        while let Some(BuildTask { node, range }) = stack.pop() {
            let node_primitives = &mut primitives[range.clone()];
            let bounds = node_primitives
                .iter()
                .fold(WorldBox::default(), |acc, p| acc.union(&p.bounding_box()));

            if node_primitives.len() <= settings.leaf_size.get() {
                nodes[node] = BvhNode {
                    bounds,
                    kind: NodeKind::Leaf {
                        first: range.start,
                        count: range.len(),
                    },
                };
                continue;
            }

            let split = range.start + split_primitives(node_primitives, &bounds);

            let left = nodes.push(BvhNode::placeholder());
            let right = nodes.push(BvhNode::placeholder());
            debug_assert!(right == left + 1);

            nodes[node] = BvhNode {
                bounds,
                kind: NodeKind::Inner { left },
            };

            stack.push(BuildTask {
                node: right,
                range: split..range.end,
            });
            stack.push(BuildTask {
                node: left,
                range: range.start..split,
            });
        }

        debug!(nodes = nodes.len(), "BVH build finished");

        Bvh { nodes }
    }
}

impl BvhNode {
    /// Empty node that gets overwritten once its task is popped from the build stack
    fn placeholder() -> Self {
        BvhNode {
            bounds: WorldBox::default(),
            kind: NodeKind::Leaf { first: 0, count: 0 },
        }
    }
}

/// Reorders the primitives so that those with centroid below the mean centroid along
/// the longest axis of `bounds` come first. Returns index of the first primitive of
/// the second half, always in range 1..primitives.len().
fn split_primitives<P: Primitive>(primitives: &mut [P], bounds: &WorldBox) -> usize {
    debug_assert!(primitives.len() >= 2);

    let axis = bounds.largest_axis();
    let centroid = |p: &P| p.bounding_box().center()[axis];

    let split_value =
        primitives.iter().map(centroid).sum::<FloatType>() / (primitives.len() as FloatType);
    let split = itertools::partition(primitives.iter_mut(), |p| centroid(p) < split_value);

    if split == 0 || split == primitives.len() {
        // All centroids are on one side (typically all equal),
        // fall back to splitting the range in half.
        primitives.len() / 2
    } else {
        split
    }
}
