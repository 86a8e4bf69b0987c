mod building;
mod printing;
mod ray_bvh_intersection;

use std::num::NonZeroUsize;

use index_vec::IndexVec;

use crate::geometry::WorldBox;

pub use printing::BvhStatistics;
pub use ray_bvh_intersection::StackCache;

/// Default maximum number of primitives in a leaf
pub const LEAF_NODE_MAX_PRIMITIVES: NonZeroUsize = NonZeroUsize::new(4).unwrap();

#[derive(Copy, Clone, Debug)]
pub struct BvhSettings {
    /// Ranges of at most this many primitives become leaves
    pub leaf_size: NonZeroUsize,
}

impl Default for BvhSettings {
    fn default() -> Self {
        BvhSettings {
            leaf_size: LEAF_NODE_MAX_PRIMITIVES,
        }
    }
}

/// Bounding volume hierarchy stored as a flat array of nodes, root at index 0.
///
/// The BVH doesn't own the primitives it was built over. Leaves index into the
/// primitive slice as it was reordered by `Bvh::build`, so the same slice has to be
/// passed to every query.
#[derive(Clone, Debug, Default)]
pub struct Bvh {
    nodes: IndexVec<NodeIdx, BvhNode>,
}

#[derive(Clone, Debug)]
pub struct BvhNode {
    pub bounds: WorldBox,
    pub kind: NodeKind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Leaf { first: usize, count: usize },
    /// Right child is always at `left + 1`
    Inner { left: NodeIdx },
}

impl NodeKind {
    /// Range of primitive indices of a leaf, None for inner nodes
    pub fn primitive_range(&self) -> Option<std::ops::Range<usize>> {
        match *self {
            NodeKind::Leaf { first, count } => Some(first..first + count),
            NodeKind::Inner { .. } => None,
        }
    }

    /// Both children of an inner node, None for leaves
    pub fn children(&self) -> Option<[NodeIdx; 2]> {
        match *self {
            NodeKind::Leaf { .. } => None,
            NodeKind::Inner { left } => Some([left, left + 1]),
        }
    }
}

index_vec::define_index_type! {
    pub struct NodeIdx = u32;
}

impl NodeIdx {
    pub const ROOT: NodeIdx = NodeIdx::from_raw_unchecked(0);
}

impl Bvh {
    pub fn nodes(&self) -> &IndexVec<NodeIdx, BvhNode> {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn leaves(&self) -> impl Iterator<Item = (NodeIdx, &BvhNode)> {
        self.nodes
            .iter_enumerated()
            .filter(|(_, node)| matches!(node.kind, NodeKind::Leaf { .. }))
    }
}
