use std::{fmt::Display, io};

use crate::util::Stats;

use super::{Bvh, NodeIdx, NodeKind};

#[derive(Clone, Debug, PartialEq)]
pub struct BvhStatistics {
    pub node_count: usize,
    pub leaf_count: usize,
    /// Depth of leaves, root has depth 1
    pub depth: Stats,
    /// Number of primitives per leaf
    pub leaf_fill: Stats,
}

impl Display for BvhStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Nodes: {} ({} leaves)", self.node_count, self.leaf_count)?;
        writeln!(f, "Depth: {}", self.depth)?;
        write!(f, "Leaf node fill: {}", self.leaf_fill)
    }
}

impl Bvh {
    pub fn statistics(&self) -> BvhStatistics {
        let depth = self
            .depth_first()
            .filter(|(_, index)| matches!(self.nodes[*index].kind, NodeKind::Leaf { .. }))
            .map(|(depth, _)| depth)
            .collect();
        let leaf_fill = self
            .leaves()
            .filter_map(|(_, node)| node.kind.primitive_range())
            .map(|range| range.len())
            .collect();

        BvhStatistics {
            node_count: self.nodes.len(),
            leaf_count: self.leaves().count(),
            depth,
            leaf_fill,
        }
    }

    /// Writes an indented dump of the tree, one node per line
    pub fn print_tree(&self, out: &mut impl io::Write) -> io::Result<()> {
        for (depth, index) in self.depth_first() {
            let node = &self.nodes[index];
            let indent = "  ".repeat(depth - 1);
            match node.kind {
                NodeKind::Leaf { first, count } => writeln!(
                    out,
                    "{indent}- L{}: {:?}-{:?} primitives {first}..{}",
                    index.raw(),
                    node.bounds.min.coords.as_slice(),
                    node.bounds.max.coords.as_slice(),
                    first + count,
                )?,
                NodeKind::Inner { .. } => writeln!(
                    out,
                    "{indent}- I{}: {:?}-{:?}",
                    index.raw(),
                    node.bounds.min.coords.as_slice(),
                    node.bounds.max.coords.as_slice(),
                )?,
            }
        }
        Ok(())
    }

    /// Pre-order walk over the tree, yielding (depth, node index) with root at depth 1.
    fn depth_first(&self) -> impl Iterator<Item = (usize, NodeIdx)> + '_ {
        let mut stack = if self.nodes.is_empty() {
            Vec::new()
        } else {
            vec![(1, NodeIdx::ROOT)]
        };

        std::iter::from_fn(move || {
            let (depth, index) = stack.pop()?;
            if let Some([left, right]) = self.nodes[index].kind.children() {
                stack.push((depth + 1, right));
                stack.push((depth + 1, left));
            }
            Some((depth, index))
        })
    }
}

#[cfg(test)]
mod test {
    use assert2::assert;

    use crate::{
        geometry::{Triangle, WorldPoint, WorldTriangle},
        scene::{Bvh, BvhSettings},
    };

    fn row_of_triangles(n: usize) -> Vec<WorldTriangle> {
        (0..n)
            .map(|i| {
                let x = 2.0 * i as f32;
                Triangle::new(
                    WorldPoint::new(x, 0.0, 0.0),
                    WorldPoint::new(x + 1.0, 0.0, 0.0),
                    WorldPoint::new(x, 1.0, 0.0),
                )
            })
            .collect()
    }

    #[test]
    fn statistics_count_every_node() {
        let mut primitives = row_of_triangles(16);
        let bvh = Bvh::build(&mut primitives, &BvhSettings::default());
        let stats = bvh.statistics();

        assert!(stats.node_count == bvh.nodes().len());
        assert!(stats.node_count == 2 * stats.leaf_count - 1);
        assert!(stats.depth.count == stats.leaf_count);
        assert!(stats.leaf_fill.count == stats.leaf_count);
        assert!(stats.leaf_fill.max <= 4);
        assert!(stats.leaf_fill.avg * stats.leaf_count as f32 == 16.0);
    }

    /// Evenly spaced triangles split exactly in half every time
    #[test]
    fn balanced_row_depth() {
        let mut primitives = row_of_triangles(16);
        let bvh = Bvh::build(&mut primitives, &BvhSettings::default());
        let stats = bvh.statistics();

        assert!(stats.leaf_count == 4);
        assert!(stats.depth.min == 3);
        assert!(stats.depth.max == 3);
    }

    #[test]
    fn print_tree_lists_all_nodes() {
        let mut primitives = row_of_triangles(9);
        let bvh = Bvh::build(&mut primitives, &BvhSettings::default());

        let mut out = Vec::new();
        bvh.print_tree(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.lines().count() == bvh.nodes().len());
        assert!(text.starts_with("- I0:"));
        assert!(text.lines().filter(|l| l.contains("primitives")).count() == bvh.leaves().count());
    }

    #[test]
    fn empty_tree() {
        let bvh = Bvh::default();
        let stats = bvh.statistics();
        assert!(stats.node_count == 0);
        assert!(stats.leaf_count == 0);

        let mut out = Vec::new();
        bvh.print_tree(&mut out).unwrap();
        assert!(out.is_empty());
    }
}
