//! Quadtree nodes and the arena that owns them.

use std::fmt;
use std::ops::{Index, IndexMut};

use glam::{DVec2, IVec2};

use crate::SlotId;

/// Number of children of an interior node.
pub const CHILD_COUNT: usize = 4;

/// Child origin offsets in units of the child size.
/// Order: \[-x-z, +x-z, -x+z, +x+z\].
pub const QUADRANT_OFFSETS: [IVec2; CHILD_COUNT] = [
    IVec2::new(0, 0),
    IVec2::new(1, 0),
    IVec2::new(0, 1),
    IVec2::new(1, 1),
];

/// Stable handle to a node in a [`NodeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Raw arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A square region of the surface.
///
/// `origin` is the minimum corner on the (x, z) ground plane; glam's `y`
/// component carries the z coordinate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub(crate) origin: IVec2,
    pub(crate) size: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Option<[NodeId; CHILD_COUNT]>,
    pub(crate) slot: Option<SlotId>,
    /// Set when this node's parent absorbed it earlier in the current step.
    pub(crate) parent_just_merged: bool,
}

impl Node {
    pub(crate) fn new(origin: IVec2, size: u32, parent: Option<NodeId>) -> Self {
        Self {
            origin,
            size,
            parent,
            children: None,
            slot: None,
            parent_just_merged: false,
        }
    }

    /// Minimum (x, z) corner.
    #[must_use]
    pub fn origin(&self) -> IVec2 {
        self.origin
    }

    /// Edge length.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Parent handle, `None` for the root or a node detached by a merge.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The four children in quadrant order, if the node has been split.
    #[must_use]
    pub fn children(&self) -> Option<&[NodeId; CHILD_COUNT]> {
        self.children.as_ref()
    }

    /// Detail slot held by this node.
    #[must_use]
    pub fn slot(&self) -> Option<SlotId> {
        self.slot
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Origin of the child in quadrant `quadrant` (see [`QUADRANT_OFFSETS`]).
    #[must_use]
    pub fn child_origin(&self, quadrant: usize) -> IVec2 {
        self.origin + QUADRANT_OFFSETS[quadrant] * (self.size / 2) as i32
    }

    /// Center of the node using integer halving of the size.
    ///
    /// A size-1 node therefore collapses to its origin.
    #[must_use]
    pub fn lod_center(&self) -> DVec2 {
        self.origin.as_dvec2() + DVec2::splat(f64::from(self.size / 2))
    }

    /// Half edge length using integer halving.
    #[must_use]
    pub fn lod_half_extent(&self) -> DVec2 {
        DVec2::splat(f64::from(self.size / 2))
    }
}

/// Read-only snapshot of a leaf handed to renderers and detail sinks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LodLeaf {
    /// Handle of the node.
    pub id: NodeId,
    /// Minimum (x, z) corner.
    pub origin: IVec2,
    /// Edge length.
    pub size: u32,
    /// Detail slot backing this leaf.
    pub slot: Option<SlotId>,
}

impl LodLeaf {
    pub(crate) fn from_node(id: NodeId, node: &Node) -> Self {
        Self {
            id,
            origin: node.origin,
            size: node.size,
            slot: node.slot,
        }
    }

    /// Geometric center of the square on the ground plane.
    #[must_use]
    pub fn center(&self) -> DVec2 {
        self.origin.as_dvec2() + DVec2::splat(f64::from(self.size) / 2.0)
    }

    /// Full edge lengths, for drawing the leaf as a box.
    #[must_use]
    pub fn extent(&self) -> DVec2 {
        DVec2::splat(f64::from(self.size))
    }

    /// Area covered by the leaf.
    #[must_use]
    pub fn area(&self) -> u64 {
        u64::from(self.size) * u64::from(self.size)
    }

    /// Whether the squares of two leaves share any interior area.
    #[must_use]
    pub fn overlaps(&self, other: &LodLeaf) -> bool {
        let (a_min, a_max) = (self.origin.as_i64vec2(), self.origin.as_i64vec2() + i64::from(self.size));
        let (b_min, b_max) = (other.origin.as_i64vec2(), other.origin.as_i64vec2() + i64::from(other.size));
        a_min.x < b_max.x && b_min.x < a_max.x && a_min.y < b_max.y && b_min.y < a_max.y
    }
}

/// Owns every node of one quadtree.
///
/// Removed entries are recycled through a free list, so a [`NodeId`] must not
/// be used after [`remove`](Self::remove) returned its node.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Option<Node>>,
    free: Vec<u32>,
}

impl NodeArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                self.nodes[index as usize] = Some(node);
                NodeId(index)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() as u32 - 1)
            }
        }
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.get_mut(id.index())?.take()?;
        self.free.push(id.0);
        Some(node)
    }

    /// Look up a live node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    /// Number of live nodes, interior ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over all live nodes.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().map(|n| (NodeId(i as u32), n)))
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("stale node handle {id}"),
        }
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id.index()).and_then(Option::as_mut) {
            Some(node) => node,
            None => panic!("stale node handle {id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_origins_follow_quadrant_order() {
        let node = Node::new(IVec2::new(64, 128), 64, None);
        assert_eq!(node.child_origin(0), IVec2::new(64, 128));
        assert_eq!(node.child_origin(1), IVec2::new(96, 128));
        assert_eq!(node.child_origin(2), IVec2::new(64, 160));
        assert_eq!(node.child_origin(3), IVec2::new(96, 160));
    }

    /// Sizes halve with integer division, so a size-1 node evaluates as a point at its origin.
    #[test]
    fn test_lod_center_uses_integer_halving() {
        let node = Node::new(IVec2::new(10, 20), 1, None);
        assert_eq!(node.lod_center(), DVec2::new(10.0, 20.0));
        assert_eq!(node.lod_half_extent(), DVec2::ZERO);

        let node = Node::new(IVec2::new(0, 0), 8, None);
        assert_eq!(node.lod_center(), DVec2::new(4.0, 4.0));
        assert_eq!(node.lod_half_extent(), DVec2::splat(4.0));
    }

    #[test]
    fn test_arena_recycles_removed_ids() {
        let mut arena = NodeArena::new();
        let a = arena.insert(Node::new(IVec2::ZERO, 4, None));
        let b = arena.insert(Node::new(IVec2::ZERO, 2, Some(a)));
        assert_eq!(arena.len(), 2);

        assert!(arena.remove(b).is_some());
        assert!(arena.get(b).is_none());
        assert!(arena.remove(b).is_none());
        assert_eq!(arena.len(), 1);

        let c = arena.insert(Node::new(IVec2::new(2, 0), 2, Some(a)));
        assert_eq!(c, b);
        assert_eq!(arena[c].origin(), IVec2::new(2, 0));
    }

    #[test]
    #[should_panic(expected = "stale node handle")]
    fn test_indexing_stale_handle_panics() {
        let mut arena = NodeArena::new();
        let a = arena.insert(Node::new(IVec2::ZERO, 4, None));
        arena.remove(a);
        let _ = &arena[a];
    }

    #[test]
    fn test_leaf_overlap() {
        let leaf = |x, z, size| LodLeaf {
            id: NodeId(0),
            origin: IVec2::new(x, z),
            size,
            slot: None,
        };
        assert!(leaf(0, 0, 4).overlaps(&leaf(2, 2, 2)));
        assert!(!leaf(0, 0, 4).overlaps(&leaf(4, 0, 4)));
        assert!(!leaf(0, 0, 4).overlaps(&leaf(0, 4, 4)));
        assert_eq!(leaf(0, 0, 4).area(), 16);
        assert_eq!(leaf(0, 0, 4).center(), DVec2::new(2.0, 2.0));
    }
}
