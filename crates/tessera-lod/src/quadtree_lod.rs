//! Frame-stepped quadtree LOD controller with a double-buffered leaf set.

use std::collections::VecDeque;

use glam::{DVec2, IVec2};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::engine::{StepContext, StepReport};
use crate::node::{LodLeaf, Node, NodeArena, NodeId};
use crate::{DetailSink, LodError, NullSink, SlotPool};

/// Split cap used by [`QuadtreeConfig::default`].
pub const DEFAULT_MAX_SPLITS_PER_STEP: u32 = 8;

/// Parameters fixed for the lifetime of a [`QuadtreeLod`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuadtreeConfig {
    /// Edge length of the root square. Must be a power of two.
    pub root_size: u32,
    /// Number of detail slots, i.e. the most leaves that can exist at once.
    pub slot_capacity: u32,
    /// Split quota per step. The counter is incremented before it is compared,
    /// so at most `max_splits_per_step - 1` splits happen in one step.
    pub max_splits_per_step: u32,
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self {
            root_size: 1024,
            slot_capacity: 100,
            max_splits_per_step: DEFAULT_MAX_SPLITS_PER_STEP,
        }
    }
}

impl QuadtreeConfig {
    /// Config with the default split quota.
    #[must_use]
    pub fn new(root_size: u32, slot_capacity: u32) -> Self {
        Self {
            root_size,
            slot_capacity,
            max_splits_per_step: DEFAULT_MAX_SPLITS_PER_STEP,
        }
    }

    #[must_use]
    pub fn with_max_splits_per_step(mut self, max_splits_per_step: u32) -> Self {
        self.max_splits_per_step = max_splits_per_step;
        self
    }

    /// Reject parameters that cannot describe a valid tree.
    pub fn validate(&self) -> Result<(), LodError> {
        if self.root_size == 0 {
            return Err(LodError::InvalidConfiguration(
                "root size must be positive".into(),
            ));
        }
        if !self.root_size.is_power_of_two() {
            return Err(LodError::InvalidConfiguration(format!(
                "root size {} is not a power of two",
                self.root_size
            )));
        }
        if self.slot_capacity == 0 {
            return Err(LodError::InvalidConfiguration(
                "slot capacity must hold at least the root".into(),
            ));
        }
        if self.max_splits_per_step == 0 {
            return Err(LodError::InvalidConfiguration(
                "split quota must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Adaptive quadtree over a square surface, refined once per step around a
/// moving viewpoint.
///
/// Each [`step`](Self::step) drains the current leaf set in FIFO order,
/// splits leaves that are too coarse for their distance, merges sibling
/// groups whose parent is fine enough, and publishes the rebuilt leaf set.
/// Every leaf owns one slot from a fixed [`SlotPool`]; the `sink` is told
/// whenever a leaf receives a new slot.
///
/// The root is created with a slot but the sink is not notified for it.
pub struct QuadtreeLod<S: DetailSink = NullSink> {
    config: QuadtreeConfig,
    arena: NodeArena,
    pool: SlotPool,
    root: NodeId,
    /// Leaves published by the last completed step.
    current: VecDeque<NodeId>,
    /// Leaves produced by the step in progress.
    next: VecDeque<NodeId>,
    retired: Vec<NodeId>,
    sink: S,
    step_in_progress: bool,
    frame: u64,
}

impl QuadtreeLod<NullSink> {
    /// Create a tree that ignores detail notifications.
    pub fn without_sink(config: QuadtreeConfig) -> Result<Self, LodError> {
        Self::new(config, NullSink)
    }
}

impl<S: DetailSink> QuadtreeLod<S> {
    /// Create a tree holding a single root leaf at (0, 0).
    pub fn new(config: QuadtreeConfig, sink: S) -> Result<Self, LodError> {
        config.validate()?;
        let (arena, pool, root) = build_root(&config)?;
        debug!(
            root_size = config.root_size,
            slot_capacity = config.slot_capacity,
            max_splits = config.max_splits_per_step,
            "created LOD quadtree"
        );
        Ok(Self {
            config,
            arena,
            pool,
            root,
            current: VecDeque::from([root]),
            next: VecDeque::new(),
            retired: Vec::new(),
            sink,
            step_in_progress: false,
            frame: 0,
        })
    }

    /// Advance the tree by one frame for the given viewpoint on the (x, z) plane.
    ///
    /// Returns [`LodError::ReentrantStep`] if an earlier step was abandoned
    /// part-way (an error, or a panic in the sink); call [`reset`](Self::reset)
    /// to recover. Until then the tree publishes no leaves.
    pub fn step(&mut self, viewpoint: DVec2) -> Result<StepReport, LodError> {
        if self.step_in_progress {
            return Err(LodError::ReentrantStep);
        }
        self.step_in_progress = true;
        let report = self.run_step(viewpoint)?;
        self.step_in_progress = false;
        self.frame += 1;

        debug!(
            frame = self.frame,
            splits = report.splits,
            merges = report.merges,
            deferred = report.deferred_splits,
            leaves = report.leaf_count,
            free_slots = self.pool.available(),
            "LOD step"
        );
        Ok(report)
    }

    fn run_step(&mut self, viewpoint: DVec2) -> Result<StepReport, LodError> {
        self.next.clear();
        let mut report = StepReport::default();
        let mut ctx = StepContext {
            arena: &mut self.arena,
            pool: &mut self.pool,
            next: &mut self.next,
            retired: &mut self.retired,
            sink: &mut self.sink,
            viewpoint,
            max_splits: self.config.max_splits_per_step,
            splits_this_step: 0,
        };
        while let Some(id) = self.current.pop_front() {
            report.record(ctx.update_leaf(id)?);
        }

        // A child can reach `next` before a later sibling collapses its parent.
        let arena = &self.arena;
        self.next.retain(|&id| !arena[id].parent_just_merged);
        for id in self.retired.drain(..) {
            self.arena.remove(id);
        }

        std::mem::swap(&mut self.current, &mut self.next);
        report.leaf_count = self.current.len();
        Ok(report)
    }

    /// Current leaves in the order the last step produced them.
    ///
    /// Yields nothing after an abandoned step until [`reset`](Self::reset),
    /// since the tree is then only partly rebuilt.
    pub fn leaves(&self) -> impl Iterator<Item = LodLeaf> + '_ {
        self.published()
            .into_iter()
            .flatten()
            .map(|&id| LodLeaf::from_node(id, &self.arena[id]))
    }

    /// Number of leaves [`leaves`](Self::leaves) yields.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.published().map_or(0, VecDeque::len)
    }

    /// `false` once a step has been abandoned part-way.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !self.step_in_progress
    }

    fn published(&self) -> Option<&VecDeque<NodeId>> {
        (!self.step_in_progress).then_some(&self.current)
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up any live node, leaf or interior.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    #[must_use]
    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    #[must_use]
    pub fn pool(&self) -> &SlotPool {
        &self.pool
    }

    #[must_use]
    pub fn config(&self) -> &QuadtreeConfig {
        &self.config
    }

    /// Number of steps completed since creation or the last reset.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Throw the tree away and start over from a single root leaf.
    pub fn reset(&mut self) -> Result<(), LodError> {
        let (arena, pool, root) = build_root(&self.config)?;
        self.arena = arena;
        self.pool = pool;
        self.root = root;
        self.current = VecDeque::from([root]);
        self.next.clear();
        self.retired.clear();
        self.step_in_progress = false;
        self.frame = 0;
        debug!("LOD quadtree reset");
        Ok(())
    }

    /// Check every structural invariant of the tree and the slot pool.
    pub fn validate(&self) -> Result<(), LodError> {
        if self.step_in_progress {
            return Err(LodError::ReentrantStep);
        }
        let violation = |msg: String| Err(LodError::InvariantViolation(msg));

        let root = &self.arena[self.root];
        if root.parent.is_some() || root.origin != IVec2::ZERO || root.size != self.config.root_size
        {
            return violation(format!("root {} has been displaced", self.root));
        }

        let mut tree_leaves = FxHashSet::default();
        let mut visited = 0usize;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            visited += 1;
            let node = &self.arena[id];
            if node.parent_just_merged {
                return violation(format!("{id} still marked as absorbed"));
            }
            match node.children {
                None => {
                    if node.slot.is_none() {
                        return violation(format!("leaf {id} has no slot"));
                    }
                    tree_leaves.insert(id);
                }
                Some(children) => {
                    if node.slot.is_some() {
                        return violation(format!("interior node {id} holds a slot"));
                    }
                    for (quadrant, child) in children.into_iter().enumerate() {
                        let Some(child_node) = self.arena.get(child) else {
                            return violation(format!("{id} points at freed child {child}"));
                        };
                        if child_node.parent != Some(id)
                            || child_node.size != node.size / 2
                            || child_node.origin != node.child_origin(quadrant)
                        {
                            return violation(format!("child {child} does not fit parent {id}"));
                        }
                        stack.push(child);
                    }
                }
            }
        }
        if visited != self.arena.len() {
            return violation(format!(
                "{} nodes unreachable from the root",
                self.arena.len() - visited
            ));
        }

        let current: FxHashSet<NodeId> = self.current.iter().copied().collect();
        if current.len() != self.current.len() {
            return violation("duplicate entries in the leaf set".into());
        }
        if current != tree_leaves {
            return violation(format!(
                "leaf set has {} entries but the tree has {} leaves",
                current.len(),
                tree_leaves.len()
            ));
        }
        let area: u64 = self.leaves().map(|leaf| leaf.area()).sum();
        let root_area = u64::from(self.config.root_size).pow(2);
        if area != root_area {
            return violation(format!("leaves cover {area} of {root_area}"));
        }

        let mut slots = FxHashSet::default();
        for slot in self.leaves().filter_map(|leaf| leaf.slot).chain(self.pool.free_slots()) {
            if slot.0 >= self.pool.capacity() || !slots.insert(slot) {
                return violation(format!("slot {slot} is duplicated or out of range"));
            }
        }
        if slots.len() != self.pool.capacity() as usize {
            return violation(format!(
                "{} slots accounted for out of {}",
                slots.len(),
                self.pool.capacity()
            ));
        }
        Ok(())
    }
}

fn build_root(config: &QuadtreeConfig) -> Result<(NodeArena, SlotPool, NodeId), LodError> {
    let mut pool = SlotPool::new(config.slot_capacity);
    let mut arena = NodeArena::new();
    let mut root = Node::new(IVec2::ZERO, config.root_size, None);
    root.slot = Some(pool.acquire()?);
    let root = arena.insert(root);
    Ok((arena, pool, root))
}
