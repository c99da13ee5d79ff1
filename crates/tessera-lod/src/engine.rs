//! Split/merge decisions for the leaves drained during one step.

use std::cmp::Ordering;
use std::collections::VecDeque;

use glam::DVec2;
use tracing::trace;

use crate::evaluator::ideal_size;
use crate::node::{CHILD_COUNT, LodLeaf, Node, NodeArena, NodeId};
use crate::{DetailSink, LodError, SlotPool};

/// Outcome of evaluating one drained leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LodAction {
    /// Carried into the next generation unchanged.
    Keep,
    /// Replaced by four half-size children.
    Split,
    /// Too coarse, but the split quota or the slot budget ran out this step.
    Defer,
    /// The leaf's parent absorbed it and its siblings.
    MergeParent,
    /// Already absorbed by a merge earlier in this step.
    Skip,
}

/// Summary of one completed step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Leaves split into four children.
    pub splits: u32,
    /// Parents that absorbed their four children.
    pub merges: u32,
    /// Leaves that wanted to split but were held back.
    pub deferred_splits: u32,
    /// Drained leaves ignored because their parent had merged.
    pub skipped: u32,
    /// Size of the leaf set published by the step.
    pub leaf_count: usize,
}

impl StepReport {
    /// Whether the tree shape changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.splits > 0 || self.merges > 0
    }

    pub(crate) fn record(&mut self, action: LodAction) {
        match action {
            LodAction::Keep => {}
            LodAction::Split => self.splits += 1,
            LodAction::Defer => self.deferred_splits += 1,
            LodAction::MergeParent => self.merges += 1,
            LodAction::Skip => self.skipped += 1,
        }
    }
}

/// Mutable state threaded through the leaves of a single step.
pub(crate) struct StepContext<'a, S: DetailSink> {
    pub(crate) arena: &'a mut NodeArena,
    pub(crate) pool: &'a mut SlotPool,
    pub(crate) next: &'a mut VecDeque<NodeId>,
    /// Children detached by merges; freed once the step has finished.
    pub(crate) retired: &'a mut Vec<NodeId>,
    pub(crate) sink: &'a mut S,
    pub(crate) viewpoint: DVec2,
    pub(crate) max_splits: u32,
    pub(crate) splits_this_step: u32,
}

impl<S: DetailSink> StepContext<'_, S> {
    fn ideal_size_of(&self, node: &Node) -> u32 {
        ideal_size(node.lod_center(), node.lod_half_extent(), self.viewpoint)
    }

    /// Decide and apply the fate of one leaf drained from the current generation.
    pub(crate) fn update_leaf(&mut self, id: NodeId) -> Result<LodAction, LodError> {
        let node = &self.arena[id];
        if node.parent_just_merged {
            return Ok(LodAction::Skip);
        }

        if let Some(parent) = node.parent
            && self.parent_should_merge(parent)
        {
            self.merge(parent)?;
            return Ok(LodAction::MergeParent);
        }

        let node = &self.arena[id];
        let target = self.ideal_size_of(node);
        match node.size.cmp(&target) {
            // A leaf never merges itself; only a sibling-triggered parent merge coarsens it.
            Ordering::Equal | Ordering::Less => {
                self.next.push_back(id);
                Ok(LodAction::Keep)
            }
            Ordering::Greater => {
                self.splits_this_step += 1;
                if self.splits_this_step < self.max_splits
                    && self.pool.available() >= CHILD_COUNT as u32 - 1
                {
                    self.split(id)?;
                    Ok(LodAction::Split)
                } else {
                    trace!(node = %id, size = node.size, target, "split deferred");
                    self.next.push_back(id);
                    Ok(LodAction::Defer)
                }
            }
        }
    }

    fn parent_should_merge(&self, parent: NodeId) -> bool {
        let parent = &self.arena[parent];
        let Some(children) = parent.children else {
            return false;
        };
        children.iter().all(|&child| self.arena[child].is_leaf())
            && parent.size <= self.ideal_size_of(parent)
    }

    /// Collapse the four leaf children of `parent` back into it.
    fn merge(&mut self, parent: NodeId) -> Result<(), LodError> {
        let Some(children) = self.arena[parent].children else {
            return Ok(());
        };
        let reclaimed = children
            .iter()
            .filter(|&&child| self.arena[child].slot.is_some())
            .count() as u32;
        if self.pool.available() + reclaimed == 0 {
            return Err(LodError::PoolExhausted {
                capacity: self.pool.capacity(),
            });
        }

        self.next.push_back(parent);
        for child in children {
            let node = &mut self.arena[child];
            self.pool.release(node.slot.take());
            node.parent = None;
            node.parent_just_merged = true;
            self.retired.push(child);
        }

        let slot = self.pool.acquire()?;
        let node = &mut self.arena[parent];
        node.slot = Some(slot);
        node.children = None;
        trace!(node = %parent, size = node.size, %slot, "merged children");
        self.sink.detail_needed(&LodLeaf::from_node(parent, node));
        Ok(())
    }

    /// Replace leaf `id` with four half-size children.
    fn split(&mut self, id: NodeId) -> Result<(), LodError> {
        let own = u32::from(self.arena[id].slot.is_some());
        if self.pool.available() + own < CHILD_COUNT as u32 {
            return Err(LodError::PoolExhausted {
                capacity: self.pool.capacity(),
            });
        }

        let node = &mut self.arena[id];
        self.pool.release(node.slot.take());
        let child_size = node.size / 2;
        let origins: [_; CHILD_COUNT] = std::array::from_fn(|quadrant| node.child_origin(quadrant));

        let mut children = [id; CHILD_COUNT];
        for (child, origin) in children.iter_mut().zip(origins) {
            let mut node = Node::new(origin, child_size, Some(id));
            node.slot = Some(self.pool.acquire()?);
            *child = self.arena.insert(node);
        }
        self.arena[id].children = Some(children);
        trace!(node = %id, child_size, "split");

        for child in children {
            self.next.push_back(child);
            self.sink
                .detail_needed(&LodLeaf::from_node(child, &self.arena[child]));
        }
        Ok(())
    }
}
