//! Adaptive quadtree level-of-detail management for tiled surfaces.
//!
//! A [`QuadtreeLod`] refines a square region around a moving viewpoint one
//! step at a time: leaves that are too coarse for their distance are split,
//! sibling groups whose parent is fine enough are merged back, and every
//! leaf holds one slot from a bounded [`SlotPool`]. Splits per step are
//! capped, so the cost of a step stays bounded while the tree converges.

mod engine;
mod error;
mod evaluator;
mod node;
mod quadtree_lod;
mod sink;
mod slot_pool;

pub use engine::{LodAction, StepReport};
pub use error::LodError;
pub use evaluator::{MAX_LEVEL, closest_point_distance_squared, ideal_size, ideal_size_for};
pub use node::{CHILD_COUNT, LodLeaf, Node, NodeArena, NodeId, QUADRANT_OFFSETS};
pub use quadtree_lod::{DEFAULT_MAX_SPLITS_PER_STEP, QuadtreeConfig, QuadtreeLod};
pub use sink::{DetailSink, LogSink, NullSink, RecordingSink};
pub use slot_pool::{SlotId, SlotPool};
