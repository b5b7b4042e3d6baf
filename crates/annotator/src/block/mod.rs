//! Block module — region tracking, annotation, and summary projection.

pub mod annotate;
pub mod instances;
pub mod node_stats;
pub mod tracker;
pub mod traits;

pub use annotate::AnnotatedBlock;
pub use instances::{InstanceCountBlock, InstanceStatsBlock};
pub use node_stats::NodeStatsBlock;
pub use tracker::BlockTracker;
pub use traits::{BlockError, LineFilter};
