//! Runtime module — annotator lifecycle: boot and the stream loop.

pub mod boot;
pub mod run;

pub use run::{Pipeline, RunError, StreamStats};
