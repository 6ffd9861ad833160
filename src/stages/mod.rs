//! Pipeline Stages
//!
//! Each stage is a pure transform: it reads the previous stage's output and
//! returns a new value.
//!
//! 1. [`FeatureResolver`]: apply features in version order
//! 2. [`prune_groups`]: drop group members that did not survive
//! 3. [`TypeProjector`]: parse raw types, infer parameter flow
//! 4. [`TypeMapper`]: map API types to low-level types

pub mod features;
pub mod groups;
pub mod map;
pub mod project;

pub use features::FeatureResolver;
pub use groups::prune_groups;
pub use map::{TypeMapper, UnmappedPolicy};
pub use project::TypeProjector;
