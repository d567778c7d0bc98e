//! Build classification
//!
//! Partitions the parser's flat step list into targets and attributable
//! detail steps, then decides for every target and for the build as a whole
//! whether it was a no-op, incremental or clean build.

pub mod classify;
pub mod flatten;
pub mod model;

pub use classify::classify;
pub use flatten::{partition_steps, PartitionError, PartitionedBuild};
pub use model::{BuildCategorisation, BuildCategory, Step, Target};
