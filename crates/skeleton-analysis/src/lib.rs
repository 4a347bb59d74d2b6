//! Umbrella crate for the skeleton analysis workspace.
//!
//! Re-exports the voxel containers from `skel-core` and the analysis pipeline
//! from `skel-graph`.

pub use skel_core::*;
pub use skel_graph::*;
