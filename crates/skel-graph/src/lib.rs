//! Topology and length analysis of 3D skeletons.
//!
//! The input is a thinned binary volume (foreground = non-zero `u8`). The
//! analysis runs in fixed phases:
//! - Every foreground voxel is tagged by its count of 26-neighbors: end point
//!   (< 2), slab (= 2) or junction (> 2).
//! - Connected components become trees, labelled from 1.
//! - Touching junction voxels of a tree are grouped into clusters; one
//!   cluster counts as one junction.
//! - Each tree becomes a [`Graph`]: end points and junction clusters are
//!   vertices, traced slab chains are edges with calibrated lengths. A ring
//!   without end points or junctions is a single self-loop.
//! - Optionally, every cycle is opened by zeroing one voxel (see
//!   [`PruneMode`]) and the analysis is repeated once.
//!
//! [`analyze_skeleton`] runs the whole pipeline; the phase functions are
//! public for callers that want intermediate products.

mod analyze;
mod build;
mod error;
mod graph;
mod junctions;
mod prune;
mod stats;
mod tag;
mod trees;
mod visited;

#[cfg(test)]
mod fixtures;

pub use analyze::{AnalyzeConfig, SkeletonAnalysis, analyze, analyze_skeleton};
pub use build::build_graphs;
pub use error::{AnalyzeError, PruneIssue};
pub use graph::{Edge, EdgeId, EdgeKind, Graph, Vertex, VertexId, VertexKind};
pub use junctions::{cluster_branch_count, group_junctions};
pub use prune::{IntensitySampler, PruneMode, PruneOutcome, prune_cycles};
pub use stats::{BranchInfo, TreeStats, assemble_statistics, branch_table};
pub use tag::{Tag, Tagging, count_foreground_neighbors, tag_skeleton};
pub use trees::{MAX_TREES, Tree, TreeId, TreeLabels, label_trees};
pub use visited::VisitedFlags;
