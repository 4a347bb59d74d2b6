use skel_core::Point3;
use thiserror::Error;

use crate::prune::PruneMode;

/// Conditions that abort an analysis run. No partial result is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyzeError {
    #[error("more than {limit} skeletons in the volume; tree labels cannot represent them")]
    TooManyTrees { limit: usize },
    #[error("prune mode '{mode}' needs a grayscale intensity volume")]
    MissingIntensity { mode: PruneMode },
    #[error("intensity volume extent {actual:?} does not match skeleton extent {expected:?}")]
    ExtentMismatch {
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },
    #[error("unknown prune mode '{0}'")]
    UnknownPruneMode(String),
    #[error(transparent)]
    Core(#[from] skel_core::Error),
}

/// Structural inconsistency met while pruning a cycle.
///
/// Pruning still removes a voxel (the first point of the cycle edge's first
/// vertex) and carries on; the issue is reported alongside the result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PruneIssue {
    #[error("tree {tree}: lowest intensity branch has no slab voxels, removed vertex voxel {vertex}")]
    BranchWithoutSlabs { tree: usize, vertex: Point3 },
    #[error("tree {tree}: cycle has no slab voxels, removed vertex voxel {vertex}")]
    CycleWithoutSlabs { tree: usize, vertex: Point3 },
}
