use skel_core::{Calibration, Point3, Volume, VolumeView, VolumeViewMut};

use crate::build::build_graphs;
use crate::error::{AnalyzeError, PruneIssue};
use crate::graph::Graph;
use crate::junctions::group_junctions;
use crate::prune::{IntensitySampler, PruneMode, prune_cycles};
use crate::stats::{BranchInfo, TreeStats, assemble_statistics, branch_table};
use crate::tag::{Tagging, tag_skeleton};
use crate::trees::{Tree, TreeId, label_trees};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnalyzeConfig {
    pub prune: PruneMode,
    pub calibration: Calibration,
    /// Fill [`SkeletonAnalysis::branches`] and log one event per branch.
    pub verbose: bool,
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonAnalysis {
    pub calibration: Calibration,
    pub tagging: Tagging,
    pub labels: Volume<TreeId>,
    pub trees: Vec<Tree>,
    pub graphs: Vec<Graph>,
    pub stats: Vec<TreeStats>,
    /// Voxels zeroed by cycle pruning.
    pub pruned: Vec<Point3>,
    pub issues: Vec<PruneIssue>,
    /// Branch table of the final pass, empty unless the run was verbose.
    pub branches: Vec<BranchInfo>,
}

impl SkeletonAnalysis {
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn starting_slabs(&self) -> Vec<Point3> {
        self.trees.iter().filter_map(|t| t.starting_slab).collect()
    }

    pub fn total_branches(&self) -> usize {
        self.stats.iter().map(|s| s.branches).sum()
    }

    pub fn total_junctions(&self) -> usize {
        self.stats.iter().map(|s| s.junctions).sum()
    }

    pub fn total_length(&self) -> f64 {
        self.graphs.iter().map(Graph::total_length).sum()
    }

    pub fn branch_table(&self) -> Vec<BranchInfo> {
        branch_table(&self.trees, &self.graphs, &self.calibration)
    }
}

/// Intermediate products of one pass over the skeleton.
struct Pass {
    tagging: Tagging,
    labels: Volume<TreeId>,
    trees: Vec<Tree>,
    graphs: Vec<Graph>,
}

fn run_pass(skeleton: &VolumeView<'_, u8>, calibration: &Calibration) -> Result<Pass, AnalyzeError> {
    let tagging = tag_skeleton(skeleton);
    let labeled = label_trees(skeleton, &tagging)?;
    let mut trees = labeled.trees;
    group_junctions(skeleton, &tagging, &mut trees);
    let graphs = build_graphs(skeleton, &tagging, &trees, calibration);
    Ok(Pass {
        tagging,
        labels: labeled.labels,
        trees,
        graphs,
    })
}

fn finish(
    pass: Pass,
    calibration: Calibration,
    verbose: bool,
    pruned: Vec<Point3>,
    issues: Vec<PruneIssue>,
) -> SkeletonAnalysis {
    let branches = if verbose {
        let rows = branch_table(&pass.trees, &pass.graphs, &calibration);
        for b in &rows {
            tracing::info!(
                tree = b.tree,
                length = b.length,
                v1 = ?b.v1,
                v2 = ?b.v2,
                euclidean_distance = b.euclidean_distance,
                "branch"
            );
        }
        rows
    } else {
        Vec::new()
    };
    let stats = pass
        .trees
        .iter()
        .zip(&pass.graphs)
        .map(|(t, g)| assemble_statistics(t, g, &pass.tagging))
        .collect();
    SkeletonAnalysis {
        calibration,
        tagging: pass.tagging,
        labels: pass.labels,
        trees: pass.trees,
        graphs: pass.graphs,
        stats,
        pruned,
        issues,
        branches,
    }
}

/// Analyzes a skeleton without pruning, with unit voxel spacing.
pub fn analyze(skeleton: &VolumeView<'_, u8>) -> Result<SkeletonAnalysis, AnalyzeError> {
    let calibration = Calibration::default();
    let pass = run_pass(skeleton, &calibration)?;
    Ok(finish(pass, calibration, false, Vec::new(), Vec::new()))
}

/// Full analysis with optional cycle pruning.
///
/// When pruning removes any voxel, `skeleton` is modified in place and the
/// analysis is repeated once, without pruning, on the opened skeleton. The
/// intensity volume is required by the intensity prune modes and must match
/// the skeleton extent.
pub fn analyze_skeleton(
    skeleton: &mut VolumeViewMut<'_, u8>,
    intensity: Option<&VolumeView<'_, f32>>,
    cfg: &AnalyzeConfig,
) -> Result<SkeletonAnalysis, AnalyzeError> {
    let sampler = match intensity {
        Some(vol) if cfg.prune.needs_intensity() => {
            if vol.dims() != skeleton.dims() {
                return Err(AnalyzeError::ExtentMismatch {
                    expected: skeleton.dims(),
                    actual: vol.dims(),
                });
            }
            Some(IntensitySampler::new(*vol, &cfg.calibration))
        }
        None if cfg.prune.needs_intensity() => {
            return Err(AnalyzeError::MissingIntensity { mode: cfg.prune });
        }
        _ => None,
    };

    let mut pass = run_pass(&skeleton.as_view(), &cfg.calibration)?;
    if !cfg.prune.is_enabled() {
        return Ok(finish(pass, cfg.calibration, cfg.verbose, Vec::new(), Vec::new()));
    }

    let outcome = prune_cycles(skeleton, &pass.trees, &mut pass.graphs, cfg.prune, sampler)?;
    if !outcome.removed.is_empty() {
        pass = run_pass(&skeleton.as_view(), &cfg.calibration)?;
    }
    Ok(finish(
        pass,
        cfg.calibration,
        cfg.verbose,
        outcome.removed,
        outcome.issues,
    ))
}
