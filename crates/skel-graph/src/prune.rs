use core::fmt;
use core::str::FromStr;

use skel_core::{Calibration, Point3, VolumeView, VolumeViewMut, neighborhood_mean};

use crate::error::{AnalyzeError, PruneIssue};
use crate::graph::{EdgeId, Graph};
use crate::trees::Tree;

/// How a cycle is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PruneMode {
    #[default]
    None,
    /// Cut the cycle branch with the fewest slabs in its middle.
    ShortestBranch,
    /// Cut the darkest slab voxel of the whole cycle.
    LowestIntensityVoxel,
    /// Cut the darkest slab of the cycle branch with the lowest mean
    /// intensity.
    LowestIntensityBranch,
}

impl PruneMode {
    pub const ALL: [PruneMode; 4] = [
        PruneMode::None,
        PruneMode::ShortestBranch,
        PruneMode::LowestIntensityVoxel,
        PruneMode::LowestIntensityBranch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PruneMode::None => "none",
            PruneMode::ShortestBranch => "shortest-branch",
            PruneMode::LowestIntensityVoxel => "lowest-intensity-voxel",
            PruneMode::LowestIntensityBranch => "lowest-intensity-branch",
        }
    }

    pub fn is_enabled(self) -> bool {
        self != PruneMode::None
    }

    pub fn needs_intensity(self) -> bool {
        matches!(
            self,
            PruneMode::LowestIntensityVoxel | PruneMode::LowestIntensityBranch
        )
    }
}

impl fmt::Display for PruneMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PruneMode {
    type Err = AnalyzeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        PruneMode::ALL
            .into_iter()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| AnalyzeError::UnknownPruneMode(s.to_string()))
    }
}

/// Local mean intensity around skeleton voxels.
#[derive(Debug, Clone, Copy)]
pub struct IntensitySampler<'a> {
    volume: VolumeView<'a, f32>,
    radius: [usize; 3],
}

impl<'a> IntensitySampler<'a> {
    /// Neighborhood sized from the calibration, see
    /// [`Calibration::neighborhood_radius`].
    pub fn new(volume: VolumeView<'a, f32>, calibration: &Calibration) -> Self {
        Self::with_radius(volume, calibration.neighborhood_radius())
    }

    pub fn with_radius(volume: VolumeView<'a, f32>, radius: [usize; 3]) -> Self {
        Self { volume, radius }
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        self.volume.dims()
    }

    pub fn mean_at(&self, p: Point3) -> f64 {
        neighborhood_mean(&self.volume, p, self.radius)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PruneOutcome {
    /// Zeroed voxels, in pruning order.
    pub removed: Vec<Point3>,
    pub issues: Vec<PruneIssue>,
    /// Cycles found, ring trees included.
    pub cycles: usize,
}

enum Policy<'a> {
    ShortestBranch,
    LowestIntensityVoxel(IntensitySampler<'a>),
    LowestIntensityBranch(IntensitySampler<'a>),
}

/// Opens every cycle of every tree by zeroing one skeleton voxel per cycle.
///
/// Ring trees lose their starting slab. Other trees are searched depth first
/// from their root and each back edge's cycle is cut according to `mode`.
/// `graphs` must be parallel to `trees`; their search state is overwritten.
pub fn prune_cycles(
    skeleton: &mut VolumeViewMut<'_, u8>,
    trees: &[Tree],
    graphs: &mut [Graph],
    mode: PruneMode,
    intensity: Option<IntensitySampler<'_>>,
) -> Result<PruneOutcome, AnalyzeError> {
    let policy = match (mode, intensity) {
        (PruneMode::None, _) => return Ok(PruneOutcome::default()),
        (PruneMode::ShortestBranch, _) => Policy::ShortestBranch,
        (PruneMode::LowestIntensityVoxel, Some(s)) => Policy::LowestIntensityVoxel(s),
        (PruneMode::LowestIntensityBranch, Some(s)) => Policy::LowestIntensityBranch(s),
        (mode, None) => return Err(AnalyzeError::MissingIntensity { mode }),
    };

    let mut outcome = PruneOutcome::default();
    for (tree, graph) in trees.iter().zip(graphs.iter_mut()) {
        if let Some(s) = tree.starting_slab {
            outcome.cycles += 1;
            remove_voxel(skeleton, s, &mut outcome);
            continue;
        }

        for back in graph.depth_first_search() {
            outcome.cycles += 1;
            let cycle = graph.cycle_edges(back);
            let tree_index = usize::from(tree.id);
            let cut = match &policy {
                Policy::ShortestBranch => shortest_branch_cut(graph, &cycle),
                Policy::LowestIntensityVoxel(sampler) => {
                    lowest_voxel_cut(graph, &cycle, sampler, tree_index, &mut outcome.issues)
                }
                Policy::LowestIntensityBranch(sampler) => {
                    lowest_branch_cut(graph, &cycle, sampler, tree_index, &mut outcome.issues)
                }
            };
            if let Some(p) = cut {
                remove_voxel(skeleton, p, &mut outcome);
            }
        }
    }

    if !outcome.removed.is_empty() {
        tracing::info!(
            mode = %mode,
            cycles = outcome.cycles,
            removed = outcome.removed.len(),
            "pruned cycles"
        );
    }
    Ok(outcome)
}

fn remove_voxel(skeleton: &mut VolumeViewMut<'_, u8>, p: Point3, outcome: &mut PruneOutcome) {
    if skeleton.get(p).is_some_and(|&v| v != 0) && skeleton.set(p, 0) {
        outcome.removed.push(p);
    }
}

fn shortest_branch_cut(graph: &Graph, cycle: &[EdgeId]) -> Option<Point3> {
    let mut best = *cycle.first()?;
    for &e in &cycle[1..] {
        if graph.edges[e].slabs.len() < graph.edges[best].slabs.len() {
            best = e;
        }
    }

    let edge = &graph.edges[best];
    match edge.slabs.len() {
        0 => graph.vertices[edge.v1].first_point(),
        n => Some(edge.slabs[n / 2]),
    }
}

fn lowest_voxel_cut(
    graph: &Graph,
    cycle: &[EdgeId],
    sampler: &IntensitySampler<'_>,
    tree: usize,
    issues: &mut Vec<PruneIssue>,
) -> Option<Point3> {
    let mut darkest: Option<(Point3, f64)> = None;
    for &e in cycle {
        for &p in &graph.edges[e].slabs {
            let mean = sampler.mean_at(p);
            if darkest.is_none_or(|(_, d)| mean < d) {
                darkest = Some((p, mean));
            }
        }
    }

    if let Some((p, _)) = darkest {
        return Some(p);
    }

    let vertex = graph.vertices[graph.edges[*cycle.first()?].v1].first_point()?;
    let issue = PruneIssue::CycleWithoutSlabs { tree, vertex };
    tracing::error!("{issue}");
    issues.push(issue);
    Some(vertex)
}

fn lowest_branch_cut(
    graph: &Graph,
    cycle: &[EdgeId],
    sampler: &IntensitySampler<'_>,
    tree: usize,
    issues: &mut Vec<PruneIssue>,
) -> Option<Point3> {
    // (edge, mean over the branch, darkest slab)
    let mut best: Option<(EdgeId, f64, Option<Point3>)> = None;

    for &e in cycle {
        let edge = &graph.edges[e];
        let mut sum = 0.0;
        let mut darkest: Option<(Point3, f64)> = None;
        for &p in &edge.slabs {
            let mean = sampler.mean_at(p);
            sum += mean;
            if darkest.is_none_or(|(_, d)| mean < d) {
                darkest = Some((p, mean));
            }
        }

        let ends = graph.vertices[edge.v1]
            .points
            .iter()
            .chain(&graph.vertices[edge.v2].points);
        let mut count = edge.slabs.len();
        for &p in ends {
            sum += sampler.mean_at(p);
            count += 1;
        }
        if count == 0 {
            continue;
        }

        let mean = sum / count as f64;
        if best.is_none_or(|(_, m, _)| mean < m) {
            best = Some((e, mean, darkest.map(|(p, _)| p)));
        }
    }

    let (e, _, darkest) = best?;
    if darkest.is_some() {
        return darkest;
    }

    let vertex = graph.vertices[graph.edges[e].v1].first_point()?;
    let issue = PruneIssue::BranchWithoutSlabs { tree, vertex };
    tracing::error!("{issue}");
    issues.push(issue);
    Some(vertex)
}
