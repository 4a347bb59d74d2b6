use skel_core::Calibration;

use crate::graph::Graph;
use crate::junctions::cluster_branch_count;
use crate::tag::Tagging;
use crate::trees::{Tree, TreeId};

/// Per-tree skeleton measurements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeStats {
    pub tree: TreeId,
    pub branches: usize,
    /// Junction clusters.
    pub junctions: usize,
    pub end_points: usize,
    pub junction_voxels: usize,
    pub slabs: usize,
    /// Clusters touching exactly three slab/end-point voxels.
    pub triple_points: usize,
    /// Clusters touching exactly four slab/end-point voxels.
    pub quadruple_points: usize,
    pub average_branch_length: f64,
    pub maximum_branch_length: f64,
}

impl TreeStats {
    pub fn num_voxels(&self) -> usize {
        self.end_points + self.junction_voxels + self.slabs
    }
}

/// Reads the statistics of one tree off its finished graph. Calling it again
/// on the same inputs gives the same values.
pub fn assemble_statistics(tree: &Tree, graph: &Graph, tagging: &Tagging) -> TreeStats {
    let mut stats = TreeStats {
        tree: tree.id,
        branches: graph.edges.len(),
        junctions: tree.clusters.len(),
        end_points: tree.end_points.len(),
        junction_voxels: tree.junction_voxels.len(),
        slabs: tree.slabs.len(),
        average_branch_length: graph.average_branch_length(),
        maximum_branch_length: graph.maximum_branch_length(),
        ..TreeStats::default()
    };

    for cluster in &tree.clusters {
        match cluster_branch_count(cluster, tagging) {
            3 => stats.triple_points += 1,
            4 => stats.quadruple_points += 1,
            _ => {}
        }
    }
    stats
}

/// One row of the branch table.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchInfo {
    pub tree: TreeId,
    pub length: f64,
    /// Calibrated position of the first point of each end vertex.
    pub v1: [f64; 3],
    pub v2: [f64; 3],
    /// Straight-line distance between `v1` and `v2`.
    pub euclidean_distance: f64,
}

/// Every branch of every tree; within a tree sorted by length, longest
/// first.
pub fn branch_table(trees: &[Tree], graphs: &[Graph], calibration: &Calibration) -> Vec<BranchInfo> {
    let mut rows = Vec::new();
    for (tree, graph) in trees.iter().zip(graphs) {
        let start = rows.len();
        for edge in &graph.edges {
            let (Some(a), Some(b)) = (
                graph.vertices[edge.v1].first_point(),
                graph.vertices[edge.v2].first_point(),
            ) else {
                continue;
            };
            rows.push(BranchInfo {
                tree: tree.id,
                length: edge.length,
                v1: calibration.to_physical(a),
                v2: calibration.to_physical(b),
                euclidean_distance: calibration.distance(a, b),
            });
        }
        rows[start..].sort_by(|x, y| y.length.total_cmp(&x.length));
    }
    rows
}
