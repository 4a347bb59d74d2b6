//! Property-based tests for the skeleton analysis.
//!
//! Random sparse voxel volumes are not real skeletons, which makes them good
//! at reaching odd junction/slab configurations the unit fixtures miss.

use std::collections::HashSet;

use proptest::prelude::*;
use skel_core::{Calibration, Point3, Volume};
use skel_graph::{
    AnalyzeConfig, PruneMode, Tag, analyze, analyze_skeleton, assemble_statistics,
    count_foreground_neighbors,
};

// ============================================================================
// Generators
// ============================================================================

/// Small volume with roughly a third of the voxels set.
fn volume_strategy() -> impl Strategy<Value = Volume<u8>> {
    (2usize..8, 2usize..8, 1usize..4).prop_flat_map(|(w, h, d)| {
        prop::collection::vec(prop::bool::weighted(0.35), w * h * d).prop_map(move |bits| {
            let data = bits.into_iter().map(|b| if b { 255 } else { 0 }).collect();
            Volume::from_vec(w, h, d, data).expect("generated dims")
        })
    })
}

fn foreground(vol: &Volume<u8>) -> Vec<Point3> {
    let view = vol.as_view();
    (0..view.data().len())
        .filter(|&i| view.data()[i] != 0)
        .map(|i| view.point_at(i))
        .collect()
}

// ============================================================================
// Property-based tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Tags follow the foreground neighbor count.
    #[test]
    fn tags_match_neighbor_counts(vol in volume_strategy()) {
        let result = analyze(&vol.as_view()).expect("analyze");
        for p in foreground(&vol) {
            let n = count_foreground_neighbors(&vol.as_view(), p);
            let expected = match n {
                0 | 1 => Tag::EndPoint,
                2 => Tag::Slab,
                _ => Tag::Junction,
            };
            prop_assert_eq!(result.tagging.tag(p), Some(expected));
        }
        prop_assert_eq!(result.tagging.num_foreground(), foreground(&vol).len());
    }

    /// Every foreground voxel belongs to exactly one tree and neighbors share it.
    #[test]
    fn trees_partition_foreground(vol in volume_strategy()) {
        let result = analyze(&vol.as_view()).expect("analyze");
        let n_trees = result.num_trees();

        for p in foreground(&vol) {
            let label = *result.labels.get(p).expect("in bounds");
            prop_assert!(label >= 1 && usize::from(label) <= n_trees);
            for q in p.neighbors() {
                if vol.get(q).is_some_and(|&v| v != 0) {
                    prop_assert_eq!(result.labels.get(q), Some(&label));
                }
            }
        }

        let total: usize = result.trees.iter().map(|t| t.num_voxels()).sum();
        prop_assert_eq!(total, foreground(&vol).len());
        prop_assert!(result.trees.iter().all(|t| t.num_voxels() > 0));
    }

    /// Each slab is traced into exactly one edge of its own tree.
    #[test]
    fn slabs_are_traced_exactly_once(vol in volume_strategy()) {
        let result = analyze(&vol.as_view()).expect("analyze");
        for (tree, graph) in result.trees.iter().zip(&result.graphs) {
            let traced: Vec<Point3> = graph.edges.iter().flat_map(|e| e.slabs.iter().copied()).collect();
            prop_assert_eq!(traced.len(), tree.slabs.len());

            let unique: HashSet<Point3> = traced.iter().copied().collect();
            let expected: HashSet<Point3> = tree.slabs.iter().copied().collect();
            prop_assert_eq!(unique, expected);
        }
    }

    /// Junction voxels sit in exactly one junction vertex.
    #[test]
    fn junction_voxels_in_one_vertex(vol in volume_strategy()) {
        let result = analyze(&vol.as_view()).expect("analyze");
        for (tree, graph) in result.trees.iter().zip(&result.graphs) {
            for &j in &tree.junction_voxels {
                let holders = graph.vertices.iter().filter(|v| v.contains(j)).count();
                prop_assert_eq!(holders, 1);
            }
            prop_assert!(graph.edges.iter().all(|e| e.length > 0.0));
        }
    }

    /// Same input, same output; statistics read twice agree.
    #[test]
    fn analysis_is_deterministic(vol in volume_strategy()) {
        let a = analyze(&vol.as_view()).expect("analyze");
        let b = analyze(&vol.as_view()).expect("analyze");
        prop_assert_eq!(&a, &b);

        for ((tree, graph), stats) in a.trees.iter().zip(&a.graphs).zip(&a.stats) {
            prop_assert_eq!(&assemble_statistics(tree, graph, &a.tagging), stats);
        }
    }

    /// Pruning only removes foreground voxels and never more than one per
    /// cycle found.
    #[test]
    fn pruning_only_clears_foreground(vol in volume_strategy()) {
        let before = analyze(&vol.as_view()).expect("analyze");
        let back_edges: usize = before
            .graphs
            .iter()
            .cloned()
            .map(|mut g| g.depth_first_search().len())
            .sum();
        let rings = before.starting_slabs().len();

        let mut pruned = vol.clone();
        let cfg = AnalyzeConfig {
            prune: PruneMode::ShortestBranch,
            calibration: Calibration::default(),
            verbose: false,
        };
        let after = analyze_skeleton(&mut pruned.as_view_mut(), None, &cfg).expect("analyze");

        prop_assert!(after.pruned.len() <= back_edges + rings);
        for p in &after.pruned {
            prop_assert_eq!(vol.get(*p), Some(&255));
            prop_assert_eq!(pruned.get(*p), Some(&0));
        }
        let cleared = foreground(&vol).len() - foreground(&pruned).len();
        prop_assert_eq!(cleared, after.pruned.len());
    }
}
