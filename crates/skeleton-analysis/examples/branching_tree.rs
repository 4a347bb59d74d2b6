//! Example: analyze a synthetic 3D branching skeleton with one loop.
//!
//! Builds a trunk that splits into two branches, joined halfway by a bridge
//! that closes a loop, then runs the analysis with shortest-branch pruning
//! and prints per-tree statistics and the branch table.
//!
//! Run from the workspace root:
//!   cargo run -p skeleton-analysis --example branching_tree

use anyhow::{Context, Result};
use skeleton_analysis::{
    AnalyzeConfig, Calibration, Point3, PruneMode, Volume, analyze_skeleton,
};

fn draw_line(vol: &mut Volume<u8>, from: Point3, to: Point3) {
    let steps = (to.x - from.x)
        .abs()
        .max((to.y - from.y).abs())
        .max((to.z - from.z).abs());
    for i in 0..=steps {
        let lerp = |a: i32, b: i32| a + (b - a) * i / steps.max(1);
        let p = Point3::new(lerp(from.x, to.x), lerp(from.y, to.y), lerp(from.z, to.z));
        if let Some(v) = vol.get_mut(p) {
            *v = 255;
        }
    }
}

fn main() -> Result<()> {
    let mut vol = Volume::new_fill(40, 40, 24, 0u8);

    let base = Point3::new(20, 36, 12);
    let fork = Point3::new(20, 24, 12);
    let left = Point3::new(8, 8, 6);
    let right = Point3::new(32, 8, 18);
    // Halfway points of both branches, joined below to close a loop.
    let left_mid = Point3::new(14, 16, 9);
    let right_mid = Point3::new(26, 16, 15);

    draw_line(&mut vol, base, fork);
    draw_line(&mut vol, fork, left);
    draw_line(&mut vol, fork, right);
    draw_line(&mut vol, left_mid, right_mid);

    let cfg = AnalyzeConfig {
        prune: PruneMode::ShortestBranch,
        calibration: Calibration::new(0.5, 0.5, 1.0).context("calibration")?,
        verbose: true,
    };
    let analysis =
        analyze_skeleton(&mut vol.as_view_mut(), None, &cfg).context("analyzing skeleton")?;

    println!("trees: {}", analysis.num_trees());
    println!("pruned voxels: {:?}", analysis.pruned);
    for s in &analysis.stats {
        println!(
            "tree {}: {} branches, {} junctions, {} end points, {} voxels, max length {:.2}",
            s.tree,
            s.branches,
            s.junctions,
            s.end_points,
            s.num_voxels(),
            s.maximum_branch_length
        );
    }
    for b in &analysis.branches {
        println!(
            "tree {} length {:.2} from {:?} to {:?} (straight {:.2})",
            b.tree, b.length, b.v1, b.v2, b.euclidean_distance
        );
    }

    Ok(())
}
