use skel_core::{Point3, VolumeView};

use crate::tag::{Tag, Tagging};
use crate::trees::Tree;
use crate::visited::VisitedFlags;

/// Groups each tree's junction voxels into 26-connected clusters.
///
/// A cluster lists its seed voxel first, then the others in discovery
/// order. The number of clusters is the tree's junction count.
pub fn group_junctions(skeleton: &VolumeView<'_, u8>, tagging: &Tagging, trees: &mut [Tree]) {
    let mut visited = VisitedFlags::new(skeleton.dims());

    for tree in trees.iter_mut() {
        tree.clusters = tree
            .junction_voxels
            .iter()
            .filter_map(|&seed| {
                let mut cluster = Vec::new();
                visited.flood_fill(
                    skeleton,
                    seed,
                    |q| tagging.is(q, Tag::Junction),
                    |p| cluster.push(p),
                );
                (!cluster.is_empty()).then_some(cluster)
            })
            .collect();
    }
}

/// Slab and end-point voxels adjacent to the cluster, counted once per
/// adjacent cluster voxel.
pub fn cluster_branch_count(cluster: &[Point3], tagging: &Tagging) -> usize {
    cluster
        .iter()
        .flat_map(|p| p.neighbors())
        .filter(|&q| matches!(tagging.tag(q), Some(Tag::Slab | Tag::EndPoint)))
        .count()
}

#[cfg(test)]
mod tests {
    use skel_core::Point3;

    use super::{cluster_branch_count, group_junctions};
    use crate::fixtures;
    use crate::tag::tag_skeleton;
    use crate::trees::label_trees;

    #[test]
    fn touching_junction_voxels_form_one_cluster() {
        let vol = fixtures::t_shape();
        let view = vol.as_view();
        let tagging = tag_skeleton(&view);
        let mut labels = label_trees(&view, &tagging).expect("labels");
        group_junctions(&view, &tagging, &mut labels.trees);

        let clusters = &labels.trees[0].clusters;
        assert_eq!(clusters.len(), 1);
        assert_eq!(
            clusters[0],
            vec![
                Point3::new(4, 5, 0),
                Point3::new(5, 5, 0),
                Point3::new(5, 6, 0),
                Point3::new(6, 5, 0)
            ]
        );
        assert_eq!(cluster_branch_count(&clusters[0], &tagging), 3);
    }

    #[test]
    fn distant_junctions_stay_apart() {
        // H shape: two junctions joined by a bar.
        let mut points = Vec::new();
        for y in 1..=5 {
            points.push((1, y, 0));
            points.push((7, y, 0));
        }
        for x in 2..=6 {
            points.push((x, 3, 0));
        }
        let vol = fixtures::volume_with((9, 7, 1), &points);
        let view = vol.as_view();
        let tagging = tag_skeleton(&view);
        let mut labels = label_trees(&view, &tagging).expect("labels");
        group_junctions(&view, &tagging, &mut labels.trees);

        let tree = &labels.trees[0];
        assert_eq!(tree.clusters.len(), 2);
        assert!(tree.clusters.iter().all(|c| c.len() == 4));
        assert!(
            tree.clusters
                .iter()
                .all(|c| cluster_branch_count(c, &tagging) == 3)
        );
    }
}
