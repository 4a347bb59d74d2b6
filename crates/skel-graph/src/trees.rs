use skel_core::{Point3, Volume, VolumeView};

use crate::error::AnalyzeError;
use crate::tag::Tagging;
use crate::visited::VisitedFlags;

/// Tree label; 0 marks background, trees are numbered from 1.
pub type TreeId = u16;

/// Largest number of trees a [`TreeId`] label volume can hold.
pub const MAX_TREES: usize = TreeId::MAX as usize - 1;

/// One 26-connected skeleton component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    pub id: TreeId,
    pub end_points: Vec<Point3>,
    pub junction_voxels: Vec<Point3>,
    pub slabs: Vec<Point3>,
    /// Junction clusters, filled by [`crate::group_junctions`].
    pub clusters: Vec<Vec<Point3>>,
    /// Set when the tree was seeded from a slab, i.e. it has no end points
    /// and no junctions and is a closed ring.
    pub starting_slab: Option<Point3>,
}

impl Tree {
    pub fn num_voxels(&self) -> usize {
        self.end_points.len() + self.junction_voxels.len() + self.slabs.len()
    }

    pub fn is_ring(&self) -> bool {
        self.starting_slab.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeLabels {
    pub labels: Volume<TreeId>,
    pub trees: Vec<Tree>,
}

impl TreeLabels {
    pub fn label(&self, p: Point3) -> TreeId {
        self.labels.get(p).copied().unwrap_or(0)
    }

    pub fn tree_of(&self, p: Point3) -> Option<&Tree> {
        match self.label(p) {
            0 => None,
            id => self.trees.get(usize::from(id) - 1),
        }
    }
}

/// Labels the connected components of the skeleton.
///
/// Seeds are taken from the end points first, then the junctions, then the
/// slabs, so a tree seeded from a slab is a pure ring. Tree lists keep the
/// global scan order of `tagging`.
pub fn label_trees(
    skeleton: &VolumeView<'_, u8>,
    tagging: &Tagging,
) -> Result<TreeLabels, AnalyzeError> {
    let (w, h, d) = skeleton.dims();
    let mut labels: Volume<TreeId> = Volume::new_fill(w, h, d, 0);
    let mut visited = VisitedFlags::new(skeleton.dims());
    let mut trees: Vec<Tree> = Vec::new();

    let seeds = tagging
        .end_points
        .iter()
        .chain(&tagging.junctions)
        .map(|&p| (p, false))
        .chain(tagging.slabs.iter().map(|&p| (p, true)));

    for (seed, from_slab) in seeds {
        if visited.is_visited(seed) {
            continue;
        }
        if trees.len() == MAX_TREES {
            return Err(AnalyzeError::TooManyTrees { limit: MAX_TREES });
        }

        let id = TreeId::try_from(trees.len() + 1)
            .map_err(|_| AnalyzeError::TooManyTrees { limit: MAX_TREES })?;
        visited.flood_fill(
            skeleton,
            seed,
            |_| true,
            |p| {
                if let Some(l) = labels.get_mut(p) {
                    *l = id;
                }
            },
        );

        trees.push(Tree {
            id,
            starting_slab: from_slab.then_some(seed),
            ..Tree::default()
        });
    }

    let index_of = |p: Point3| -> Option<usize> {
        match labels.get(p).copied() {
            Some(0) | None => None,
            Some(id) => Some(usize::from(id) - 1),
        }
    };
    for &p in &tagging.end_points {
        if let Some(i) = index_of(p) {
            trees[i].end_points.push(p);
        }
    }
    for &p in &tagging.junctions {
        if let Some(i) = index_of(p) {
            trees[i].junction_voxels.push(p);
        }
    }
    for &p in &tagging.slabs {
        if let Some(i) = index_of(p) {
            trees[i].slabs.push(p);
        }
    }

    tracing::debug!(trees = trees.len(), "labelled trees");

    Ok(TreeLabels { labels, trees })
}

#[cfg(test)]
mod tests {
    use skel_core::{Point3, Volume};

    use super::{MAX_TREES, label_trees};
    use crate::error::AnalyzeError;
    use crate::fixtures;
    use crate::tag::tag_skeleton;

    #[test]
    fn separate_components_get_separate_trees() {
        let vol = fixtures::volume_with(
            (8, 3, 1),
            &[(0, 1, 0), (1, 1, 0), (2, 1, 0), (5, 1, 0), (6, 1, 0)],
        );
        let view = vol.as_view();
        let tagging = tag_skeleton(&view);
        let labels = label_trees(&view, &tagging).expect("labels");

        assert_eq!(labels.trees.len(), 2);
        assert_eq!(labels.label(Point3::new(1, 1, 0)), 1);
        assert_eq!(labels.label(Point3::new(6, 1, 0)), 2);
        assert_eq!(labels.label(Point3::new(4, 1, 0)), 0);

        let first = &labels.trees[0];
        assert_eq!(first.end_points.len(), 2);
        assert_eq!(first.slabs, vec![Point3::new(1, 1, 0)]);
        assert_eq!(first.num_voxels(), 3);
        assert!(!first.is_ring());
        assert_eq!(labels.trees[1].num_voxels(), 2);
    }

    #[test]
    fn ring_is_seeded_from_first_slab() {
        let vol = fixtures::octagon_ring();
        let view = vol.as_view();
        let tagging = tag_skeleton(&view);
        let labels = label_trees(&view, &tagging).expect("labels");

        assert_eq!(labels.trees.len(), 1);
        let tree = &labels.trees[0];
        assert_eq!(tree.starting_slab, Some(Point3::new(2, 1, 0)));
        assert_eq!(tree.slabs.len(), 8);
        assert!(tree.end_points.is_empty());
        assert!(tree.junction_voxels.is_empty());
    }

    #[test]
    fn junction_voxels_are_assigned_to_their_tree() {
        let vol = fixtures::t_shape();
        let view = vol.as_view();
        let tagging = tag_skeleton(&view);
        let labels = label_trees(&view, &tagging).expect("labels");

        assert_eq!(labels.trees.len(), 1);
        let tree = labels.tree_of(Point3::new(5, 6, 0)).expect("tree");
        assert_eq!(tree.junction_voxels.len(), 4);
        assert_eq!(tree.end_points.len(), 3);
        assert_eq!(tree.slabs.len(), 9);
        assert_eq!(tree.starting_slab, None);
    }

    #[test]
    fn label_overflow_is_fatal() {
        // 64 * 64 * 16 isolated voxels, more than the label range holds.
        let (w, h, d) = (128usize, 128usize, 32usize);
        let mut vol = Volume::new_fill(w, h, d, 0u8);
        for z in (0..d).step_by(2) {
            for y in (0..h).step_by(2) {
                for x in (0..w).step_by(2) {
                    let p = Point3::new(x as i32, y as i32, z as i32);
                    *vol.get_mut(p).expect("in bounds") = 1;
                }
            }
        }
        let view = vol.as_view();
        let tagging = tag_skeleton(&view);
        assert_eq!(tagging.end_points.len(), MAX_TREES + 2);

        let err = label_trees(&view, &tagging).unwrap_err();
        assert_eq!(err, AnalyzeError::TooManyTrees { limit: MAX_TREES });
    }
}
