use skel_core::{Point3, Volume, VolumeView};

/// Per-phase visit marks over the skeleton extent.
///
/// Each traversal phase creates its own instance, so no phase can observe
/// another phase's marks. Coordinates outside the volume read as visited.
#[derive(Debug, Clone)]
pub struct VisitedFlags {
    flags: Volume<bool>,
}

impl VisitedFlags {
    pub fn new((width, height, depth): (usize, usize, usize)) -> Self {
        Self {
            flags: Volume::new_fill(width, height, depth, false),
        }
    }

    pub fn is_visited(&self, p: Point3) -> bool {
        self.flags.get(p).copied().unwrap_or(true)
    }

    pub fn mark(&mut self, p: Point3) {
        if let Some(v) = self.flags.get_mut(p) {
            *v = true;
        }
    }

    /// First unvisited foreground neighbor of `p`, in neighbor-offset order.
    pub fn next_unvisited(&self, skeleton: &VolumeView<'_, u8>, p: Point3) -> Option<Point3> {
        self.next_unvisited_where(skeleton, p, |_| true)
    }

    pub fn next_unvisited_where(
        &self,
        skeleton: &VolumeView<'_, u8>,
        p: Point3,
        accept: impl Fn(Point3) -> bool,
    ) -> Option<Point3> {
        p.neighbors()
            .find(|&q| is_foreground(skeleton, q) && !self.is_visited(q) && accept(q))
    }

    /// Floods the 26-connected foreground region reachable from `seed`
    /// through voxels accepted by `accept`, calling `on_visit` in discovery
    /// order (seed first).
    ///
    /// A voxel stays on the worklist until all its unvisited accepted
    /// neighbors are exhausted, so junctions with many branches are fully
    /// expanded. Returns the number of voxels visited; an already visited
    /// seed yields 0.
    pub fn flood_fill(
        &mut self,
        skeleton: &VolumeView<'_, u8>,
        seed: Point3,
        accept: impl Fn(Point3) -> bool,
        mut on_visit: impl FnMut(Point3),
    ) -> usize {
        if self.is_visited(seed) {
            return 0;
        }

        self.mark(seed);
        on_visit(seed);
        let mut count = 1;

        let mut worklist = vec![seed];
        while let Some(&p) = worklist.last() {
            match self.next_unvisited_where(skeleton, p, &accept) {
                Some(q) => {
                    self.mark(q);
                    on_visit(q);
                    count += 1;
                    worklist.push(q);
                }
                None => {
                    worklist.pop();
                }
            }
        }

        count
    }
}

#[inline]
pub(crate) fn is_foreground(skeleton: &VolumeView<'_, u8>, p: Point3) -> bool {
    skeleton.get(p).is_some_and(|&v| v != 0)
}
