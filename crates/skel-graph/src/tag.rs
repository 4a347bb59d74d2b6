use skel_core::{Point3, Volume, VolumeView};

use crate::visited::is_foreground;

/// Class of a foreground voxel, decided by its count of foreground
/// 26-neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Fewer than two neighbors.
    EndPoint,
    /// More than two neighbors.
    Junction,
    /// Exactly two neighbors.
    Slab,
}

impl Tag {
    pub const END_POINT_CODE: u8 = 30;
    pub const JUNCTION_CODE: u8 = 70;
    pub const SLAB_CODE: u8 = 127;

    pub fn from_neighbor_count(count: usize) -> Self {
        match count {
            0 | 1 => Tag::EndPoint,
            2 => Tag::Slab,
            _ => Tag::Junction,
        }
    }

    /// Gray value used when the tags are exported as an 8-bit volume.
    pub fn code(self) -> u8 {
        match self {
            Tag::EndPoint => Self::END_POINT_CODE,
            Tag::Junction => Self::JUNCTION_CODE,
            Tag::Slab => Self::SLAB_CODE,
        }
    }
}

/// Tag volume plus the global voxel lists, each in z, y, x scan order.
#[derive(Debug, Clone, PartialEq)]
pub struct Tagging {
    pub tags: Volume<Option<Tag>>,
    pub end_points: Vec<Point3>,
    pub junctions: Vec<Point3>,
    pub slabs: Vec<Point3>,
}

impl Tagging {
    #[inline]
    pub fn tag(&self, p: Point3) -> Option<Tag> {
        self.tags.get(p).copied().flatten()
    }

    #[inline]
    pub fn is(&self, p: Point3, tag: Tag) -> bool {
        self.tag(p) == Some(tag)
    }

    pub fn num_foreground(&self) -> usize {
        self.end_points.len() + self.junctions.len() + self.slabs.len()
    }

    /// Tags as gray codes, background stays 0.
    pub fn to_codes(&self) -> Volume<u8> {
        let (w, h, d) = self.tags.dims();
        let mut codes = Volume::new_fill(w, h, d, 0u8);
        for (code, tag) in codes.data_mut().iter_mut().zip(self.tags.data()) {
            if let Some(t) = tag {
                *code = t.code();
            }
        }
        codes
    }
}

pub fn count_foreground_neighbors(skeleton: &VolumeView<'_, u8>, p: Point3) -> usize {
    p.neighbors().filter(|&q| is_foreground(skeleton, q)).count()
}

/// Classifies every foreground voxel of `skeleton`.
pub fn tag_skeleton(skeleton: &VolumeView<'_, u8>) -> Tagging {
    let (w, h, d) = skeleton.dims();
    let mut tags = Volume::new_fill(w, h, d, None);
    let mut end_points = Vec::new();
    let mut junctions = Vec::new();
    let mut slabs = Vec::new();

    for (idx, &v) in skeleton.data().iter().enumerate() {
        if v == 0 {
            continue;
        }
        let p = skeleton.point_at(idx);
        let tag = Tag::from_neighbor_count(count_foreground_neighbors(skeleton, p));
        match tag {
            Tag::EndPoint => end_points.push(p),
            Tag::Junction => junctions.push(p),
            Tag::Slab => slabs.push(p),
        }
        if let Some(t) = tags.get_mut(p) {
            *t = Some(tag);
        }
    }

    tracing::debug!(
        end_points = end_points.len(),
        junctions = junctions.len(),
        slabs = slabs.len(),
        "tagged skeleton"
    );

    Tagging {
        tags,
        end_points,
        junctions,
        slabs,
    }
}

#[cfg(test)]
mod tests {
    use skel_core::Point3;

    use super::{Tag, tag_skeleton};
    use crate::fixtures;

    #[test]
    fn line_has_two_end_points() {
        let vol = fixtures::line_x(5);
        let tagging = tag_skeleton(&vol.as_view());

        assert_eq!(
            tagging.end_points,
            vec![Point3::new(1, 1, 0), Point3::new(5, 1, 0)]
        );
        assert!(tagging.junctions.is_empty());
        assert_eq!(tagging.slabs.len(), 3);
        assert_eq!(tagging.tag(Point3::new(3, 1, 0)), Some(Tag::Slab));
        assert_eq!(tagging.tag(Point3::new(0, 0, 0)), None);
    }

    #[test]
    fn isolated_voxel_is_end_point() {
        let vol = fixtures::volume_with((3, 3, 3), &[(1, 1, 1)]);
        let tagging = tag_skeleton(&vol.as_view());
        assert_eq!(tagging.end_points, vec![Point3::new(1, 1, 1)]);
    }

    #[test]
    fn cross_center_is_junction() {
        let vol = fixtures::x_shape();
        let tagging = tag_skeleton(&vol.as_view());

        assert_eq!(tagging.junctions, vec![Point3::new(3, 3, 0)]);
        assert_eq!(tagging.end_points.len(), 4);
        assert_eq!(tagging.slabs.len(), 4);
    }

    #[test]
    fn lists_follow_z_then_y_then_x() {
        let vol = fixtures::volume_with((4, 4, 2), &[(3, 0, 1), (0, 3, 0), (2, 0, 0)]);
        let tagging = tag_skeleton(&vol.as_view());
        assert_eq!(
            tagging.end_points,
            vec![
                Point3::new(2, 0, 0),
                Point3::new(0, 3, 0),
                Point3::new(3, 0, 1)
            ]
        );
    }

    #[test]
    fn codes_export() {
        let vol = fixtures::line_x(3);
        let tagging = tag_skeleton(&vol.as_view());
        let exported = tagging.to_codes();

        assert_eq!(exported.dims(), (5, 3, 1));
        assert_eq!(exported.get(Point3::new(1, 1, 0)), Some(&Tag::END_POINT_CODE));
        assert_eq!(exported.get(Point3::new(2, 1, 0)), Some(&Tag::SLAB_CODE));
        assert_eq!(exported.get(Point3::new(0, 0, 0)), Some(&0));
    }

    #[test]
    fn codes_cover_every_tag() {
        let vol = fixtures::x_shape();
        let tagging = tag_skeleton(&vol.as_view());
        let exported = tagging.to_codes();

        assert_eq!(exported.dims(), vol.dims());
        assert_eq!(exported.get(Point3::new(3, 3, 0)), Some(&Tag::JUNCTION_CODE));
        assert_eq!(exported.get(Point3::new(1, 1, 0)), Some(&Tag::END_POINT_CODE));
        assert_eq!(exported.get(Point3::new(2, 2, 0)), Some(&Tag::SLAB_CODE));
        let foreground = exported.data().iter().filter(|&&c| c != 0).count();
        assert_eq!(foreground, tagging.num_foreground());
    }
}
