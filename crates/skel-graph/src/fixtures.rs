//! Small synthetic skeletons shared by the unit tests.

use skel_core::{Point3, Volume};

pub(crate) fn volume_with(dims: (usize, usize, usize), points: &[(i32, i32, i32)]) -> Volume<u8> {
    let mut vol = Volume::new_fill(dims.0, dims.1, dims.2, 0u8);
    for &p in points {
        *vol.get_mut(Point3::from(p)).expect("fixture point in bounds") = 255;
    }
    vol
}

/// `len` voxels along x at y = 1, with a one voxel margin.
pub(crate) fn line_x(len: usize) -> Volume<u8> {
    let points: Vec<_> = (1..=len as i32).map(|x| (x, 1, 0)).collect();
    volume_with((len + 2, 3, 1), &points)
}

/// Diagonal cross centered at (3, 3): four arms of two voxels.
pub(crate) fn x_shape() -> Volume<u8> {
    let mut points = vec![(3, 3, 0)];
    for (sx, sy) in [(-1, -1), (1, -1), (-1, 1), (1, 1)] {
        points.push((3 + sx, 3 + sy, 0));
        points.push((3 + 2 * sx, 3 + 2 * sy, 0));
    }
    volume_with((7, 7, 1), &points)
}

/// Eight-voxel closed ring, every voxel a slab.
pub(crate) fn octagon_ring() -> Volume<u8> {
    volume_with(
        (6, 6, 1),
        &[
            (2, 1, 0),
            (3, 1, 0),
            (4, 2, 0),
            (4, 3, 0),
            (3, 4, 0),
            (2, 4, 0),
            (1, 3, 0),
            (1, 2, 0),
        ],
    )
}

/// Sixteen-voxel diamond with corners (6,2), (10,6), (6,10), (2,6).
pub(crate) fn diamond_points() -> Vec<(i32, i32, i32)> {
    let corners: [(i32, i32); 5] = [(6, 2), (10, 6), (6, 10), (2, 6), (6, 2)];
    let mut points = Vec::new();
    for pair in corners.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        let (dx, dy) = ((x1 - x0).signum(), (y1 - y0).signum());
        for i in 0..4 {
            points.push((x0 + i * dx, y0 + i * dy, 0));
        }
    }
    points
}

pub(crate) fn diamond_ring() -> Volume<u8> {
    volume_with((13, 13, 1), &diamond_points())
}

/// Diamond ring with a three voxel tail leaving the east corner, so the
/// corner is a junction closing a loop onto itself.
pub(crate) fn lollipop() -> Volume<u8> {
    let mut points = diamond_points();
    points.extend([(11, 6, 0), (12, 6, 0), (13, 6, 0)]);
    volume_with((16, 13, 1), &points)
}

/// T with a four voxel junction cluster and three arms of four steps.
pub(crate) fn t_shape() -> Volume<u8> {
    let mut points = vec![(4, 5, 0), (5, 5, 0), (6, 5, 0), (5, 6, 0)];
    for i in 0..4 {
        points.push((i, 5, 0));
        points.push((7 + i, 5, 0));
        points.push((5, 7 + i, 0));
    }
    volume_with((11, 11, 1), &points)
}

/// Intensity volume growing by 10 per voxel along x.
pub(crate) fn ramp_x(dims: (usize, usize, usize)) -> Volume<f32> {
    let (w, h, d) = dims;
    let data = (0..w * h * d).map(|i| (i % w) as f32 * 10.0).collect();
    Volume::from_vec(w, h, d, data).expect("ramp dims")
}
