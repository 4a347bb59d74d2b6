use crate::geom::Point3;
use crate::volume::VolumeView;

/// Mean value over the box `center ± radius` (per axis), inclusive.
///
/// Voxels outside the volume contribute zero but still count towards the
/// box size, so neighborhoods clipped by the border read darker.
pub fn neighborhood_mean<T: Copy + Into<f64>>(
    vol: &VolumeView<'_, T>,
    center: Point3,
    radius: [usize; 3],
) -> f64 {
    let [rx, ry, rz] = radius.map(|r| r as i32);

    let mut sum = 0.0_f64;
    for dz in -rz..=rz {
        for dy in -ry..=ry {
            for dx in -rx..=rx {
                if let Some(&v) = vol.get(center.offset([dx, dy, dz])) {
                    sum += v.into();
                }
            }
        }
    }

    let n = (2 * radius[0] + 1) * (2 * radius[1] + 1) * (2 * radius[2] + 1);
    sum / n as f64
}

#[cfg(test)]
mod tests {
    use crate::geom::Point3;
    use crate::sample::neighborhood_mean;
    use crate::volume::Volume;

    #[test]
    fn interior_mean_of_a_linear_ramp_is_the_center_value() {
        let mut data = Vec::new();
        for _z in 0..5 {
            for _y in 0..5 {
                for x in 0..5 {
                    data.push(10.0_f32 * x as f32);
                }
            }
        }
        let vol = Volume::from_vec(5, 5, 5, data).expect("valid volume");

        let m = neighborhood_mean(&vol.as_view(), Point3::new(2, 2, 2), [1, 1, 1]);
        assert!((m - 20.0).abs() < 1e-9);
    }

    #[test]
    fn border_voxels_count_as_zero() {
        let vol = Volume::new_fill(3, 3, 1, 27u8);

        let center = neighborhood_mean(&vol.as_view(), Point3::new(1, 1, 0), [1, 1, 1]);
        assert!((center - 9.0).abs() < 1e-9);

        let corner = neighborhood_mean(&vol.as_view(), Point3::new(0, 0, 0), [1, 1, 1]);
        assert!((corner - 4.0).abs() < 1e-9);
    }

    #[test]
    fn anisotropic_radius() {
        let vol = Volume::new_fill(9, 3, 1, 2u8);
        let m = neighborhood_mean(&vol.as_view(), Point3::new(4, 1, 0), [3, 0, 0]);
        assert!((m - 2.0).abs() < 1e-9);
    }
}
