//! Foundational primitives for skeleton topology analysis.
//!
//! ## Volumes
//! Volumes are contiguous, `x`-fastest buffers: `z` slices of `y` rows of
//! `x` voxels. A 2D image is a volume of depth 1. [`VolumeView`] and
//! [`VolumeViewMut`] borrow host buffers without copying.
//!
//! ## Coordinates
//! [`Point3`] holds signed integer voxel coordinates so neighbor offsets can
//! step outside the volume; reads outside the extent yield `None` (or zero
//! through [`VolumeView::value_or_zero`]).
//!
//! ## Calibration
//! [`Calibration`] carries per-axis physical spacing. Distances and
//! neighborhood sizes are computed in physical units.

mod calibration;
mod error;
mod geom;
mod sample;
mod volume;

pub use calibration::Calibration;
pub use error::Error;
pub use geom::{NEIGHBORS_26, Point3};
pub use sample::neighborhood_mean;
pub use volume::{Volume, VolumeView, VolumeViewMut, to_f32, to_f32_u16};
