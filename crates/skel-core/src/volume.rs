use crate::Error;
use crate::geom::Point3;

#[derive(Debug, Clone, PartialEq)]
pub struct Volume<T> {
    width: usize,
    height: usize,
    depth: usize,
    data: Vec<T>,
}

impl<T> Volume<T> {
    pub fn from_vec(width: usize, height: usize, depth: usize, data: Vec<T>) -> Result<Self, Error> {
        let expected = voxel_count(width, height, depth).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            depth,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.depth)
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    pub fn get(&self, p: Point3) -> Option<&T> {
        let idx = linear_index(p, self.width, self.height, self.depth)?;
        self.data.get(idx)
    }

    pub fn get_mut(&mut self, p: Point3) -> Option<&mut T> {
        let idx = linear_index(p, self.width, self.height, self.depth)?;
        self.data.get_mut(idx)
    }

    /// Row `y` of slice `z`.
    pub fn row(&self, y: usize, z: usize) -> &[T] {
        assert!(y < self.height && z < self.depth, "row index out of bounds");
        let start = (z * self.height + y) * self.width;
        &self.data[start..start + self.width]
    }

    pub fn as_view(&self) -> VolumeView<'_, T> {
        VolumeView {
            width: self.width,
            height: self.height,
            depth: self.depth,
            data: &self.data,
        }
    }

    pub fn as_view_mut(&mut self) -> VolumeViewMut<'_, T> {
        VolumeViewMut {
            width: self.width,
            height: self.height,
            depth: self.depth,
            data: &mut self.data,
        }
    }
}

impl<T: Clone> Volume<T> {
    pub fn new_fill(width: usize, height: usize, depth: usize, value: T) -> Self {
        let len = voxel_count(width, height, depth).expect("volume size overflow");
        Self {
            width,
            height,
            depth,
            data: vec![value; len],
        }
    }
}

/// Borrowed, contiguous `x`-fastest volume (`z` slices of `y` rows).
#[derive(Debug, Clone, Copy)]
pub struct VolumeView<'a, T> {
    width: usize,
    height: usize,
    depth: usize,
    data: &'a [T],
}

impl<'a, T> VolumeView<'a, T> {
    pub fn from_slice(
        width: usize,
        height: usize,
        depth: usize,
        data: &'a [T],
    ) -> Result<Self, Error> {
        let expected = voxel_count(width, height, depth).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() < expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            depth,
            data: &data[..expected],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.depth)
    }

    pub fn data(&self) -> &'a [T] {
        self.data
    }

    pub fn contains(&self, p: Point3) -> bool {
        linear_index(p, self.width, self.height, self.depth).is_some()
    }

    pub fn index_of(&self, p: Point3) -> Option<usize> {
        linear_index(p, self.width, self.height, self.depth)
    }

    pub fn get(&self, p: Point3) -> Option<&'a T> {
        let idx = linear_index(p, self.width, self.height, self.depth)?;
        self.data.get(idx)
    }

    /// All voxels of slice `z`, row-major.
    pub fn slice(&self, z: usize) -> &'a [T] {
        assert!(z < self.depth, "slice index out of bounds");
        let len = self.width * self.height;
        &self.data[z * len..(z + 1) * len]
    }

    pub fn point_at(&self, idx: usize) -> Point3 {
        point_at(idx, self.width, self.height)
    }
}

impl<T: Copy + Default> VolumeView<'_, T> {
    /// Value at `p`, or `T::default()` (zero) outside the volume.
    pub fn value_or_zero(&self, p: Point3) -> T {
        self.get(p).copied().unwrap_or_default()
    }
}

#[derive(Debug)]
pub struct VolumeViewMut<'a, T> {
    width: usize,
    height: usize,
    depth: usize,
    data: &'a mut [T],
}

impl<'a, T> VolumeViewMut<'a, T> {
    pub fn from_slice_mut(
        width: usize,
        height: usize,
        depth: usize,
        data: &'a mut [T],
    ) -> Result<Self, Error> {
        let expected = voxel_count(width, height, depth).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() < expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            depth,
            data: &mut data[..expected],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.depth)
    }

    pub fn get(&self, p: Point3) -> Option<&T> {
        let idx = linear_index(p, self.width, self.height, self.depth)?;
        self.data.get(idx)
    }

    pub fn get_mut(&mut self, p: Point3) -> Option<&mut T> {
        let idx = linear_index(p, self.width, self.height, self.depth)?;
        self.data.get_mut(idx)
    }

    /// Writes `value` at `p`. Returns `false` (and writes nothing) when `p`
    /// lies outside the volume.
    pub fn set(&mut self, p: Point3, value: T) -> bool {
        match self.get_mut(p) {
            Some(v) => {
                *v = value;
                true
            }
            None => false,
        }
    }

    pub fn as_view(&self) -> VolumeView<'_, T> {
        VolumeView {
            width: self.width,
            height: self.height,
            depth: self.depth,
            data: self.data,
        }
    }
}

fn voxel_count(width: usize, height: usize, depth: usize) -> Option<usize> {
    width.checked_mul(height)?.checked_mul(depth)
}

#[inline]
fn linear_index(p: Point3, width: usize, height: usize, depth: usize) -> Option<usize> {
    if p.x < 0 || p.y < 0 || p.z < 0 {
        return None;
    }

    let (x, y, z) = (p.x as usize, p.y as usize, p.z as usize);
    if x >= width || y >= height || z >= depth {
        return None;
    }

    Some((z * height + y) * width + x)
}

#[inline]
fn point_at(idx: usize, width: usize, height: usize) -> Point3 {
    let plane = width * height;
    let z = idx / plane;
    let rem = idx % plane;
    Point3::new((rem % width) as i32, (rem / width) as i32, z as i32)
}

pub fn to_f32(vol: &VolumeView<'_, u8>) -> Volume<f32> {
    Volume {
        width: vol.width(),
        height: vol.height(),
        depth: vol.depth(),
        data: vol.data().iter().map(|&v| f32::from(v)).collect(),
    }
}

pub fn to_f32_u16(vol: &VolumeView<'_, u16>) -> Volume<f32> {
    Volume {
        width: vol.width(),
        height: vol.height(),
        depth: vol.depth(),
        data: vol.data().iter().map(|&v| f32::from(v)).collect(),
    }
}
