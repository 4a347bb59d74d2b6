use crate::Error;
use crate::geom::Point3;

/// Physical voxel spacing along x, y and z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    sx: f64,
    sy: f64,
    sz: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            sx: 1.0,
            sy: 1.0,
            sz: 1.0,
        }
    }
}

impl Calibration {
    pub fn new(sx: f64, sy: f64, sz: f64) -> Result<Self, Error> {
        let valid = |s: f64| s.is_finite() && s > 0.0;
        if !(valid(sx) && valid(sy) && valid(sz)) {
            return Err(Error::InvalidCalibration { sx, sy, sz });
        }
        Ok(Self { sx, sy, sz })
    }

    pub fn isotropic(s: f64) -> Result<Self, Error> {
        Self::new(s, s, s)
    }

    pub fn sx(&self) -> f64 {
        self.sx
    }

    pub fn sy(&self) -> f64 {
        self.sy
    }

    pub fn sz(&self) -> f64 {
        self.sz
    }

    pub fn to_physical(&self, p: Point3) -> [f64; 3] {
        [
            f64::from(p.x) * self.sx,
            f64::from(p.y) * self.sy,
            f64::from(p.z) * self.sz,
        ]
    }

    /// Calibrated Euclidean distance between two voxel centers.
    pub fn distance(&self, a: Point3, b: Point3) -> f64 {
        let dx = f64::from(a.x - b.x) * self.sx;
        let dy = f64::from(a.y - b.y) * self.sy;
        let dz = f64::from(a.z - b.z) * self.sz;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Per-axis half sizes of a neighborhood that is roughly isotropic in
    /// physical units: `max(1, round(max_spacing / spacing))`.
    pub fn neighborhood_radius(&self) -> [usize; 3] {
        let max = self.sx.max(self.sy).max(self.sz);
        let radius = |s: f64| ((max / s).round() as usize).max(1);
        [radius(self.sx), radius(self.sy), radius(self.sz)]
    }
}
