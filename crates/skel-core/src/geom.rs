use core::fmt;
use core::ops::Add;

/// Integer voxel coordinate.
///
/// Points compare and hash by value, so they can key maps and sets during
/// neighbor lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Point3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// The 26 neighbor offsets, `dx` outermost and `dz` innermost.
///
/// Every traversal walks neighbors in this order so that results are
/// reproducible for a given volume.
pub const NEIGHBORS_26: [[i32; 3]; 26] = neighbor_offsets();

const fn neighbor_offsets() -> [[i32; 3]; 26] {
    let mut out = [[0; 3]; 26];
    let mut i = 0;
    let mut dx = -1;
    while dx <= 1 {
        let mut dy = -1;
        while dy <= 1 {
            let mut dz = -1;
            while dz <= 1 {
                if dx != 0 || dy != 0 || dz != 0 {
                    out[i] = [dx, dy, dz];
                    i += 1;
                }
                dz += 1;
            }
            dy += 1;
        }
        dx += 1;
    }
    out
}

impl Point3 {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(self, d: [i32; 3]) -> Self {
        Self {
            x: self.x + d[0],
            y: self.y + d[1],
            z: self.z + d[2],
        }
    }

    /// 26-adjacency test. A point is not its own neighbor.
    pub fn is_neighbor(self, other: Point3) -> bool {
        self != other
            && (self.x - other.x).abs() <= 1
            && (self.y - other.y).abs() <= 1
            && (self.z - other.z).abs() <= 1
    }

    pub fn neighbors(self) -> impl Iterator<Item = Point3> {
        NEIGHBORS_26.iter().map(move |&d| self.offset(d))
    }
}

impl Add<[i32; 3]> for Point3 {
    type Output = Point3;

    fn add(self, rhs: [i32; 3]) -> Self::Output {
        self.offset(rhs)
    }
}

impl From<(i32, i32, i32)> for Point3 {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
