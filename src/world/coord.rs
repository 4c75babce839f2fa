use glam::{IVec3, Vec3};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use super::direction::Face;

/// Integer position on a 3D grid. Used both for chunk coordinates and for
/// block coordinates, depending on context.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coord3 {
    pub const ZERO: Self = Self::new(0, 0, 0);
    pub const ONE: Self = Self::new(1, 1, 1);

    /// Offsets to the six face neighbors, in `Face` ordinal order.
    pub const FACE_OFFSETS: [Self; 6] = [
        Self::new(1, 0, 0),
        Self::new(0, 1, 0),
        Self::new(0, 0, 1),
        Self::new(-1, 0, 0),
        Self::new(0, -1, 0),
        Self::new(0, 0, -1),
    ];

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(value: i32) -> Self {
        Self::new(value, value, value)
    }

    /// Component-wise multiply by a continuous vector, e.g. chunk coordinate
    /// to world-space origin.
    pub fn scale(self, scale: Vec3) -> Vec3 {
        self.as_vec3() * scale
    }

    pub fn as_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    /// Maps a direction vector to the axis-aligned unit coordinate of its
    /// largest-magnitude component. Ties resolve to X, then Y, then Z. A zero
    /// or non-finite direction has no axis and maps to `ZERO`.
    pub fn dominant_axis(direction: Vec3) -> Self {
        if !direction.is_finite() || direction == Vec3::ZERO {
            return Self::ZERO;
        }

        let abs = direction.abs();

        if abs.x >= abs.y && abs.x >= abs.z {
            Self::new(direction.x.signum() as i32, 0, 0)
        } else if abs.y >= abs.z {
            Self::new(0, direction.y.signum() as i32, 0)
        } else {
            Self::new(0, 0, direction.z.signum() as i32)
        }
    }

    /// Largest per-axis distance.
    pub fn chebyshev_distance(self, other: Self) -> i32 {
        let delta = self - other;
        delta.x.abs().max(delta.y.abs()).max(delta.z.abs())
    }

    pub fn distance_squared(self, other: Self) -> i32 {
        let delta = self - other;
        (delta.x * delta.x) + (delta.y * delta.y) + (delta.z * delta.z)
    }

    pub fn neighbor(self, face: Face) -> Self {
        self + face.offset()
    }

    pub fn neighbors(self) -> impl Iterator<Item = Self> {
        Self::FACE_OFFSETS.into_iter().map(move |offset| self + offset)
    }
}

impl Add for Coord3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Coord3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Coord3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul for Coord3 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }
}

impl Mul<i32> for Coord3 {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Coord3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl From<IVec3> for Coord3 {
    fn from(value: IVec3) -> Self {
        Self::new(value.x, value.y, value.z)
    }
}

impl From<Coord3> for IVec3 {
    fn from(value: Coord3) -> Self {
        IVec3::new(value.x, value.y, value.z)
    }
}

impl From<Coord3> for Vec3 {
    fn from(value: Coord3) -> Self {
        value.as_vec3()
    }
}

impl std::fmt::Display for Coord3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_is_component_wise() {
        let a = Coord3::new(1, -2, 3);
        let b = Coord3::new(4, 5, -6);

        assert_eq!(a + b, Coord3::new(5, 3, -3));
        assert_eq!(a - b, Coord3::new(-3, -7, 9));
        assert_eq!(a * b, Coord3::new(4, -10, -18));
        assert_eq!(a * 2, Coord3::new(2, -4, 6));
        assert_eq!(-a, Coord3::new(-1, 2, -3));
    }

    #[test]
    fn scale_converts_to_world_space() {
        let chunk = Coord3::new(2, -1, 0);
        assert_eq!(chunk.scale(Vec3::splat(16.0)), Vec3::new(32.0, -16.0, 0.0));
    }

    #[test]
    fn dominant_axis_picks_largest_component() {
        assert_eq!(
            Coord3::dominant_axis(Vec3::new(0.9, 0.1, -0.2)),
            Coord3::new(1, 0, 0)
        );
        assert_eq!(
            Coord3::dominant_axis(Vec3::new(0.1, -0.8, 0.3)),
            Coord3::new(0, -1, 0)
        );
        assert_eq!(
            Coord3::dominant_axis(Vec3::new(0.2, 0.3, -0.7)),
            Coord3::new(0, 0, -1)
        );
    }

    #[test]
    fn dominant_axis_of_degenerate_direction_is_zero() {
        assert_eq!(Coord3::dominant_axis(Vec3::ZERO), Coord3::ZERO);
        assert_eq!(Coord3::dominant_axis(Vec3::NAN), Coord3::ZERO);
        assert_eq!(
            Coord3::dominant_axis(Vec3::new(f32::INFINITY, 0.0, 0.0)),
            Coord3::ZERO
        );
        assert_eq!(
            Coord3::dominant_axis(Vec3::new(0.0, -0.0, 0.5)),
            Coord3::new(0, 0, 1)
        );
    }

    #[test]
    fn distances() {
        let origin = Coord3::ZERO;
        let other = Coord3::new(3, -1, 2);

        assert_eq!(origin.chebyshev_distance(other), 3);
        assert_eq!(origin.distance_squared(other), 14);
    }

    #[test]
    fn neighbors_follow_face_order() {
        let neighbors: Vec<_> = Coord3::ZERO.neighbors().collect();
        assert_eq!(neighbors.len(), 6);
        assert_eq!(neighbors[0], Coord3::new(1, 0, 0));
        assert_eq!(neighbors[5], Coord3::new(0, 0, -1));
        assert_eq!(Coord3::ZERO.neighbor(Face::Down), Coord3::new(0, -1, 0));
    }
}
