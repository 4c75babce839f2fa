use glam::Vec3;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use super::coord::Coord3;

bitflags::bitflags! {
    /// Set of faces, one bit per `Face` ordinal.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FaceMask : u8 {
        const EAST = 1 << 0;
        const UP = 1 << 1;
        const NORTH = 1 << 2;
        const WEST = 1 << 3;
        const DOWN = 1 << 4;
        const SOUTH = 1 << 5;
    }
}

impl FaceMask {
    /// Iterates the faces contained in the mask, in ordinal order.
    pub fn faces(self) -> impl Iterator<Item = Face> {
        (0..6u8)
            .filter(move |normal_index| self.bits() & (1 << normal_index) != 0)
            .filter_map(|normal_index| Face::try_from(normal_index).ok())
    }
}

/// Axis-aligned face direction. Positive directions come first, so that
/// `ordinal % 3` is the axis and `ordinal >= 3` is the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Face {
    East = 0,
    Up = 1,
    North = 2,
    West = 3,
    Down = 4,
    South = 5,
}

impl Face {
    pub const ALL: [Self; 6] = [
        Self::East,
        Self::Up,
        Self::North,
        Self::West,
        Self::Down,
        Self::South,
    ];

    pub fn index(self) -> usize {
        u8::from(self) as usize
    }

    /// 0 for X, 1 for Y, 2 for Z.
    pub fn axis(self) -> usize {
        self.index() % 3
    }

    pub fn is_negative(self) -> bool {
        self.index() >= 3
    }

    pub fn opposite(self) -> Self {
        Self::ALL[(self.index() + 3) % 6]
    }

    pub fn offset(self) -> Coord3 {
        Coord3::FACE_OFFSETS[self.index()]
    }

    pub fn normal(self) -> Vec3 {
        self.offset().as_vec3()
    }

    pub fn mask(self) -> FaceMask {
        FaceMask::from_bits_truncate(1 << self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_faces_cancel() {
        for face in Face::ALL {
            assert_eq!(face.offset() + face.opposite().offset(), Coord3::ZERO);
            assert_eq!(face.opposite().opposite(), face);
        }
    }

    #[test]
    fn mask_iterates_contained_faces() {
        let mask = Face::Up.mask() | Face::South.mask();
        let faces: Vec<_> = mask.faces().collect();

        assert_eq!(faces, vec![Face::Up, Face::South]);
        assert_eq!(FaceMask::all().faces().count(), 6);
        assert_eq!(FaceMask::empty().faces().count(), 0);
    }

    #[test]
    fn ordinal_round_trips() {
        assert_eq!(Face::try_from(4u8).ok(), Some(Face::Down));
        assert!(Face::try_from(6u8).is_err());
    }
}
