/// A single voxel: whether it is solid, and which material it is made of.
///
/// The material byte is kept independently of the active flag, so toggling a
/// cell off and back on restores its material.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    active: bool,
    material: u8,
}

impl Cell {
    pub const EMPTY: Self = Self::new(false, 0);

    pub const fn new(active: bool, material: u8) -> Self {
        Self { active, material }
    }

    pub const fn solid(material: u8) -> Self {
        Self::new(true, material)
    }

    pub const fn is_active(&self) -> bool {
        self.active
    }

    pub const fn material(&self) -> u8 {
        self.material
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub(crate) fn set_material(&mut self, material: u8) {
        self.material = material;
    }
}
