mod collider_builder;
mod registry;

pub use collider_builder::*;
pub use registry::*;

use glam::Vec3;

/// How the physics engine should treat a collider's body.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    #[default]
    Static,
    Kinematic,
}

/// An axis-aligned box positioned relative to its body's origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxPrimitive {
    pub offset: Vec3,
    pub half_extents: Vec3,
}

/// Shape description handed to the physics engine.
#[derive(Debug, Clone, PartialEq)]
pub enum ColliderShape {
    Cuboid(BoxPrimitive),
    Capsule { half_height: f32, radius: f32 },
    Compound(Vec<BoxPrimitive>),
    TriMesh { vertices: Vec<Vec3>, triangles: Vec<[u32; 3]> },
}

impl ColliderShape {
    /// Number of box primitives in the shape.
    pub fn box_count(&self) -> usize {
        match self {
            Self::Cuboid(_) => 1,
            Self::Compound(boxes) => boxes.len(),
            Self::Capsule { .. } | Self::TriMesh { .. } => 0,
        }
    }
}

/// Physics engine. It takes ownership of the body and shape on `insert`.
pub trait Physics {
    type Handle;

    fn insert(&mut self, shape: &ColliderShape, body: BodyKind, translation: Vec3) -> Self::Handle;

    fn remove(&mut self, handle: Self::Handle);
}
