//! Value types carried by the spatial codecs.
//!
//! In-memory form only. How many bits a component costs on the wire is
//! decided by the codec that writes it.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// A position, direction or any other triple of world-space floats.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl Vec3 {
    /// All components zero.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a vector from its components.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Components in wire order (x, y, z).
    #[must_use]
    pub const fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// `x² + y² + z²`. 1.0 for a unit normal.
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Largest per-component distance to `other`.
    ///
    /// Quantized codecs bound their error per component, so this is the
    /// natural tolerance check after a decode.
    #[must_use]
    pub fn max_abs_diff(self, other: Self) -> f32 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }
}

/// Euler angles in degrees.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Angles {
    /// Look up/down
    pub pitch: f32,
    /// Turn left/right
    pub yaw: f32,
    /// Bank
    pub roll: f32,
}

impl Angles {
    /// No rotation.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates angles from pitch, yaw and roll in degrees.
    #[must_use]
    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// `(pitch, yaw, roll)` as `(x, y, z)`.
    #[must_use]
    pub const fn to_vec3(self) -> Vec3 {
        Vec3::new(self.pitch, self.yaw, self.roll)
    }

    /// Inverse of [`Angles::to_vec3`].
    #[must_use]
    pub const fn from_vec3(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}
