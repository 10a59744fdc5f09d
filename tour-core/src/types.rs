//! Core type definitions shared across the tour simulation.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Index of a character in the world roster.
///
/// Characters are created once at world initialisation and never removed,
/// so the roster index is a stable identity for the whole page session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(pub usize);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unique identifier for one opened dialogue session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tag attached to an outstanding reply request.
///
/// A resolution is only applied when its ticket matches the session that is
/// open at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplyTicket {
    /// Session that issued the request.
    pub session: SessionId,
    /// Character being asked.
    pub character: CharacterId,
}

// ---------------------------------------------------------------------------
// Spatial
// ---------------------------------------------------------------------------

/// Square walkable area centred on the origin, on the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    /// Half the side length; positions are clamped to `[-half_extent, half_extent]`.
    pub half_extent: f32,
}

impl Arena {
    /// Whether a point lies inside the arena (height ignored).
    #[must_use]
    pub fn contains(&self, p: Vec3) -> bool {
        p.x.abs() <= self.half_extent && p.z.abs() <= self.half_extent
    }

    /// Clamp a point into the arena on X and Z, leaving height untouched.
    #[must_use]
    pub fn clamp(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            p.x.clamp(-self.half_extent, self.half_extent),
            p.y,
            p.z.clamp(-self.half_extent, self.half_extent),
        )
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self { half_extent: 18.0 }
    }
}

/// Distance between two points projected onto the ground plane.
#[inline]
#[must_use]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

/// Yaw (radians, about +Y) that turns a `-Z`-facing object at `from` toward `to`.
#[inline]
#[must_use]
pub fn yaw_towards(from: Vec3, to: Vec3) -> f32 {
    let d = to - from;
    (-d.x).atan2(-d.z)
}

/// RGB colour in `[0, 1]` used for selection rings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    /// Ring colour while a character is within talking range.
    pub const NEARBY: Self = Self(0.30, 0.85, 0.45);
    /// Ring colour while the pointer hovers a character.
    pub const HOVERED: Self = Self(1.0, 0.80, 0.20);
    /// Ring colour for the active dialogue partner.
    pub const TALKING: Self = Self(0.35, 0.60, 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_height() {
        let arena = Arena::default();
        let p = arena.clamp(Vec3::new(40.0, 1.6, -25.0));
        assert_eq!(p, Vec3::new(18.0, 1.6, -18.0));
    }

    #[test]
    fn planar_distance_ignores_height() {
        let d = planar_distance(Vec3::new(-9.0, 1.6, -5.0), Vec3::new(-10.0, 0.0, -5.0));
        assert!((d - 1.0).abs() < 1e-6);
    }

    #[test]
    fn yaw_towards_faces_target() {
        // Object at origin facing -Z; target straight ahead needs no turn.
        assert!(yaw_towards(Vec3::ZERO, Vec3::new(0.0, 0.0, -5.0)).abs() < 1e-6);
        // Target to the +X side: rotating -Z by -90° about Y lands on +X.
        let yaw = yaw_towards(Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0));
        let facing = glam::Quat::from_rotation_y(yaw) * Vec3::NEG_Z;
        assert!((facing - Vec3::X).length() < 1e-5);
    }
}
