//! Ray picking and proximity queries.
//!
//! Both queries are plain O(n) scans; the roster is a handful of characters.

use glam::Vec3;

use crate::scene::{Aabb, NodeId, SceneArena};
use crate::types::{CharacterId, planar_distance};
use crate::world::Character;

/// A half-line from `origin` along the unit vector `dir`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Vec3,
    /// Unit direction.
    pub dir: Vec3,
}

impl Ray {
    /// Construct a ray, normalising the direction.
    #[must_use]
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }
}

/// Distance along `ray` at which it first enters `aabb`, or `None`.
///
/// A ray starting inside the box hits at `t = 0`.
#[inline]
#[must_use]
pub fn ray_aabb_enter_t(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    let mut tmin = 0.0f32;
    let mut tmax = f32::INFINITY;
    for i in 0..3 {
        let s = ray.origin[i];
        let dir = ray.dir[i];
        let minb = aabb.min[i];
        let maxb = aabb.max[i];
        if dir.abs() < 1e-6 {
            if s < minb || s > maxb {
                return None;
            }
        } else {
            let inv = 1.0 / dir;
            let mut t0 = (minb - s) * inv;
            let mut t1 = (maxb - s) * inv;
            if t0 > t1 {
                core::mem::swap(&mut t0, &mut t1);
            }
            tmin = tmin.max(t0);
            tmax = tmax.min(t1);
            if tmin > tmax {
                return None;
            }
        }
    }
    Some(tmin)
}

/// The nearest character strictly within `radius` of `origin` on the ground
/// plane. Ties keep the earlier roster entry.
#[must_use]
pub fn nearest_within(origin: Vec3, characters: &[Character], radius: f32) -> Option<CharacterId> {
    let mut best: Option<(CharacterId, f32)> = None;
    for c in characters {
        let d = planar_distance(origin, c.position);
        if d >= radius {
            continue;
        }
        // Strict `<` keeps the first of equally distant characters.
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((c.id, d));
        }
    }
    best.map(|(id, _)| id)
}

/// Resolve a ray to the character whose clickable root owns the nearest hit
/// part. Hits with no clickable ancestor are skipped, so a non-clickable
/// character in front does not block one behind it.
#[must_use]
pub fn pick(scene: &SceneArena, ray: &Ray) -> Option<CharacterId> {
    let mut hits: Vec<(f32, NodeId)> = scene
        .nodes()
        .iter()
        .enumerate()
        .filter(|(_, n)| n.pickable && n.owner.is_some())
        .filter_map(|(i, n)| ray_aabb_enter_t(ray, &n.bounds).map(|t| (t, NodeId(i))))
        .collect();
    hits.sort_by(|a, b| a.0.total_cmp(&b.0));
    hits.into_iter()
        .find_map(|(_, id)| scene.clickable_ancestor(id))
}
