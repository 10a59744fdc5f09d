//! Owned arena of renderable boxes.
//!
//! Every visible thing in the tour is a [`SceneNode`]: static props, and a
//! small rig of parts per character (body, head, two arms, a floor ring)
//! hanging under a clickable root. The renderer draws nodes; the picking
//! service intersects them and walks `parent` links up to the clickable root.
//!
//! Nodes stand in for GPU-side resources, so the arena is released through an
//! explicit [`SceneArena::dispose`] exactly once at teardown.

use glam::{Quat, Vec3};
use tracing::{debug, warn};

use crate::types::CharacterId;
use crate::world::{Character, PropKind, World};

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// What part of the scene a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Static geometry.
    Prop(PropKind),
    /// Invisible group node owning a character's parts.
    CharacterRoot,
    /// Torso.
    Body,
    /// Head.
    Head,
    /// Left arm.
    LeftArm,
    /// Right arm.
    RightArm,
    /// Selection ring on the floor.
    Ring,
}

/// World-space axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Box from centre and half extents.
    #[must_use]
    pub fn from_center(center: Vec3, half: Vec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }
}

/// One renderable/pickable box.
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Part type.
    pub kind: NodeKind,
    /// Owning node, if any.
    pub parent: Option<NodeId>,
    /// Character this node belongs to.
    pub owner: Option<CharacterId>,
    /// Offset from the owner's feet in the owner's local frame.
    pub offset: Vec3,
    /// Local half extents (before scale).
    pub half_extents: Vec3,
    /// Whether ray picks test this node.
    pub pickable: bool,
    /// Whether a pick resolving to this node opens dialogue.
    pub clickable: bool,
    /// Whether the renderer draws it.
    pub visible: bool,
    /// Current world bounds.
    pub bounds: Aabb,
}

/// The scene's node arena.
#[derive(Debug)]
pub struct SceneArena {
    nodes: Vec<SceneNode>,
    disposed: bool,
}

// Part layout, relative to the feet: (kind, offset, half extents, pickable).
const RIG: [(NodeKind, Vec3, Vec3, bool); 5] = [
    (NodeKind::Body, Vec3::new(0.0, 0.95, 0.0), Vec3::new(0.30, 0.55, 0.20), true),
    (NodeKind::Head, Vec3::new(0.0, 1.70, 0.0), Vec3::new(0.20, 0.20, 0.20), true),
    (NodeKind::LeftArm, Vec3::new(-0.45, 1.10, 0.0), Vec3::new(0.10, 0.40, 0.10), true),
    (NodeKind::RightArm, Vec3::new(0.45, 1.10, 0.0), Vec3::new(0.10, 0.40, 0.10), true),
    (NodeKind::Ring, Vec3::new(0.0, 0.02, 0.0), Vec3::new(0.60, 0.02, 0.60), false),
];

impl SceneArena {
    /// Build nodes for every prop and character in the world.
    #[must_use]
    pub fn build(world: &World) -> Self {
        let mut nodes = Vec::with_capacity(world.props().len() + world.characters().len() * 6);

        for prop in world.props() {
            nodes.push(SceneNode {
                kind: NodeKind::Prop(prop.kind),
                parent: None,
                owner: None,
                offset: prop.center,
                half_extents: prop.half_extents,
                pickable: false,
                clickable: false,
                visible: true,
                bounds: Aabb::from_center(prop.center, prop.half_extents),
            });
        }

        for character in world.characters() {
            let root = NodeId(nodes.len());
            nodes.push(SceneNode {
                kind: NodeKind::CharacterRoot,
                parent: None,
                owner: Some(character.id),
                offset: Vec3::ZERO,
                half_extents: Vec3::ZERO,
                pickable: false,
                clickable: character.clickable,
                visible: true,
                bounds: Aabb::from_center(character.position, Vec3::ZERO),
            });
            for (kind, offset, half, pickable) in RIG {
                nodes.push(SceneNode {
                    kind,
                    parent: Some(root),
                    owner: Some(character.id),
                    offset,
                    half_extents: half,
                    pickable,
                    clickable: false,
                    visible: kind != NodeKind::Ring,
                    bounds: Aabb::from_center(character.position + offset, half),
                });
            }
        }

        let mut arena = Self {
            nodes,
            disposed: false,
        };
        arena.sync(world);
        debug!(nodes = arena.nodes.len(), "scene arena built");
        arena
    }

    /// Recompute character node bounds from the current poses.
    pub fn sync(&mut self, world: &World) {
        for node in &mut self.nodes {
            let Some(owner) = node.owner else { continue };
            let Some(character) = world.character(owner) else { continue };
            match node.kind {
                NodeKind::CharacterRoot => {
                    node.clickable = character.clickable;
                    node.bounds = Aabb::from_center(character.position, Vec3::ZERO);
                }
                NodeKind::Ring => {
                    node.visible = character.ring.visible;
                    node.bounds = part_bounds(character, node.offset, node.half_extents, 0.0);
                }
                NodeKind::LeftArm => {
                    node.bounds = part_bounds(character, node.offset, node.half_extents, character.pose.arm_swing);
                }
                NodeKind::RightArm => {
                    node.bounds = part_bounds(character, node.offset, node.half_extents, -character.pose.arm_swing);
                }
                _ => {
                    node.bounds = part_bounds(character, node.offset, node.half_extents, 0.0);
                }
            }
        }
    }

    /// All nodes.
    #[must_use]
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    /// One node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    /// Walk from `id` up through parents; return the owner of the first
    /// clickable node found (including `id` itself).
    #[must_use]
    pub fn clickable_ancestor(&self, id: NodeId) -> Option<CharacterId> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current)?;
            if node.clickable {
                return node.owner;
            }
            cursor = node.parent;
        }
        None
    }

    /// Release every node. Returns `false` if the arena was already disposed.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        let released = self.nodes.len();
        self.nodes.clear();
        self.disposed = true;
        debug!(released, "scene arena disposed");
        true
    }

    /// Whether [`dispose`](Self::dispose) has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Drop for SceneArena {
    fn drop(&mut self) {
        if !self.disposed && !self.nodes.is_empty() {
            warn!(nodes = self.nodes.len(), "scene arena dropped without dispose");
        }
    }
}

/// World bounds of a character part: scaled, yawed, bobbed, with an optional
/// forward swing for arms.
fn part_bounds(character: &Character, offset: Vec3, half: Vec3, swing: f32) -> Aabb {
    let scale = character.pose.scale;
    let rot = Quat::from_rotation_y(character.yaw);
    let swung = offset + Vec3::new(0.0, 0.0, -swing.sin() * 0.3);
    let center = character.position + Vec3::Y * character.pose.bob + rot * (swung * scale);
    // Extents of a yawed box: |R| applied to the half extents.
    let (s, c) = character.yaw.sin_cos();
    let h = half * scale;
    let world_half = Vec3::new(
        c.abs() * h.x + s.abs() * h.z,
        h.y,
        s.abs() * h.x + c.abs() * h.z,
    );
    Aabb::from_center(center, world_half)
}
