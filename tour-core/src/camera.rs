//! First-person camera that follows the player.

use glam::{Quat, Vec2, Vec3};

use crate::config::CameraConfig;
use crate::picking::Ray;
use crate::world::Player;

/// Camera pose and projection. Pitch is always level.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    /// Eye position.
    pub eye: Vec3,
    /// Heading about +Y; 0 looks down -Z.
    pub yaw: f32,
    /// Roll about the view axis (only non-zero while dancing).
    pub roll: f32,
    /// Vertical field of view, radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect: f32,
}

impl Camera {
    /// Create a camera at the player's eye.
    #[must_use]
    pub fn new(cfg: &CameraConfig, player: &Player) -> Self {
        Self {
            eye: player.position,
            yaw: player.yaw,
            roll: 0.0,
            fov_y: cfg.fov_y_deg.to_radians(),
            aspect: cfg.aspect,
        }
    }

    /// Orientation quaternion (yaw, then roll about the view axis).
    #[must_use]
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_z(self.roll)
    }

    /// Unit view direction.
    #[must_use]
    pub fn look_dir(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    /// Ray from the eye through a normalised device coordinate
    /// (`x` right, `y` up, both in `[-1, 1]`).
    #[must_use]
    pub fn ray_through(&self, ndc: Vec2) -> Ray {
        let tan_half = (self.fov_y * 0.5).tan();
        let local = Vec3::new(ndc.x * tan_half * self.aspect, ndc.y * tan_half, -1.0);
        Ray::new(self.eye, self.rotation() * local)
    }
}

/// Update the camera from the player. While dancing the eye bobs and rolls
/// on `clock` instead of tracking the player rigidly.
pub fn follow_player(cfg: &CameraConfig, camera: &mut Camera, player: &Player, clock: f32) {
    camera.yaw = player.yaw;
    if player.is_dancing {
        camera.eye = player.position + Vec3::Y * (clock * 8.0).sin().abs() * cfg.dance_bob;
        camera.roll = (clock * 4.0).sin() * cfg.dance_roll;
    } else {
        camera.eye = player.position;
        camera.roll = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_ray_matches_look_dir() {
        let mut player = Player::new(Vec3::new(0.0, 1.6, 5.0), 5.0);
        player.yaw = 1.0;
        let mut cam = Camera::new(&CameraConfig::default(), &player);
        follow_player(&CameraConfig::default(), &mut cam, &player, 0.0);
        let ray = cam.ray_through(Vec2::ZERO);
        assert!((ray.dir - cam.look_dir()).length() < 1e-5);
        assert_eq!(ray.origin, player.position);
    }

    #[test]
    fn right_edge_ray_bends_right() {
        let player = Player::new(Vec3::ZERO, 5.0);
        let cam = Camera::new(&CameraConfig::default(), &player);
        let ray = cam.ray_through(Vec2::new(1.0, 0.0));
        assert!(ray.dir.x > 0.0);
        assert!(ray.dir.z < 0.0);
    }

    #[test]
    fn dancing_bobs_and_rolls() {
        let cfg = CameraConfig::default();
        let mut player = Player::new(Vec3::new(0.0, 1.6, 0.0), 5.0);
        player.is_dancing = true;
        let mut cam = Camera::new(&cfg, &player);
        follow_player(&cfg, &mut cam, &player, 0.2);
        assert!(cam.eye.y > player.position.y);
        assert!(cam.roll.abs() > 0.0);

        player.is_dancing = false;
        follow_player(&cfg, &mut cam, &player, 0.2);
        assert_eq!(cam.eye, player.position);
        assert_eq!(cam.roll, 0.0);
    }
}
