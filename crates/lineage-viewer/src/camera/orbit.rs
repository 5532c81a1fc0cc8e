use bevy::prelude::{Quat, Transform, Vec2, Vec3};
use std::f32::consts::{PI, TAU};

const PHI_EPS: f32 = 1e-4;

/// Camera basis derived from looking at the orbit target.
#[derive(Debug, Clone, Copy)]
pub struct Basis {
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

/// Damped orbit around a target point: drag rotates, wheel dollies, right
/// drag pans. Input accumulates into deltas that [`OrbitControls::update`]
/// bleeds off by `damping` each frame.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub position: Vec3,
    pub target: Vec3,
    pub damping: f32,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub rotate_speed: f32,

    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pan_offset: Vec3,
}

impl OrbitControls {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            damping: 0.08,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            min_distance: 100.0,
            max_distance: 14_000.0,
            rotate_speed: 1.0,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        }
    }

    pub fn rotation(&self) -> Quat {
        if self.position.distance_squared(self.target) < 1e-6 {
            return Quat::IDENTITY;
        }
        Transform::from_translation(self.position)
            .looking_at(self.target, Vec3::Y)
            .rotation
    }

    pub fn basis(&self) -> Basis {
        let rot = self.rotation();
        Basis {
            right: rot * Vec3::X,
            up: rot * Vec3::Y,
            forward: rot * Vec3::NEG_Z,
        }
    }

    pub fn transform(&self) -> Transform {
        Transform {
            translation: self.position,
            rotation: self.rotation(),
            ..Transform::IDENTITY
        }
    }

    /// Pointer drag in pixels; a full viewport height turns a full circle.
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        self.theta_delta -= TAU * delta.x / h * self.rotate_speed;
        self.phi_delta -= TAU * delta.y / h * self.rotate_speed;
    }

    /// Positive steps move toward the target.
    pub fn zoom(&mut self, steps: f32) {
        let factor = 0.95_f32.powf(steps.abs());
        if steps > 0.0 {
            self.scale *= factor;
        } else if steps < 0.0 {
            self.scale /= factor;
        }
    }

    /// Pointer drag in pixels, scaled so the point under the cursor follows it.
    pub fn pan(&mut self, delta: Vec2, viewport_height: f32, fov_y: f32) {
        let h = viewport_height.max(1.0);
        let distance = self.position.distance(self.target) * (fov_y / 2.0).tan();
        let basis = self.basis();
        self.pan_offset += -basis.right * (2.0 * delta.x * distance / h);
        self.pan_offset += basis.up * (2.0 * delta.y * distance / h);
    }

    /// Rigid move of camera and target together.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
        self.target += delta;
    }

    /// Angle applied per frame while auto-rotating (60 fps reference).
    pub fn auto_rotate_angle(&self) -> f32 {
        TAU / 60.0 / 60.0 * self.auto_rotate_speed
    }

    pub fn update(&mut self) {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius < 1e-6 {
            return;
        }

        if self.auto_rotate {
            self.theta_delta -= self.auto_rotate_angle();
        }

        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        theta += self.theta_delta * self.damping;
        phi += self.phi_delta * self.damping;
        phi = phi.clamp(PHI_EPS, PI - PHI_EPS);

        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * self.damping;

        let sin_phi = phi.sin();
        let offset = Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        self.position = self.target + offset;

        let keep = 1.0 - self.damping;
        self.theta_delta *= keep;
        self.phi_delta *= keep;
        self.pan_offset *= keep;
        self.scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_update_keeps_pose() {
        let mut orbit = OrbitControls::new(Vec3::new(4000.0, 2500.0, 4000.0), Vec3::new(0.0, 500.0, 0.0));
        let before = orbit.position;
        orbit.update();
        assert!(orbit.position.distance(before) < 0.05);
    }

    #[test]
    fn auto_rotate_orbits_at_constant_distance() {
        let target = Vec3::new(0.0, 500.0, 0.0);
        let mut orbit = OrbitControls::new(Vec3::new(4000.0, 2500.0, 4000.0), target);
        orbit.auto_rotate = true;
        orbit.auto_rotate_speed = 4.0;
        let distance = orbit.position.distance(target);
        let height = orbit.position.y;
        for _ in 0..120 {
            orbit.update();
        }
        assert!((orbit.position.distance(target) - distance).abs() < 0.5);
        assert!((orbit.position.y - height).abs() < 0.5);
        assert!(orbit.position.distance(Vec3::new(4000.0, 2500.0, 4000.0)) > 100.0);
    }

    #[test]
    fn zoom_respects_distance_limits() {
        let mut orbit = OrbitControls::new(Vec3::new(0.0, 0.0, 200.0), Vec3::ZERO);
        for _ in 0..50 {
            orbit.zoom(5.0);
            orbit.update();
        }
        assert!((orbit.position.length() - orbit.min_distance).abs() < 1e-2);

        for _ in 0..200 {
            orbit.zoom(-5.0);
            orbit.update();
        }
        assert!((orbit.position.length() - orbit.max_distance).abs() < 1.0);
    }

    #[test]
    fn basis_faces_target() {
        let orbit = OrbitControls::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let basis = orbit.basis();
        assert!(basis.forward.distance(Vec3::NEG_Z) < 1e-5);
        assert!(basis.right.distance(Vec3::X) < 1e-5);
        assert!(basis.up.distance(Vec3::Y) < 1e-5);
    }

    #[test]
    fn translate_moves_camera_and_target() {
        let mut orbit = OrbitControls::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        orbit.translate(Vec3::X * 65.0);
        assert_eq!(orbit.target, Vec3::X * 65.0);
        assert_eq!(orbit.position, Vec3::new(65.0, 0.0, 10.0));
    }
}
