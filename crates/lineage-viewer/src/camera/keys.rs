use bevy::prelude::KeyCode;
use smallvec::SmallVec;

/// Modifier-selected meaning of the arrow keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavMode {
    /// Move camera and orbit target along the camera's right/up axes.
    Pan,
    /// Rotate the tree's content group around its local X/Y axes.
    Spin,
    /// Dolly along the camera's forward axis, strafe along its right axis.
    Fly,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavInput {
    pub mode: NavMode,
    /// Right minus left.
    pub x: f32,
    /// Up minus down.
    pub y: f32,
    pub reset: bool,
}

impl NavInput {
    pub fn is_idle(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && !self.reset
    }
}

/// Currently held keys, fed by press/release events and polled once per frame.
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    pressed: SmallVec<[KeyCode; 8]>,
}

impl KeyState {
    pub fn press(&mut self, key: KeyCode) {
        if !self.pressed.contains(&key) {
            self.pressed.push(key);
        }
    }

    pub fn release(&mut self, key: KeyCode) {
        self.pressed.retain(|k| *k != key);
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    fn any(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|k| self.is_pressed(*k))
    }

    fn axis(&self, negative: KeyCode, positive: KeyCode) -> f32 {
        let mut v = 0.0;
        if self.is_pressed(positive) {
            v += 1.0;
        }
        if self.is_pressed(negative) {
            v -= 1.0;
        }
        v
    }

    /// Shift wins over Alt when both are held.
    pub fn nav_input(&self) -> NavInput {
        let mode = if self.any(&[KeyCode::ShiftLeft, KeyCode::ShiftRight]) {
            NavMode::Spin
        } else if self.any(&[KeyCode::AltLeft, KeyCode::AltRight]) {
            NavMode::Fly
        } else {
            NavMode::Pan
        };
        NavInput {
            mode,
            x: self.axis(KeyCode::ArrowLeft, KeyCode::ArrowRight),
            y: self.axis(KeyCode::ArrowDown, KeyCode::ArrowUp),
            reset: self.is_pressed(KeyCode::Space),
        }
    }
}
