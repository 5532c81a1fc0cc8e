use bevy::prelude::Vec3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    QuadInOut,
    CubicInOut,
    ExpoInOut,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::ExpoInOut => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else if t < 0.5 {
                    2.0_f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0_f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
        }
    }
}

/// What a track drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    CameraPosition,
    OrbitTarget,
    GroupRotation,
}

#[derive(Debug, Clone, Copy)]
pub struct Track {
    pub channel: Channel,
    pub from: Vec3,
    pub to: Vec3,
    pub duration: f32,
    pub ease: Ease,
}

impl Track {
    pub fn sample(&self, elapsed: f32) -> Vec3 {
        let t = if self.duration <= 0.0 {
            1.0
        } else {
            elapsed / self.duration
        };
        self.from.lerp(self.to, self.ease.apply(t))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Focus,
    Reset,
}

/// A set of tracks that start together; finished once the longest one ends.
#[derive(Debug, Clone)]
pub struct Transition {
    pub kind: TransitionKind,
    tracks: SmallVec<[Track; 3]>,
    elapsed: f32,
}

impl Transition {
    pub fn new(kind: TransitionKind) -> Self {
        Self {
            kind,
            tracks: SmallVec::new(),
            elapsed: 0.0,
        }
    }

    pub fn with_track(mut self, track: Track) -> Self {
        self.tracks.push(track);
        self
    }

    pub fn duration(&self) -> f32 {
        self.tracks.iter().map(|t| t.duration).fold(0.0, f32::max)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration()
    }

    pub fn advance(&mut self, dt: f32) -> SmallVec<[(Channel, Vec3); 3]> {
        self.elapsed += dt.max(0.0);
        self.tracks
            .iter()
            .map(|t| (t.channel, t.sample(self.elapsed)))
            .collect()
    }
}
