/// Audio backend boundary
///
/// The core sting logic never touches waveforms or mixer internals. It
/// issues three kinds of best-effort commands through these traits: blend
/// the mixer toward a named snapshot, start a clip on a channel, stop a
/// channel. Implementations report failures (unknown snapshot, missing
/// clip) through logging and never propagate them as control-flow faults,
/// since an audio glitch must never halt gameplay.
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod rodio;

pub use self::rodio::{RodioChannel, RodioMixer};

/// Identifier of a loaded audio clip
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(String);

impl ClipId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClipId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Opaque handle to a named mixer configuration ("calm", "intense")
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotId(String);

impl SnapshotId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SnapshotId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Timed interpolation toward a named mixer snapshot.
///
/// Fire-and-forget: there is no completion callback, and callers must not
/// assume the blend finished (or even started) when this returns. A
/// non-positive duration means an instantaneous switch.
pub trait SnapshotBlender: Send + Sync {
    fn blend_to(&self, target: &SnapshotId, duration: Duration);
}

/// One playback channel (main music, sting, ambience, ...).
///
/// All playback is best-effort: an unknown clip or decode failure is
/// logged and absorbed. `play` replaces whatever the channel was playing,
/// `play_one_shot` overlays a clip on top of it, and `play_looping`
/// replaces it with a clip that repeats until `stop`. `stop` is idempotent
/// and does not reach one-shot overlays, which run to completion on their
/// own.
pub trait AudioChannel: Send + Sync {
    fn play(&self, clip: &ClipId);
    fn play_one_shot(&self, clip: &ClipId);
    fn play_looping(&self, clip: &ClipId);
    fn stop(&self);
    fn is_playing(&self) -> bool;
    fn set_volume(&self, linear: f32);
}

/// Write access to named mixer parameters, in decibels
pub trait MixerParams: Send + Sync {
    fn set_param(&self, param: crate::mixer::MixerParam, db: f32);
}

/// Attenuation floor: levels at or below this are silence
pub const SILENCE_DB: f32 = -80.0;

/// Convert a mixer level in decibels to a linear sink volume
pub fn db_to_linear(db: f32) -> f32 {
    if db <= SILENCE_DB {
        0.0
    } else {
        10.0_f32.powf(db / 20.0)
    }
}
