//! Runtime game-audio layer: mixer parameter control, per-scene music and
//! ambience switching, and a trigger-driven sting transition system that
//! crossfades between calm and intense mixer snapshots in time with the
//! music.
//!
//! ## Architecture
//!
//! ```text
//! StingTriggerZone / script calls
//!         │ publish
//!         ▼
//!     EventBus ──> AudioDirector::pump (single serialized loop)
//!                       ├── StingControl ──> SnapshotBlender (crossfades)
//!                       │        └── StingPlayer ──> sting AudioChannel
//!                       ├── SceneLibrary ──> main/ambience AudioChannels
//!                       └── MixerController ──> MixerParams (dB writes)
//! ```
//!
//! The backend traits (`SnapshotBlender`, `AudioChannel`, `MixerParams`)
//! are the crate's only boundary to real audio; `backend::rodio` provides
//! the production implementation, and tests substitute recording fakes.

pub mod backend;
pub mod director;
pub mod error;
pub mod messaging;
pub mod mixer;
pub mod scene;
pub mod scheduler;
pub mod sting;
pub mod tempo;

// Re-export the types most hosts touch
pub use backend::{AudioChannel, ClipId, MixerParams, SnapshotBlender, SnapshotId};
pub use director::{AudioDirector, Channels};
pub use error::{AppResult, AudioError};
pub use messaging::{AudioEvent, BodyTag, EventBus, StingTriggerZone, SubscriberId};
pub use mixer::{MixerController, MixerParam};
pub use scene::{SceneAudio, SceneLibrary};
pub use scheduler::{Scheduler, TimerHandle};
pub use sting::{StingControl, StingControlBuilder, StingPlayer, StingSession, StingState};
pub use tempo::TempoClock;
