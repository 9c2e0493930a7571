/// Messaging module for event fan-out
///
/// Gameplay code never calls the sting machinery directly. Producers (3D
/// trigger zones, scripted calls, scene loaders) publish `AudioEvent`s on a
/// shared bus; consumers subscribe and drain their receivers on their own
/// schedule.
///
/// ```text
/// StingTriggerZone ──┐
/// scripted call    ──┤ publish ──> EventBus ──> subscriber receivers
/// scene loader     ──┘                           (AudioDirector pump)
/// ```
pub mod bus;
pub mod events;
pub mod trigger;

// Re-export commonly used types
pub use bus::{EventBus, SubscriberId};
pub use events::AudioEvent;
pub use trigger::{BodyTag, StingTriggerZone};
