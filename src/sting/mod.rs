/// Sting transition subsystem
///
/// The sting is a short, intense musical cue layered over the calm mix
/// when a gameplay moment demands it. This module owns the whole
/// lifecycle:
///
/// ```text
///            EnterSting                     ExitSting
///   Calm ───────────────────> Active ───────────────────> FadingOut
///    ^   blend(intense, 0.8q)        blend(calm, 16q)          │
///    │   play random clip            schedule deferred stop    │
///    └─────────────────────────────────────────────────────────┘
///                     deferred stop fires (tick)
/// ```
///
/// An `EnterSting` during FadingOut cancels the deferred stop and restarts
/// the sting; one while Active restarts it unconditionally.
pub mod machine;
pub mod player;

pub use machine::{StingControl, StingControlBuilder, StingSession, StingState};
pub use player::StingPlayer;
