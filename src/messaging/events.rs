/// Audio event types
///
/// Events represent gameplay signals the audio layer reacts to. Enter/exit
/// sting events carry no payload: a 3D trigger zone and a scripted call are
/// just two producers of the same event kind, dispatched through the same
/// handler.

/// Gameplay signals consumed by the audio layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEvent {
    /// An intense moment began; crossfade into the sting mix
    EnterSting,

    /// The intense moment ended; fade back to the calm mix
    ExitSting,

    /// A new scene's audio set should become active
    SceneChanged { scene: String },
}

impl AudioEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            AudioEvent::EnterSting => "Enter sting".to_string(),
            AudioEvent::ExitSting => "Exit sting".to_string(),
            AudioEvent::SceneChanged { scene } => format!("Scene changed: {}", scene),
        }
    }
}
