use thiserror::Error;

/// Domain errors for the audio layer using thiserror for structured error handling.
///
/// Setup-time errors (invalid tempo, missing collaborators) are fatal and
/// surface before first use. Runtime playback and blend failures are absorbed
/// at the backend boundary and logged so a single bad snapshot or missing clip
/// cannot cascade into silence for the rest of the session.

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Invalid tempo: {bpm} bpm (must be a positive, finite value)")]
    InvalidTempo { bpm: f32 },

    #[error("No sting clips available for the current scene")]
    EmptyClipSet,

    #[error("Unknown mixer snapshot: {0}")]
    UnknownSnapshot(String),

    #[error("Missing audio collaborator: {0}")]
    MisconfiguredCollaborator(&'static str),

    #[error("Unknown scene audio: {0}")]
    UnknownScene(String),

    #[error("Failed to load audio clip: {path}")]
    ClipLoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to initialize audio output stream")]
    StreamInitFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Type alias for setup/load Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;
