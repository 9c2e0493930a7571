/// Sting clip playback
///
/// Picks one-shot sting clips at random and starts them on the dedicated
/// sting channel.
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::backend::{AudioChannel, ClipId};
use crate::error::AudioError;

/// Plays one-shot stings on a dedicated channel, choosing uniformly at
/// random from whatever clip set the current scene provides.
pub struct StingPlayer {
    channel: Arc<dyn AudioChannel>,
    rng: StdRng,
}

impl StingPlayer {
    pub fn new(channel: Arc<dyn AudioChannel>) -> Self {
        Self {
            channel,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic clip selection for tests
    pub fn with_seed(channel: Arc<dyn AudioChannel>, seed: u64) -> Self {
        Self {
            channel,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Pick a clip uniformly at random and start it, returning the chosen
    /// id so the caller can track the active clip.
    ///
    /// Fails with `EmptyClipSet` when no clips are available; nothing is
    /// started in that case.
    pub fn play_random(&mut self, clips: &[ClipId]) -> Result<ClipId, AudioError> {
        let clip = self.pick(clips)?;
        tracing::info!("Playing sting '{}'", clip);
        self.channel.play(&clip);
        Ok(clip)
    }

    /// Overlay a random sting on top of whatever the channel is already
    /// playing. The overlay runs to completion; `stop` does not reach it.
    pub fn play_one_shot(&mut self, clips: &[ClipId]) -> Result<ClipId, AudioError> {
        let clip = self.pick(clips)?;
        tracing::info!("Playing one-shot sting '{}'", clip);
        self.channel.play_one_shot(&clip);
        Ok(clip)
    }

    /// Start a random sting looping until `stop`
    pub fn play_loop(&mut self, clips: &[ClipId]) -> Result<ClipId, AudioError> {
        let clip = self.pick(clips)?;
        tracing::info!("Looping sting '{}'", clip);
        self.channel.play_looping(&clip);
        Ok(clip)
    }

    fn pick(&mut self, clips: &[ClipId]) -> Result<ClipId, AudioError> {
        if clips.is_empty() {
            return Err(AudioError::EmptyClipSet);
        }
        Ok(clips[self.rng.gen_range(0..clips.len())].clone())
    }

    /// Halt sting playback. Idempotent if nothing is playing.
    pub fn stop(&self) {
        self.channel.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.channel.is_playing()
    }
}
