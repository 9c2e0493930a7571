/// Process-scoped audio lifecycle
///
/// The director replaces the old "reach for the global manager" pattern: it
/// is constructed explicitly, owns the mixer controller, scene library, and
/// sting machine, and hands out the bus for producers to publish on.
///
/// All event processing happens inside `pump`, on whatever thread the host
/// calls it from. Producers on other threads only touch the bus; the
/// channel between them and the pump is what serializes events, so each one
/// is fully processed before the next begins.
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::backend::{AudioChannel, ClipId, MixerParams, SnapshotBlender};
use crate::error::AudioError;
use crate::messaging::{AudioEvent, EventBus, SubscriberId};
use crate::mixer::MixerController;
use crate::scene::{SceneAudio, SceneLibrary};
use crate::sting::{StingControl, StingPlayer};
use crate::tempo::TempoClock;

/// Playback channels the director drives directly (the sting channel is
/// owned by the sting machine's player)
pub struct Channels {
    pub sting: Arc<dyn AudioChannel>,
    pub main_music: Arc<dyn AudioChannel>,
    pub ambience: Arc<dyn AudioChannel>,
}

/// Owns the audio layer end to end: bus subscription, mixer levels, scene
/// switching, and the sting state machine.
pub struct AudioDirector {
    bus: EventBus,
    events: Receiver<AudioEvent>,
    subscription: SubscriberId,
    mixer: MixerController,
    scenes: SceneLibrary,
    sting: StingControl,
    sting_channel: Arc<dyn AudioChannel>,
    main_channel: Arc<dyn AudioChannel>,
    ambience_channel: Arc<dyn AudioChannel>,
    rng: StdRng,
}

impl AudioDirector {
    /// Wire up the audio layer.
    ///
    /// Mixer defaults are applied immediately and the library's first scene
    /// (if any) comes up before this returns, so the boot scene has audio
    /// without an explicit switch.
    pub fn new(
        bus: EventBus,
        mixer_backend: Arc<dyn MixerParams>,
        blender: Arc<dyn SnapshotBlender>,
        channels: Channels,
        scenes: SceneLibrary,
    ) -> Result<Self, AudioError> {
        let (events, subscription) = bus.subscribe();

        let mut mixer = MixerController::new(mixer_backend);
        mixer.set_defaults();

        let sting = StingControl::builder()
            .tempo(TempoClock::default())
            .player(StingPlayer::new(Arc::clone(&channels.sting)))
            .blender(blender)
            .build()?;

        let mut director = Self {
            bus,
            events,
            subscription,
            mixer,
            scenes,
            sting,
            sting_channel: channels.sting,
            main_channel: channels.main_music,
            ambience_channel: channels.ambience,
            rng: StdRng::from_entropy(),
        };

        if let Some(initial) = director.scenes.current().cloned() {
            director.apply_scene(&initial);
        }
        Ok(director)
    }

    /// Deterministic track selection for tests
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// A handle producers can publish events on
    pub fn bus(&self) -> EventBus {
        self.bus.clone()
    }

    pub fn mixer(&mut self) -> &mut MixerController {
        &mut self.mixer
    }

    pub fn sting(&self) -> &StingControl {
        &self.sting
    }

    /// Drain pending events in arrival order, then fire due timers.
    ///
    /// `now` is logical time on the host's clock; it must be monotone
    /// across calls.
    pub fn pump(&mut self, now: Duration) {
        while let Ok(event) = self.events.try_recv() {
            match &event {
                AudioEvent::SceneChanged { scene } => {
                    // Absorbed at the event boundary: a bad scene name must
                    // not halt the pump
                    if let Err(err) = self.set_scene(scene) {
                        tracing::warn!("Scene change dropped: {}", err);
                    }
                }
                AudioEvent::EnterSting | AudioEvent::ExitSting => {
                    self.sting.handle_event(&event, now);
                }
            }
        }
        self.sting.tick(now);
    }

    /// Switch to `name`'s audio set: apply its levels, start its music and
    /// ambience, and hand its sting clips to the machine. Already-active
    /// scenes are a no-op.
    pub fn set_scene(&mut self, name: &str) -> Result<(), AudioError> {
        let Some(scene) = self.scenes.activate(name)?.cloned() else {
            return Ok(());
        };
        self.apply_scene(&scene);
        Ok(())
    }

    fn apply_scene(&mut self, scene: &SceneAudio) {
        self.mixer.set_main_music_volume(scene.main_music_db);
        self.mixer.set_ambience_volume(scene.ambience_db);

        if let Some(bpm) = scene.bpm {
            if let Err(err) = self.sting.set_tempo(bpm) {
                tracing::warn!("Scene '{}' tempo rejected: {}", scene.name, err);
            }
        }

        let clips: Arc<[ClipId]> = scene.sting_clips.iter().cloned().collect();
        self.sting.set_clip_set(clips);

        if let Some(track) = scene.opening_track(&mut self.rng) {
            self.main_channel.play(track);
        } else {
            self.main_channel.stop();
        }

        if let Some(bed) = scene.ambient_bed() {
            self.ambience_channel.play(bed);
        } else {
            self.ambience_channel.stop();
        }

        tracing::info!("Applied scene audio '{}'", scene.name);
    }
}

impl Drop for AudioDirector {
    fn drop(&mut self) {
        // Teardown: leave the bus and silence every channel we drive
        self.bus.unsubscribe(self.subscription);
        self.sting_channel.stop();
        self.main_channel.stop();
        self.ambience_channel.stop();
    }
}
