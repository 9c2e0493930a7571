/// Sting transition state machine
///
/// Converts enter/exit sting events into timed crossfades between the calm
/// and intense mixer snapshots and schedules the delayed stop of the sting
/// channel once the fade-out has run its course.
///
/// Blends are fire-and-forget, so Active is reached optimistically the
/// moment the blend is requested; there is no observable fading-in state.
use std::sync::Arc;
use std::time::Duration;

use crate::backend::{ClipId, SnapshotBlender, SnapshotId};
use crate::error::AudioError;
use crate::messaging::AudioEvent;
use crate::scheduler::{Scheduler, TimerHandle};
use crate::tempo::TempoClock;

use super::player::StingPlayer;

/// State of the sting lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StingState {
    /// No sting; the calm snapshot is (or is becoming) current
    #[default]
    Calm,

    /// A sting is playing and the intense snapshot was requested
    Active,

    /// Fading back to calm; a deferred stop is pending
    FadingOut,
}

impl StingState {
    pub fn is_calm(&self) -> bool {
        matches!(self, StingState::Calm)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, StingState::Active)
    }

    pub fn is_fading_out(&self) -> bool {
        matches!(self, StingState::FadingOut)
    }

    /// Get a human-readable description of the state
    pub fn description(&self) -> &'static str {
        match self {
            StingState::Calm => "Calm",
            StingState::Active => "Active",
            StingState::FadingOut => "Fading out",
        }
    }
}

/// Deferred work owned by the machine's timer queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StingTimeout {
    /// Halt the sting channel after the fade-out completes
    StopSting,
}

/// Mutable state of one sting lifecycle. Exactly one session exists per
/// machine; it is owned exclusively by `StingControl`.
#[derive(Debug, Default)]
pub struct StingSession {
    state: StingState,
    active_clip: Option<ClipId>,
    fade_out_deadline: Option<Duration>,
    pending_stop: Option<TimerHandle>,
}

impl StingSession {
    pub fn state(&self) -> StingState {
        self.state
    }

    pub fn active_clip(&self) -> Option<&ClipId> {
        self.active_clip.as_ref()
    }

    pub fn fade_out_deadline(&self) -> Option<Duration> {
        self.fade_out_deadline
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The sting transition core.
///
/// Events are handled one at a time; hosts that dispatch from more than
/// one thread (physics triggers plus script calls) must put the machine
/// behind a single mutex so each event is fully processed before the next
/// begins. `AudioDirector` does exactly that.
pub struct StingControl {
    tempo: TempoClock,
    player: StingPlayer,
    blender: Arc<dyn SnapshotBlender>,
    calm: SnapshotId,
    intense: SnapshotId,
    clips: Arc<[ClipId]>,
    session: StingSession,
    timers: Scheduler<StingTimeout>,
}

impl StingControl {
    pub fn builder() -> StingControlBuilder {
        StingControlBuilder::default()
    }

    pub fn state(&self) -> StingState {
        self.session.state
    }

    pub fn session(&self) -> &StingSession {
        &self.session
    }

    pub fn tempo(&self) -> &TempoClock {
        &self.tempo
    }

    /// Replace the tempo; durations apply from the next transition
    pub fn set_tempo(&mut self, bpm: f32) -> Result<(), AudioError> {
        self.tempo.set_bpm(bpm)
    }

    /// Swap in the active scene's sting clips. The set is shared, not
    /// copied; scene data stays the owner.
    pub fn set_clip_set(&mut self, clips: Arc<[ClipId]>) {
        self.clips = clips;
    }

    /// Process one gameplay event at logical time `now`
    pub fn handle_event(&mut self, event: &AudioEvent, now: Duration) {
        match event {
            AudioEvent::EnterSting => self.enter_sting(now),
            AudioEvent::ExitSting => self.exit_sting(now),
            AudioEvent::SceneChanged { .. } => {}
        }
    }

    /// Crossfade into the intense mix and start a sting clip.
    ///
    /// Valid from every state: from FadingOut the pending stop is cancelled
    /// first (a re-entrant sting takes priority over the scheduled stop),
    /// and from Active the sting simply restarts with a fresh random clip.
    pub fn enter_sting(&mut self, _now: Duration) {
        self.cancel_pending_stop();

        match self.player.play_random(&self.clips) {
            Ok(clip) => {
                let fade_in = self.tempo.fade_in_duration();
                self.blender.blend_to(&self.intense, fade_in);
                tracing::info!(
                    "Sting {} -> Active: '{}' over {:.3}s",
                    self.session.state.description(),
                    clip,
                    fade_in.as_secs_f32()
                );
                self.session.state = StingState::Active;
                self.session.active_clip = Some(clip);
                self.session.fade_out_deadline = None;
            }
            Err(err) => {
                // Stay recoverable: no blend was issued, so make sure the
                // channel is quiet and settle back to Calm.
                tracing::warn!("Sting request dropped: {}", err);
                self.player.stop();
                self.session.reset();
            }
        }
    }

    /// Begin the fade back to calm and schedule the deferred stop.
    ///
    /// Only meaningful while Active; from Calm or FadingOut the event is
    /// ignored (the fade already happened or never started).
    pub fn exit_sting(&mut self, now: Duration) {
        if !self.session.state.is_active() {
            tracing::debug!(
                "ExitSting ignored in state {}",
                self.session.state.description()
            );
            return;
        }

        let fade_out = self.tempo.fade_out_duration();
        self.blender.blend_to(&self.calm, fade_out);

        let deadline = now + fade_out;
        let handle = self.timers.schedule(deadline, StingTimeout::StopSting);
        self.session.state = StingState::FadingOut;
        self.session.fade_out_deadline = Some(deadline);
        self.session.pending_stop = Some(handle);

        tracing::info!(
            "Sting Active -> Fading out over {:.3}s, stop at t={:.3}s",
            fade_out.as_secs_f32(),
            deadline.as_secs_f32()
        );
    }

    /// Advance logical time, firing any deferred stop that has come due
    pub fn tick(&mut self, now: Duration) {
        for timeout in self.timers.pop_due(now) {
            match timeout {
                StingTimeout::StopSting => {
                    tracing::info!("Sting fade-out complete, stopping channel");
                    self.player.stop();
                    self.session.reset();
                }
            }
        }
    }

    /// Earliest time `tick` has pending work, for hosts that sleep
    pub fn next_timer_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    fn cancel_pending_stop(&mut self) {
        if let Some(handle) = self.session.pending_stop.take() {
            self.timers.cancel(handle);
            tracing::debug!("Cancelled pending sting stop");
        }
    }
}

/// Assembles a `StingControl`, validating collaborators up front.
///
/// A missing player or blender is a configuration fault and fails the
/// build with `MisconfiguredCollaborator`; it is not recoverable
/// mid-session.
#[derive(Default)]
pub struct StingControlBuilder {
    tempo: Option<TempoClock>,
    player: Option<StingPlayer>,
    blender: Option<Arc<dyn SnapshotBlender>>,
    calm: Option<SnapshotId>,
    intense: Option<SnapshotId>,
    clips: Option<Arc<[ClipId]>>,
}

impl StingControlBuilder {
    pub fn tempo(mut self, tempo: TempoClock) -> Self {
        self.tempo = Some(tempo);
        self
    }

    pub fn player(mut self, player: StingPlayer) -> Self {
        self.player = Some(player);
        self
    }

    pub fn blender(mut self, blender: Arc<dyn SnapshotBlender>) -> Self {
        self.blender = Some(blender);
        self
    }

    /// Override the default "calm"/"intense" snapshot handles
    pub fn snapshots(mut self, calm: SnapshotId, intense: SnapshotId) -> Self {
        self.calm = Some(calm);
        self.intense = Some(intense);
        self
    }

    pub fn clips(mut self, clips: Arc<[ClipId]>) -> Self {
        self.clips = Some(clips);
        self
    }

    pub fn build(self) -> Result<StingControl, AudioError> {
        let player = self
            .player
            .ok_or(AudioError::MisconfiguredCollaborator("sting player"))?;
        let blender = self
            .blender
            .ok_or(AudioError::MisconfiguredCollaborator("snapshot blender"))?;

        Ok(StingControl {
            tempo: self.tempo.unwrap_or_default(),
            player,
            blender,
            calm: self.calm.unwrap_or_else(|| SnapshotId::from("calm")),
            intense: self.intense.unwrap_or_else(|| SnapshotId::from("intense")),
            clips: self.clips.unwrap_or_else(|| Arc::from(Vec::new())),
            session: StingSession::default(),
            timers: Scheduler::new(),
        })
    }
}
