/// Rodio-backed mixer and playback channels
///
/// Clips are preloaded into memory so playback never blocks on disk, and
/// each clip is decoded once at load time to fail fast on bad files. The
/// mixer has no native snapshot support, so named snapshots are per-channel
/// dB maps and a blend is a stepped volume ramp on a background thread.
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use super::{db_to_linear, AudioChannel, ClipId, MixerParams, SnapshotBlender, SnapshotId};
use crate::error::AudioError;
use crate::mixer::MixerParam;

/// Number of volume steps in a blend ramp
const BLEND_STEPS: u32 = 50;

/// One playback channel with an in-memory clip library
pub struct RodioChannel {
    param: MixerParam,
    stream_handle: OutputStreamHandle,
    sink: Arc<Mutex<Sink>>,
    library: RwLock<HashMap<ClipId, Arc<Vec<u8>>>>,
    volume: Mutex<f32>,
}

impl RodioChannel {
    fn new(param: MixerParam, stream_handle: OutputStreamHandle) -> Result<Self, AudioError> {
        let sink = Sink::try_new(&stream_handle)
            .map_err(|e| AudioError::StreamInitFailed(Box::new(e)))?;

        Ok(Self {
            param,
            stream_handle,
            sink: Arc::new(Mutex::new(sink)),
            library: RwLock::new(HashMap::new()),
            volume: Mutex::new(1.0),
        })
    }

    pub fn param(&self) -> MixerParam {
        self.param
    }

    /// Preload a clip from disk and verify it decodes
    pub fn load_clip(&self, id: ClipId, path: &Path) -> Result<(), AudioError> {
        let bytes = std::fs::read(path).map_err(|e| AudioError::ClipLoadFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        // Decode once up front so a corrupt file fails at load, not mid-game
        let decoder =
            Decoder::new(Cursor::new(bytes.clone())).map_err(|e| AudioError::ClipLoadFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })?;
        drop(decoder);

        tracing::info!(
            "Loaded clip '{}' for {} channel ({} bytes)",
            id,
            self.param,
            bytes.len()
        );
        self.library.write().insert(id, Arc::new(bytes));
        Ok(())
    }

    /// Preload a clip from raw bytes (tests, embedded assets)
    pub fn load_clip_from_memory(&self, id: ClipId, bytes: Arc<Vec<u8>>) {
        self.library.write().insert(id, bytes);
    }

    pub fn loaded_count(&self) -> usize {
        self.library.read().len()
    }

    fn current_volume(&self) -> f32 {
        *self.volume.lock()
    }

    // rodio's Decoder needs owned data with 'static lifetime
    fn decoded(&self, clip: &ClipId) -> Option<Decoder<Cursor<Vec<u8>>>> {
        let Some(bytes) = self.library.read().get(clip).cloned() else {
            tracing::warn!("No clip '{}' loaded on {} channel", clip, self.param);
            return None;
        };

        match Decoder::new(Cursor::new((*bytes).clone())) {
            Ok(d) => Some(d),
            Err(e) => {
                tracing::warn!("Failed to decode clip '{}': {}", clip, e);
                None
            }
        }
    }

    fn start(&self, clip: &ClipId, looped: bool) {
        let Some(decoder) = self.decoded(clip) else {
            return;
        };

        let mut sink = self.sink.lock();
        sink.stop();
        // A stopped sink stays stopped; swap in a fresh one to clear the queue
        match Sink::try_new(&self.stream_handle) {
            Ok(new_sink) => *sink = new_sink,
            Err(e) => {
                tracing::warn!("Failed to reset {} channel sink: {}", self.param, e);
                return;
            }
        }

        sink.set_volume(self.current_volume());
        if looped {
            sink.append(decoder.repeat_infinite());
        } else {
            sink.append(decoder);
        }
        sink.play();
        tracing::debug!(
            "Playing clip '{}' on {} channel{}",
            clip,
            self.param,
            if looped { " (looping)" } else { "" }
        );
    }
}

impl AudioChannel for RodioChannel {
    fn play(&self, clip: &ClipId) {
        self.start(clip, false);
    }

    fn play_one_shot(&self, clip: &ClipId) {
        let Some(decoder) = self.decoded(clip) else {
            return;
        };

        // Detached sinks run to completion on their own; the channel's
        // current clip and its sink are never touched
        match Sink::try_new(&self.stream_handle) {
            Ok(sink) => {
                sink.set_volume(self.current_volume());
                sink.append(decoder);
                sink.detach();
                tracing::debug!("Overlaying clip '{}' on {} channel", clip, self.param);
            }
            Err(e) => {
                tracing::warn!("Failed to open one-shot sink on {} channel: {}", self.param, e);
            }
        }
    }

    fn play_looping(&self, clip: &ClipId) {
        self.start(clip, true);
    }

    fn stop(&self) {
        let mut sink = self.sink.lock();
        sink.stop();
        if let Ok(new_sink) = Sink::try_new(&self.stream_handle) {
            *sink = new_sink;
        }
        tracing::debug!("Stopped {} channel", self.param);
    }

    fn is_playing(&self) -> bool {
        let sink = self.sink.lock();
        !sink.empty() && !sink.is_paused()
    }

    fn set_volume(&self, linear: f32) {
        let clamped = linear.clamp(0.0, 1.0);
        *self.volume.lock() = clamped;
        self.sink.lock().set_volume(clamped);
    }
}

/// Named snapshot: target level per channel, in decibels
type SnapshotLevels = HashMap<MixerParam, f32>;

/// Rodio-backed mixer: one output stream, one sink per named channel.
///
/// Implements both sides of the backend boundary: parameter writes in dB
/// and fire-and-forget snapshot blends.
pub struct RodioMixer {
    channels: HashMap<MixerParam, Arc<RodioChannel>>,
    snapshots: RwLock<HashMap<SnapshotId, SnapshotLevels>>,
    levels: Arc<Mutex<HashMap<MixerParam, f32>>>,
    // Bumped on every blend; ramp threads from older blends stand down
    blend_epoch: Arc<AtomicU64>,
}

impl RodioMixer {
    /// Open the default output device and create all channels.
    ///
    /// The `OutputStream` is returned to the caller rather than stored: it
    /// is not `Send`, and playback dies when it drops, so it must live on
    /// the thread that owns the application for as long as audio runs.
    pub fn new() -> Result<(OutputStream, Self), AudioError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| AudioError::StreamInitFailed(Box::new(e)))?;

        let mut channels = HashMap::new();
        for param in MixerParam::ALL {
            channels.insert(param, Arc::new(RodioChannel::new(param, stream_handle.clone())?));
        }

        let mixer = Self {
            channels,
            snapshots: RwLock::new(HashMap::new()),
            levels: Arc::new(Mutex::new(HashMap::new())),
            blend_epoch: Arc::new(AtomicU64::new(0)),
        };
        Ok((stream, mixer))
    }

    /// Shared handle to one playback channel
    pub fn channel(&self, param: MixerParam) -> Arc<RodioChannel> {
        Arc::clone(&self.channels[&param])
    }

    /// Register (or replace) a named snapshot
    pub fn register_snapshot(&self, id: SnapshotId, levels: SnapshotLevels) {
        self.snapshots.write().insert(id, levels);
    }

    fn apply_levels(&self, levels: &SnapshotLevels) {
        let mut cache = self.levels.lock();
        for (&param, &db) in levels {
            if let Some(channel) = self.channels.get(&param) {
                channel.set_volume(db_to_linear(db));
            }
            cache.insert(param, db);
        }
    }
}

impl MixerParams for RodioMixer {
    fn set_param(&self, param: MixerParam, db: f32) {
        if let Some(channel) = self.channels.get(&param) {
            channel.set_volume(db_to_linear(db));
        }
        self.levels.lock().insert(param, db);
    }
}

impl SnapshotBlender for RodioMixer {
    fn blend_to(&self, target: &SnapshotId, duration: Duration) {
        let Some(levels) = self.snapshots.read().get(target).cloned() else {
            // Best-effort boundary: an unknown snapshot must not fault gameplay
            tracing::warn!("{}", AudioError::UnknownSnapshot(target.to_string()));
            return;
        };

        // Every blend owns the channels from here on; whatever ramp is
        // still in flight stands down at its next step
        let epoch = self.blend_epoch.fetch_add(1, Ordering::SeqCst) + 1;

        if duration.is_zero() {
            tracing::debug!("Switching mixer to snapshot '{}' immediately", target);
            self.apply_levels(&levels);
            return;
        }

        // Capture only Send handles; the ramp runs off-thread like any fade
        let ramps: Vec<(Arc<RodioChannel>, f32, f32)> = {
            let cache = self.levels.lock();
            levels
                .iter()
                .filter_map(|(&param, &to_db)| {
                    let channel = self.channels.get(&param)?;
                    let from_db = cache.get(&param).copied().unwrap_or(to_db);
                    Some((Arc::clone(channel), from_db, to_db))
                })
                .collect()
        };
        let cache = Arc::clone(&self.levels);
        let epochs = Arc::clone(&self.blend_epoch);
        let snapshot_name = target.to_string();

        thread::spawn(move || {
            let step_duration = duration / BLEND_STEPS;
            let completed = run_ramp(epoch, &epochs, BLEND_STEPS, step_duration, |t| {
                for (channel, from_db, to_db) in &ramps {
                    let db = from_db + (to_db - from_db) * t;
                    channel.set_volume(db_to_linear(db));
                }
            });

            if !completed {
                tracing::debug!("Blend to snapshot '{}' superseded mid-ramp", snapshot_name);
                return;
            }

            let mut cache = cache.lock();
            for (channel, _, to_db) in &ramps {
                cache.insert(channel.param(), *to_db);
            }
            tracing::debug!("Blend to snapshot '{}' finished", snapshot_name);
        });

        tracing::debug!(
            "Blending mixer to snapshot '{}' over {:.3}s",
            target,
            duration.as_secs_f32()
        );
    }
}

/// Step a volume ramp, standing down as soon as a newer blend has bumped
/// the epoch. Returns whether the ramp ran to completion; a superseded
/// ramp must not write its target levels anywhere.
fn run_ramp(
    epoch: u64,
    epochs: &AtomicU64,
    steps: u32,
    step_duration: Duration,
    mut apply: impl FnMut(f32),
) -> bool {
    for step in 1..=steps {
        thread::sleep(step_duration);
        if epochs.load(Ordering::SeqCst) != epoch {
            return false;
        }
        apply(step as f32 / steps as f32);
    }
    epochs.load(Ordering::SeqCst) == epoch
}

#[cfg(test)]
mod tests {
    use super::*;

    // Opening an output stream needs real audio hardware, so these tests
    // cover only the pieces that run without a device.

    #[test]
    fn test_snapshot_levels_shape() {
        let mut levels = SnapshotLevels::new();
        levels.insert(MixerParam::Sting, 0.0);
        levels.insert(MixerParam::MainMusic, -30.0);

        assert_eq!(levels.len(), 2);
        assert_eq!(levels[&MixerParam::Sting], 0.0);
    }

    #[test]
    fn test_blend_step_count_divides_short_fades() {
        // A 0.375s fade at 50 steps still yields a nonzero sleep per step
        let step = Duration::from_secs_f32(0.375) / BLEND_STEPS;
        assert!(step > Duration::ZERO);
    }

    #[test]
    fn test_ramp_completes_when_unsuperseded() {
        let epochs = AtomicU64::new(1);
        let mut seen = Vec::new();

        let completed = run_ramp(1, &epochs, 4, Duration::ZERO, |t| seen.push(t));

        assert!(completed);
        assert_eq!(seen, vec![0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_ramp_stands_down_when_superseded() {
        // A slow exit fade must stop writing volumes the moment a re-entry
        // blend starts, or it finishes last and silences the new mix
        let epochs = AtomicU64::new(1);
        let mut seen = Vec::new();

        let completed = run_ramp(1, &epochs, 4, Duration::ZERO, |t| {
            seen.push(t);
            if t >= 0.5 {
                // A newer blend begins here
                epochs.store(2, Ordering::SeqCst);
            }
        });

        assert!(!completed);
        assert_eq!(seen, vec![0.25, 0.5]);
    }

    #[test]
    fn test_stale_ramp_never_applies() {
        let epochs = AtomicU64::new(7);
        let mut applied = 0;

        let completed = run_ramp(3, &epochs, 4, Duration::ZERO, |_| applied += 1);

        assert!(!completed);
        assert_eq!(applied, 0);
    }
}
