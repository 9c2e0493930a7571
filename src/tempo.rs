/// Tempo-derived fade timing
///
/// Sting transitions are musically synchronized: the fade-in covers one
/// quarter note so the sting lands on the beat, and the fade-out stretches
/// over sixteen quarter notes (8 bars in 4/4) so the calm mix returns slowly.
use std::time::Duration;

use crate::error::AudioError;

/// Fade-in length in quarter notes
const FADE_IN_QUARTER_NOTES: f32 = 0.8;

/// Fade-out length in quarter notes (8 bars)
const FADE_OUT_QUARTER_NOTES: f32 = 16.0;

/// Derives snapshot fade durations from a beats-per-minute value.
///
/// All durations are precomputed at construction; reads are pure and safe
/// from any thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoClock {
    bpm: f32,
    quarter_note_secs: f32,
    fade_in_secs: f32,
    fade_out_secs: f32,
}

impl TempoClock {
    /// Default tempo used by scene data that doesn't declare one
    pub const DEFAULT_BPM: f32 = 128.0;

    /// Create a clock for the given tempo.
    ///
    /// Fails with `AudioError::InvalidTempo` when `bpm` is zero, negative,
    /// or not finite.
    pub fn new(bpm: f32) -> Result<Self, AudioError> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(AudioError::InvalidTempo { bpm });
        }

        let quarter_note_secs = 60.0 / bpm;
        Ok(Self {
            bpm,
            quarter_note_secs,
            fade_in_secs: quarter_note_secs * FADE_IN_QUARTER_NOTES,
            fade_out_secs: quarter_note_secs * FADE_OUT_QUARTER_NOTES,
        })
    }

    /// Replace the tempo, revalidating and recomputing all durations
    pub fn set_bpm(&mut self, bpm: f32) -> Result<(), AudioError> {
        *self = Self::new(bpm)?;
        Ok(())
    }

    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    /// Length of one quarter note in seconds
    pub fn quarter_note_secs(&self) -> f32 {
        self.quarter_note_secs
    }

    /// Fade-in length in seconds (fast: under one quarter note)
    pub fn fade_in_secs(&self) -> f32 {
        self.fade_in_secs
    }

    /// Fade-out length in seconds (slow: 8 bars)
    pub fn fade_out_secs(&self) -> f32 {
        self.fade_out_secs
    }

    pub fn fade_in_duration(&self) -> Duration {
        Duration::from_secs_f32(self.fade_in_secs)
    }

    pub fn fade_out_duration(&self) -> Duration {
        Duration::from_secs_f32(self.fade_out_secs)
    }
}

impl Default for TempoClock {
    fn default() -> Self {
        let quarter_note_secs = 60.0 / Self::DEFAULT_BPM;
        Self {
            bpm: Self::DEFAULT_BPM,
            quarter_note_secs,
            fade_in_secs: quarter_note_secs * FADE_IN_QUARTER_NOTES,
            fade_out_secs: quarter_note_secs * FADE_OUT_QUARTER_NOTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_durations_follow_tempo() {
        for bpm in [60.0_f32, 90.0, 128.0, 174.0] {
            let clock = TempoClock::new(bpm).unwrap();
            let quarter = 60.0 / bpm;
            assert_eq!(clock.quarter_note_secs(), quarter);
            assert_eq!(clock.fade_in_secs(), quarter * 0.8);
            assert_eq!(clock.fade_out_secs(), quarter * 16.0);
        }
    }

    #[test]
    fn test_invalid_tempo_rejected() {
        for bpm in [0.0_f32, -5.0, f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let result = TempoClock::new(bpm);
            assert!(
                matches!(result, Err(AudioError::InvalidTempo { .. })),
                "bpm {bpm} should be rejected"
            );
        }
    }

    #[test]
    fn test_reference_tempo_128() {
        // 128 bpm: quarter note 0.46875s, fade in 0.375s, fade out 7.5s
        let clock = TempoClock::new(128.0).unwrap();
        assert_eq!(clock.quarter_note_secs(), 0.46875);
        assert_eq!(clock.fade_in_secs(), 0.375);
        assert_eq!(clock.fade_out_secs(), 7.5);
        assert_eq!(clock.fade_out_duration(), Duration::from_millis(7500));
    }

    #[test]
    fn test_set_bpm_recomputes() {
        let mut clock = TempoClock::new(128.0).unwrap();
        clock.set_bpm(60.0).unwrap();
        assert_eq!(clock.quarter_note_secs(), 1.0);
        assert_eq!(clock.fade_out_secs(), 16.0);

        // Invalid update leaves the clock untouched
        assert!(clock.set_bpm(0.0).is_err());
        assert_eq!(clock.bpm(), 60.0);
    }

    #[test]
    fn test_default_clock() {
        let clock = TempoClock::default();
        assert_eq!(clock.bpm(), TempoClock::DEFAULT_BPM);
    }
}
