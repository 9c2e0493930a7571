/// Mixer parameter control
///
/// Named attenuation levels on the master mixer, written through the
/// backend boundary. Peripheral to the sting core: the state machine only
/// issues blend and playback commands, while scene loads and settings
/// screens go through this controller for direct level writes.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::backend::MixerParams;

/// Named mixer parameters (attenuation busses)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MixerParam {
    Master,
    MainMusic,
    Sting,
    Ambience,
    Sfx,
}

impl MixerParam {
    pub const ALL: [MixerParam; 5] = [
        MixerParam::Master,
        MixerParam::MainMusic,
        MixerParam::Sting,
        MixerParam::Ambience,
        MixerParam::Sfx,
    ];

    /// Parameter name as exposed by the mixer asset
    pub fn as_str(&self) -> &'static str {
        match self {
            MixerParam::Master => "MasterVolume",
            MixerParam::MainMusic => "MainMusicVolume",
            MixerParam::Sting => "StingMusicVolume",
            MixerParam::Ambience => "AmbienceVolume",
            MixerParam::Sfx => "SFXVolume",
        }
    }

    /// Default attenuation in dB.
    ///
    /// The sting bus rests at the silence floor; it only comes up when a
    /// snapshot blend brings it in.
    pub fn default_db(&self) -> f32 {
        match self {
            MixerParam::Master => 0.0,
            MixerParam::MainMusic => -20.0,
            MixerParam::Sting => -80.0,
            MixerParam::Ambience => -10.0,
            MixerParam::Sfx => -30.0,
        }
    }
}

impl fmt::Display for MixerParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes mixer levels through the backend and caches the last value per
/// parameter so collaborators can read current levels without a backend
/// round-trip.
pub struct MixerController {
    mixer: Arc<dyn MixerParams>,
    levels: HashMap<MixerParam, f32>,
}

impl MixerController {
    pub fn new(mixer: Arc<dyn MixerParams>) -> Self {
        Self {
            mixer,
            levels: HashMap::new(),
        }
    }

    /// Restore every bus to its default level.
    ///
    /// Called when user settings are undefined or explicitly reset.
    pub fn set_defaults(&mut self) {
        for param in MixerParam::ALL {
            self.set_volume(param, param.default_db());
        }
        tracing::info!("Mixer levels reset to defaults");
    }

    /// Write one parameter in dB and remember it
    pub fn set_volume(&mut self, param: MixerParam, db: f32) {
        self.mixer.set_param(param, db);
        self.levels.insert(param, db);
        tracing::debug!("Mixer {} set to {:.1} dB", param, db);
    }

    /// Last written level for a parameter, if any
    pub fn volume(&self, param: MixerParam) -> Option<f32> {
        self.levels.get(&param).copied()
    }

    pub fn set_master_volume(&mut self, db: f32) {
        self.set_volume(MixerParam::Master, db);
    }

    pub fn set_main_music_volume(&mut self, db: f32) {
        self.set_volume(MixerParam::MainMusic, db);
    }

    pub fn set_sting_volume(&mut self, db: f32) {
        self.set_volume(MixerParam::Sting, db);
    }

    pub fn set_ambience_volume(&mut self, db: f32) {
        self.set_volume(MixerParam::Ambience, db);
    }

    pub fn set_sfx_volume(&mut self, db: f32) {
        self.set_volume(MixerParam::Sfx, db);
    }
}
