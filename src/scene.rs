/// Per-scene audio data and switching
///
/// Each scene ships its own music, ambience, and sting clip lists plus the
/// levels they should play at. The library owns the scene data; activation
/// only changes which entry is current, it never starts playback itself —
/// that's the director's job.
use std::fs;
use std::path::Path;

use anyhow::Context;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::backend::ClipId;
use crate::error::{AppResult, AudioError};

/// Audio set for one scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneAudio {
    pub name: String,

    /// Main background tracks; one is chosen at random on activation
    #[serde(default)]
    pub main_music: Vec<ClipId>,

    /// One-shot sting clips for this scene's intense moments
    #[serde(default)]
    pub sting_clips: Vec<ClipId>,

    /// Ambient beds; the first entry plays on activation
    #[serde(default)]
    pub ambient_sound: Vec<ClipId>,

    /// Main music level in dB
    pub main_music_db: f32,

    /// Ambience level in dB
    pub ambience_db: f32,

    /// When set, the first main track always opens the scene instead of a
    /// random pick
    #[serde(default)]
    pub play_init_track: bool,

    /// Scene tempo driving sting fade timings; the previous tempo is kept
    /// when absent
    #[serde(default)]
    pub bpm: Option<f32>,
}

impl SceneAudio {
    /// Choose the track that should open the scene
    pub fn opening_track<R: Rng>(&self, rng: &mut R) -> Option<&ClipId> {
        if self.main_music.is_empty() {
            return None;
        }
        if self.play_init_track {
            self.main_music.first()
        } else {
            self.main_music.get(rng.gen_range(0..self.main_music.len()))
        }
    }

    /// Random main track, skipping the intro at index 0
    pub fn random_track_excluding_init<R: Rng>(&self, rng: &mut R) -> Option<&ClipId> {
        if self.main_music.len() < 2 {
            return None;
        }
        self.main_music.get(rng.gen_range(1..self.main_music.len()))
    }

    /// First ambient bed, if the scene has one
    pub fn ambient_bed(&self) -> Option<&ClipId> {
        self.ambient_sound.first()
    }
}

/// Ordered collection of scene audio sets with one current scene.
///
/// The first scene is active from construction, matching how the boot
/// scene's audio comes up before any explicit switch.
pub struct SceneLibrary {
    scenes: Vec<SceneAudio>,
    current: usize,
}

impl SceneLibrary {
    pub fn new(scenes: Vec<SceneAudio>) -> Self {
        Self { scenes, current: 0 }
    }

    /// Load scene definitions from a JSON file
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene audio data from {}", path.display()))?;
        let scenes: Vec<SceneAudio> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid scene audio data in {}", path.display()))?;

        tracing::info!("Loaded {} scene audio set(s) from {}", scenes.len(), path.display());
        Ok(Self::new(scenes))
    }

    pub fn current(&self) -> Option<&SceneAudio> {
        self.scenes.get(self.current)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Make `name` the current scene.
    ///
    /// Returns the newly activated scene, `None` when it was already
    /// current (a logged no-op), or `UnknownScene` if no scene has that
    /// name.
    pub fn activate(&mut self, name: &str) -> Result<Option<&SceneAudio>, AudioError> {
        if self.current().is_some_and(|s| s.name == name) {
            tracing::debug!("Scene audio '{}' is already active", name);
            return Ok(None);
        }

        match self.scenes.iter().position(|s| s.name == name) {
            Some(index) => {
                self.current = index;
                tracing::info!("Scene audio switched to '{}'", name);
                Ok(Some(&self.scenes[index]))
            }
            None => Err(AudioError::UnknownScene(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scene(name: &str, tracks: &[&str]) -> SceneAudio {
        SceneAudio {
            name: name.to_string(),
            main_music: tracks.iter().map(|t| ClipId::from(*t)).collect(),
            sting_clips: Vec::new(),
            ambient_sound: Vec::new(),
            main_music_db: -20.0,
            ambience_db: -10.0,
            play_init_track: false,
            bpm: None,
        }
    }

    #[test]
    fn test_first_scene_active_by_default() {
        let library = SceneLibrary::new(vec![scene("Intro", &[]), scene("Chase", &[])]);
        assert_eq!(library.current().unwrap().name, "Intro");
    }

    #[test]
    fn test_activate_switches_scene() {
        let mut library = SceneLibrary::new(vec![scene("Intro", &[]), scene("Chase", &[])]);

        let activated = library.activate("Chase").unwrap();
        assert_eq!(activated.unwrap().name, "Chase");
        assert_eq!(library.current().unwrap().name, "Chase");
    }

    #[test]
    fn test_activate_current_scene_is_noop() {
        let mut library = SceneLibrary::new(vec![scene("Intro", &[]), scene("Chase", &[])]);

        assert!(library.activate("Intro").unwrap().is_none());
        assert_eq!(library.current().unwrap().name, "Intro");
    }

    #[test]
    fn test_activate_unknown_scene_fails() {
        let mut library = SceneLibrary::new(vec![scene("Intro", &[])]);

        let result = library.activate("Basement");
        assert!(matches!(result, Err(AudioError::UnknownScene(name)) if name == "Basement"));
        // Current scene is untouched after the failure
        assert_eq!(library.current().unwrap().name, "Intro");
    }

    #[test]
    fn test_opening_track_selection() {
        let mut rng = StdRng::seed_from_u64(5);

        let empty = scene("Empty", &[]);
        assert_eq!(empty.opening_track(&mut rng), None);

        let tracks = scene("Multi", &["intro", "a", "b"]);
        for _ in 0..30 {
            let pick = tracks.opening_track(&mut rng).unwrap();
            assert!(tracks.main_music.contains(pick));
        }

        let mut pinned = scene("Pinned", &["intro", "a", "b"]);
        pinned.play_init_track = true;
        for _ in 0..10 {
            assert_eq!(pinned.opening_track(&mut rng), Some(&ClipId::from("intro")));
        }
    }

    #[test]
    fn test_random_track_excluding_init() {
        let mut rng = StdRng::seed_from_u64(5);
        let tracks = scene("Multi", &["intro", "a", "b"]);

        for _ in 0..30 {
            let pick = tracks.random_track_excluding_init(&mut rng).unwrap();
            assert_ne!(pick, &ClipId::from("intro"));
        }

        let single = scene("Single", &["intro"]);
        assert_eq!(single.random_track_excluding_init(&mut rng), None);
    }

    #[test]
    fn test_scene_data_deserializes() {
        let json = r#"[{
            "name": "PoliceChase",
            "main_music": ["chase_theme"],
            "sting_clips": ["sting_a", "sting_b"],
            "ambient_sound": ["city_rumble"],
            "main_music_db": -18.0,
            "ambience_db": -12.0,
            "bpm": 140.0
        }]"#;

        let scenes: Vec<SceneAudio> = serde_json::from_str(json).unwrap();
        assert_eq!(scenes.len(), 1);

        let chase = &scenes[0];
        assert_eq!(chase.name, "PoliceChase");
        assert_eq!(chase.sting_clips.len(), 2);
        assert_eq!(chase.ambient_bed(), Some(&ClipId::from("city_rumble")));
        assert_eq!(chase.bpm, Some(140.0));
        assert!(!chase.play_init_track);
    }
}
