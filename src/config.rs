use crate::error::{Result, VadsplitError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// WebRTC VAD aggressiveness mode.
///
/// Higher modes are stricter about what counts as speech, trading missed
/// quiet speech for fewer false positives in noisy audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggressiveness {
    Quality,
    LowBitrate,
    Aggressive,
    #[default]
    VeryAggressive,
}

impl std::fmt::Display for Aggressiveness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Aggressiveness::Quality => write!(f, "quality"),
            Aggressiveness::LowBitrate => write!(f, "lowbitrate"),
            Aggressiveness::Aggressive => write!(f, "aggressive"),
            Aggressiveness::VeryAggressive => write!(f, "veryaggressive"),
        }
    }
}

impl std::str::FromStr for Aggressiveness {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quality" | "0" => Ok(Aggressiveness::Quality),
            "lowbitrate" | "1" => Ok(Aggressiveness::LowBitrate),
            "aggressive" | "2" => Ok(Aggressiveness::Aggressive),
            "veryaggressive" | "3" => Ok(Aggressiveness::VeryAggressive),
            _ => Err(format!(
                "Unknown aggressiveness: {}. Use 'quality', 'lowbitrate', 'aggressive', or 'veryaggressive'",
                s
            )),
        }
    }
}

/// Which frame classifier backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    #[default]
    Webrtc,
    Energy,
}

impl std::fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifierKind::Webrtc => write!(f, "webrtc"),
            ClassifierKind::Energy => write!(f, "energy"),
        }
    }
}

impl std::str::FromStr for ClassifierKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "webrtc" => Ok(ClassifierKind::Webrtc),
            "energy" => Ok(ClassifierKind::Energy),
            _ => Err(format!(
                "Unknown classifier: {}. Use 'webrtc' or 'energy'",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Duration of one VAD frame in milliseconds.
    pub frame_duration_ms: u32,
    /// Maximum accumulated speech per chunk, in seconds.
    pub max_chunk_duration_secs: f64,
    /// WebRTC VAD aggressiveness.
    pub aggressiveness: Aggressiveness,
    /// Classifier backend.
    pub classifier: ClassifierKind,
    /// RMS threshold for the energy classifier (0.0 to 1.0).
    pub energy_threshold: f32,
    /// Directory chunk files are written to.
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_duration_ms: 30,
            max_chunk_duration_secs: 15.0,
            aggressiveness: Aggressiveness::default(),
            classifier: ClassifierKind::default(),
            energy_threshold: 0.01,
            output_dir: PathBuf::from("chunks"),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                if let Ok(file_config) = toml::from_str::<Config>(&contents) {
                    config = file_config;
                }
            }
        }

        // Override with environment variables
        if let Ok(ms) = std::env::var("VADSPLIT_FRAME_DURATION_MS") {
            if let Ok(v) = ms.parse() {
                config.frame_duration_ms = v;
            }
        }
        if let Ok(secs) = std::env::var("VADSPLIT_MAX_CHUNK_DURATION") {
            if let Ok(v) = secs.parse() {
                config.max_chunk_duration_secs = v;
            }
        }
        if let Ok(mode) = std::env::var("VADSPLIT_AGGRESSIVENESS") {
            if let Ok(a) = mode.parse() {
                config.aggressiveness = a;
            }
        }
        if let Ok(kind) = std::env::var("VADSPLIT_CLASSIFIER") {
            if let Ok(c) = kind.parse() {
                config.classifier = c;
            }
        }
        if let Ok(threshold) = std::env::var("VADSPLIT_ENERGY_THRESHOLD") {
            if let Ok(t) = threshold.parse() {
                config.energy_threshold = t;
            }
        }
        if let Ok(dir) = std::env::var("VADSPLIT_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_duration_ms == 0 {
            return Err(VadsplitError::Config(
                "frame_duration_ms must be greater than 0".to_string(),
            ));
        }

        if self.max_chunk_duration_secs <= 0.0 || !self.max_chunk_duration_secs.is_finite() {
            return Err(VadsplitError::Config(
                "max_chunk_duration_secs must be greater than 0".to_string(),
            ));
        }

        if self.classifier == ClassifierKind::Energy
            && !(0.0..=1.0).contains(&self.energy_threshold)
        {
            return Err(VadsplitError::Config(
                "energy_threshold must be between 0.0 and 1.0".to_string(),
            ));
        }

        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vadsplit").join("config.toml"))
    }
}
