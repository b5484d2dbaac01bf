//! Synthesis request model

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Synthesis mode selection
///
/// Exactly one mode is active per request; fields irrelevant to the active
/// mode are ignored (with an advisory), not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Synthesize with a pre-trained voice
    PretrainedVoice,
    /// Clone a voice from a few seconds of prompt audio plus its transcript
    RapidCloning,
    /// Clone a voice across languages from prompt audio alone
    CrossLingual,
    /// Shape a pre-trained voice with natural-language instructions
    InstructControl,
}

impl Mode {
    /// All modes, in presentation order
    pub const ALL: [Mode; 4] = [
        Mode::PretrainedVoice,
        Mode::RapidCloning,
        Mode::CrossLingual,
        Mode::InstructControl,
    ];

    /// Human-readable mode name
    pub fn label(&self) -> &'static str {
        match self {
            Mode::PretrainedVoice => "Pre-trained Voice",
            Mode::RapidCloning => "3s Rapid Cloning",
            Mode::CrossLingual => "Cross-lingual Cloning",
            Mode::InstructControl => "Instruct Control",
        }
    }

    /// Operation steps shown to users of this mode
    pub fn instructions(&self) -> &'static str {
        match self {
            Mode::PretrainedVoice => {
                "1. Select pre-trained voice\n2. Click generate audio button"
            }
            Mode::RapidCloning => {
                "1. Select or record prompt audio (max 30s). File upload takes priority if both provided\n2. Enter prompt text\n3. Click generate audio button"
            }
            Mode::CrossLingual => {
                "1. Select or record prompt audio (max 30s). File upload takes priority if both provided\n2. Click generate audio button"
            }
            Mode::InstructControl => {
                "1. Select pre-trained voice\n2. Enter instruct text\n3. Click generate audio button"
            }
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Prompt-audio sources
///
/// At most one source is effective: an uploaded file takes priority over a
/// recorded capture when both are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptAudio {
    /// Uploaded file reference
    #[serde(default)]
    pub uploaded: Option<PathBuf>,
    /// Microphone-capture file reference
    #[serde(default)]
    pub recorded: Option<PathBuf>,
}

impl PromptAudio {
    /// Resolve the effective source: uploaded, else recorded, else none
    pub fn effective(&self) -> Option<&Path> {
        self.uploaded
            .as_deref()
            .or(self.recorded.as_deref())
    }
}

/// One synthesis request, constructed fresh per caller action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisRequest {
    /// Text to synthesize
    pub text: String,

    /// Active synthesis mode
    pub mode: Mode,

    /// Pre-trained voice identifier; defaults to the engine's first voice
    /// for the modes that need one
    #[serde(default)]
    pub voice: Option<String>,

    /// Transcript of the prompt audio (empty = absent)
    #[serde(default)]
    pub prompt_text: String,

    /// Prompt-audio file references
    #[serde(default)]
    pub prompt_audio: PromptAudio,

    /// Natural-language instruction (empty = absent)
    #[serde(default)]
    pub instruct_text: String,

    /// Seed for the engine's random source
    #[serde(default)]
    pub seed: i64,

    /// Stream output incrementally
    #[serde(default)]
    pub streaming: bool,

    /// Speed multiplier in [0.5, 2.0]
    #[serde(default = "default_speed")]
    pub speed: f32,
}

fn default_speed() -> f32 {
    1.0
}

impl SynthesisRequest {
    /// Minimal request for the given mode and text
    pub fn new(mode: Mode, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode,
            voice: None,
            prompt_text: String::new(),
            prompt_audio: PromptAudio::default(),
            instruct_text: String::new(),
            seed: 0,
            streaming: false,
            speed: default_speed(),
        }
    }
}
