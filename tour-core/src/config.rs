//! Configuration for the tour simulation.
//!
//! Maps directly to `tour.toml`. Every field has a default, so an empty file
//! (or no file at all) yields the stock campus tour.

use serde::{Deserialize, Serialize};

use crate::types::Arena;

/// Top-level tour configuration, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TourConfig {
    /// Walkable bounds.
    #[serde(default)]
    pub arena: Arena,
    /// Player movement settings.
    #[serde(default)]
    pub player: PlayerConfig,
    /// Look (yaw) settings.
    #[serde(default)]
    pub look: LookConfig,
    /// Camera projection and dance wobble.
    #[serde(default)]
    pub camera: CameraConfig,
    /// Interaction radius and prompts.
    #[serde(default)]
    pub interaction: InteractionConfig,
    /// Dialogue presentation.
    #[serde(default)]
    pub dialogue: DialogueConfig,
    /// Character idle/dance animation tuning.
    #[serde(default)]
    pub animation: AnimationConfig,
    /// Remote reply generation.
    #[serde(default)]
    pub llm: LlmConfig,
}

impl TourConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `TourError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::TourError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Player movement settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Walking speed in units per second.
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// Eye height of the first-person camera.
    #[serde(default = "default_eye_height")]
    pub eye_height: f32,
    /// Spawn point `[x, y, z]`.
    #[serde(default = "default_spawn")]
    pub spawn: [f32; 3],
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            eye_height: default_eye_height(),
            spawn: default_spawn(),
        }
    }
}

/// Look settings. Only yaw is ever applied; pitch stays level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookConfig {
    /// Yaw rate for the discrete look keys, radians per second.
    #[serde(default = "default_key_turn_rate")]
    pub key_turn_rate: f32,
    /// Radians of yaw per pixel of captured pointer motion.
    #[serde(default = "default_pointer_sensitivity")]
    pub pointer_sensitivity: f32,
}

impl Default for LookConfig {
    fn default() -> Self {
        Self {
            key_turn_rate: default_key_turn_rate(),
            pointer_sensitivity: default_pointer_sensitivity(),
        }
    }
}

/// Camera projection and dance wobble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov_y_deg: f32,
    /// Viewport aspect ratio (width / height).
    #[serde(default = "default_aspect")]
    pub aspect: f32,
    /// Vertical bob amplitude while dancing.
    #[serde(default = "default_dance_bob")]
    pub dance_bob: f32,
    /// Roll amplitude (radians) while dancing.
    #[serde(default = "default_dance_roll")]
    pub dance_roll: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: default_fov(),
            aspect: default_aspect(),
            dance_bob: default_dance_bob(),
            dance_roll: default_dance_roll(),
        }
    }
}

/// Interaction radius and prompt wording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Planar radius within which a character counts as "nearby".
    #[serde(default = "default_radius")]
    pub radius: f32,
    /// Label of the interact key shown in the prompt.
    #[serde(default = "default_interact_label")]
    pub interact_key_label: String,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            interact_key_label: default_interact_label(),
        }
    }
}

/// Dialogue presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// How many options are presented each turn.
    #[serde(default = "default_options")]
    pub options_per_turn: usize,
    /// Speaker label for the player's lines.
    #[serde(default = "default_player_label")]
    pub player_label: String,
    /// Transient line shown while a reply is outstanding.
    #[serde(default = "default_pending_marker")]
    pub pending_marker: String,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            options_per_turn: default_options(),
            player_label: default_player_label(),
            pending_marker: default_pending_marker(),
        }
    }
}

/// Character animation tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Max distance an idle character strays from its initial position.
    #[serde(default = "default_wander_radius")]
    pub wander_radius: f32,
    /// Seconds between picking new wander targets.
    #[serde(default = "default_wander_interval")]
    pub wander_interval_secs: f32,
    /// Idle walking speed, units per second.
    #[serde(default = "default_wander_speed")]
    pub wander_speed: f32,
    /// Dance spin rate, radians per second.
    #[serde(default = "default_spin_rate")]
    pub dance_spin_rate: f32,
    /// Scale pulse amplitude on nearby/hovered characters.
    #[serde(default = "default_pulse")]
    pub highlight_pulse: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            wander_radius: default_wander_radius(),
            wander_interval_secs: default_wander_interval(),
            wander_speed: default_wander_speed(),
            dance_spin_rate: default_spin_rate(),
            highlight_pulse: default_pulse(),
        }
    }
}

/// Which remote backend shape to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LlmProviderKind {
    /// `generateContent`-style API: prompt in `contents`, text in `candidates`.
    #[default]
    GenerativeLanguage,
    /// OpenAI-compatible chat completions.
    OpenAiCompatible,
}

/// Remote reply generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Backend shape.
    #[serde(default)]
    pub provider: LlmProviderKind,
    /// Base URL of the endpoint.
    #[serde(default = "default_llm_url")]
    pub base_url: String,
    /// Model name.
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Environment variable holding the credential.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Output length cap.
    #[serde(default = "default_max_tokens")]
    pub max_output_tokens: u32,
    /// Extra attempts after a failed call before falling back.
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::default(),
            base_url: default_llm_url(),
            model: default_llm_model(),
            api_key_env: default_api_key_env(),
            timeout_ms: default_timeout_ms(),
            temperature: default_temperature(),
            max_output_tokens: default_max_tokens(),
            max_retries: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_speed() -> f32 { 5.0 }
fn default_eye_height() -> f32 { 1.6 }
fn default_spawn() -> [f32; 3] { [0.0, 1.6, 5.0] }
fn default_key_turn_rate() -> f32 { 2.0 }
fn default_pointer_sensitivity() -> f32 { 0.002 }
fn default_fov() -> f32 { 75.0 }
fn default_aspect() -> f32 { 16.0 / 9.0 }
fn default_dance_bob() -> f32 { 0.15 }
fn default_dance_roll() -> f32 { 0.08 }
fn default_radius() -> f32 { 3.0 }
fn default_interact_label() -> String { "E".to_string() }
fn default_options() -> usize { 4 }
fn default_player_label() -> String { "You".to_string() }
fn default_pending_marker() -> String { "…".to_string() }
fn default_wander_radius() -> f32 { 1.5 }
fn default_wander_interval() -> f32 { 4.0 }
fn default_wander_speed() -> f32 { 0.6 }
fn default_spin_rate() -> f32 { 3.0 }
fn default_pulse() -> f32 { 0.05 }
fn default_llm_url() -> String { "https://generativelanguage.googleapis.com".to_string() }
fn default_llm_model() -> String { "gemini-pro".to_string() }
fn default_api_key_env() -> String { "TOUR_GENAI_API_KEY".to_string() }
fn default_timeout_ms() -> u64 { 8000 }
fn default_temperature() -> f32 { 0.7 }
fn default_max_tokens() -> u32 { 150 }
