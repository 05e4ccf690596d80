//! Configuration settings for Referat.

use super::Prompts;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration structure.
///
/// Loaded once at startup and immutable for the run. Every field has an
/// explicit default, so a missing config file or a partial one is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub model: ModelSettings,
    pub processing: ProcessingSettings,
    pub summary: SummarySettings,
    pub keyframes: KeyframeSettings,
    pub report: ReportSettings,
    pub prompts: Prompts,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Remote summarization model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Chat model used for both individual and global summaries.
    pub model_id: String,
    /// Maximum tokens in the generated summary.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Retry attempts after a throttled call.
    pub max_retries: u32,
    /// Base delay for exponential backoff, in seconds.
    pub retry_base_delay_seconds: u64,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model_id: "gpt-4o".to_string(),
            max_tokens: 4000,
            temperature: 0.1,
            max_retries: 3,
            retry_base_delay_seconds: 60,
            timeout_seconds: 300,
        }
    }
}

/// Input discovery and output naming settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingSettings {
    /// Folder containing one subdirectory per meeting.
    pub input_folder: String,
    /// Folder where summaries (and the images/ subdirectory) are written.
    pub summaries_folder: String,
    /// Glob patterns that identify a meeting transcript file.
    pub input_file_patterns: Vec<String>,
    /// Filename template for individual summaries. Supports `{folder_name}`,
    /// `{date}` and `{timestamp}`.
    pub individual_summary_filename: String,
    /// Filename template for the global summary. Supports `{date}` and
    /// `{timestamp}`.
    pub global_summary_filename: String,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            input_folder: "walkthroughs".to_string(),
            summaries_folder: "summaries".to_string(),
            input_file_patterns: vec!["*.vtt".to_string()],
            individual_summary_filename: "{folder_name}_summary.md".to_string(),
            global_summary_filename: "GLOBAL_SUMMARY.md".to_string(),
        }
    }
}

/// Summary content settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    /// Summary style adjective substituted into the prompt instruction.
    pub style: String,
    /// Ask the model for a timeline with approximate timestamps.
    pub include_timestamps: bool,
    /// Ask the model for a participants list.
    pub include_participants: bool,
    /// Ask the model for action items.
    pub include_action_items: bool,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            style: "comprehensive".to_string(),
            include_timestamps: true,
            include_participants: true,
            include_action_items: true,
        }
    }
}

/// Keyframe extraction tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyframeSettings {
    /// Enable keyframe extraction when a companion video is present.
    pub enabled: bool,
    /// Maximum keyframes per meeting.
    pub max_frames: usize,
    /// Minimum relevance score for a segment to become a candidate.
    pub min_relevance_score: f64,
    /// Minimum temporal spacing between selected keyframes, in seconds.
    pub min_interval_seconds: f64,
    /// Maximum image width; wider frames are downscaled.
    pub image_max_width: u32,
    /// Time margin around a candidate used to pull in neighboring
    /// transcript text for its caption.
    pub caption_context_window_seconds: f64,
    /// Per-category capture delay overrides, keyed by category name
    /// (e.g. `screen_sharing = 4.0`).
    pub delays: HashMap<String, f64>,
}

impl Default for KeyframeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_frames: 5,
            min_relevance_score: 0.3,
            min_interval_seconds: 60.0,
            image_max_width: 1200,
            caption_context_window_seconds: 30.0,
            delays: HashMap::new(),
        }
    }
}

/// Consolidated report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Generate the consolidated report after the global summary.
    pub enabled: bool,
    /// Report filename, written into the summaries folder.
    pub filename: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            filename: "REPORT.md".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or the default location if None.
    ///
    /// An explicitly named config file must exist; the default location is
    /// allowed to be absent (defaults are used).
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let (config_path, explicit) = match path {
            Some(p) => (p.clone(), true),
            None => (Self::default_config_path(), false),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else if explicit {
            Err(crate::error::ReferatError::Config(format!(
                "Configuration file not found: {}",
                config_path.display()
            )))
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ReferatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("referat")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded input folder path.
    pub fn input_folder(&self) -> PathBuf {
        Self::expand_path(&self.processing.input_folder)
    }

    /// Get the expanded summaries folder path.
    pub fn summaries_folder(&self) -> PathBuf {
        Self::expand_path(&self.processing.summaries_folder)
    }
}
