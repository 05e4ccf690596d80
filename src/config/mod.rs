//! Configuration management for Referat.

mod prompts;
mod settings;

pub use prompts::{GlobalPrompts, IndividualPrompts, Prompts};
pub use settings::{
    GeneralSettings, KeyframeSettings, ModelSettings, ProcessingSettings, ReportSettings,
    Settings, SummarySettings,
};
