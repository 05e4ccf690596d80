//! Referat - Meeting Transcript Summarization
//!
//! A batch CLI tool that turns folders of meeting recordings (WebVTT
//! captions plus optional video) into illustrated markdown summaries.
//!
//! The name "Referat" is the Norwegian word for "meeting minutes."
//!
//! # Overview
//!
//! For each meeting folder, Referat:
//! - Parses the WebVTT transcript into timed segments
//! - Scores segments for visual relevance and extracts matching video
//!   keyframes (speakers narrate before acting, so each capture is delayed
//!   by a content-dependent amount)
//! - Generates a per-meeting summary via an LLM call
//!
//! It then aggregates all per-meeting summaries on disk into a global
//! cross-meeting analysis and an optional consolidated report.
//!
//! # Architecture
//!
//! - `config` - Configuration and prompt templates
//! - `transcript` - WebVTT parsing and transcript metadata
//! - `keyframes` - Relevance scoring, candidate selection, frame extraction
//! - `summarize` - Prompt assembly, remote model calls, summary files
//! - `report` - Consolidated report rendering
//! - `orchestrator` - Three-phase pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use referat::config::Settings;
//! use referat::orchestrator::Orchestrator;
//! use referat::summarize::OpenAiSummarizer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let summarizer = Arc::new(OpenAiSummarizer::new(&settings.model));
//!     let mut orchestrator = Orchestrator::new(settings, summarizer)?;
//!
//!     let result = orchestrator.run(false).await?;
//!     println!("Processed {} meetings", result.individual.processed);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod keyframes;
pub mod orchestrator;
pub mod report;
pub mod stats;
pub mod summarize;
pub mod transcript;

pub use error::{ReferatError, Result};
