//! CLI module for Referat.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Referat - Meeting Transcript Summarization
///
/// A batch CLI tool that turns folders of meeting recordings (WebVTT captions
/// plus optional video) into illustrated markdown summaries. The name
/// "Referat" is the Norwegian word for "meeting minutes."
#[derive(Parser, Debug)]
#[command(name = "referat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize every meeting folder, then build the global summary and report
    Run {
        /// Regenerate summaries even when output files already exist
        #[arg(short, long)]
        force: bool,

        /// Input folder containing one subdirectory per meeting
        #[arg(short, long)]
        input: Option<String>,

        /// Output folder for summaries
        #[arg(short, long)]
        output: Option<String>,

        /// Disable keyframe extraction
        #[arg(long)]
        no_keyframes: bool,

        /// Maximum keyframes per meeting
        #[arg(long)]
        max_keyframes: Option<usize>,
    },

    /// Write a default configuration file
    Init,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
