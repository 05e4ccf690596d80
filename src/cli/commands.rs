//! Command implementations.

use super::output::format_duration;
use super::{ConfigAction, Output};
use crate::config::Settings;
use crate::error::Result;
use crate::orchestrator::{
    GlobalOutcome, MeetingOutcome, Orchestrator, ReportOutcome, RunResult, RunStatus,
};
use crate::summarize::OpenAiSummarizer;
use std::sync::Arc;

/// Flags for the `run` subcommand.
pub struct RunArgs {
    pub force: bool,
    pub input: Option<String>,
    pub output: Option<String>,
    pub no_keyframes: bool,
    pub max_keyframes: Option<usize>,
}

/// Run the batch summarization pipeline.
pub async fn run_pipeline(args: RunArgs, mut settings: Settings) -> Result<()> {
    if let Some(input) = args.input {
        settings.processing.input_folder = input;
    }
    if let Some(output) = args.output {
        settings.processing.summaries_folder = output;
    }
    if args.no_keyframes {
        settings.keyframes.enabled = false;
    }
    if let Some(max) = args.max_keyframes {
        settings.keyframes.max_frames = max;
    }

    Output::info(&format!(
        "Summarizing meetings in {}",
        settings.input_folder().display()
    ));

    let summarizer = Arc::new(OpenAiSummarizer::new(&settings.model));
    let mut orchestrator = Orchestrator::new(settings, summarizer)?;

    let spinner = Output::spinner("Processing meetings...");
    let result = orchestrator.run(args.force).await;
    spinner.finish_and_clear();

    let result = result?;
    print_tally(&result);

    // "No files" is reported, not an error
    Ok(())
}

fn print_tally(result: &RunResult) {
    Output::header("Run Summary");

    for meeting in &result.individual.results {
        match &meeting.outcome {
            MeetingOutcome::Success {
                keyframes_extracted,
                timings,
                ..
            } => Output::list_item(&format!(
                "{}: summarized ({} keyframes, {})",
                meeting.folder_name,
                keyframes_extracted,
                format_duration(
                    timings.parse_seconds + timings.keyframes_seconds + timings.generation_seconds
                )
            )),
            MeetingOutcome::Skipped { .. } => {
                Output::list_item(&format!("{}: skipped (already summarized)", meeting.folder_name))
            }
            MeetingOutcome::Error { message } => {
                Output::list_item(&format!("{}: error - {}", meeting.folder_name, message))
            }
        }
    }

    Output::kv(
        "Meetings",
        &format!(
            "{} processed, {} skipped, {} errors (of {})",
            result.individual.processed,
            result.individual.skipped,
            result.individual.errors,
            result.individual.total_folders
        ),
    );

    if result.status == RunStatus::NoFiles {
        Output::warning("No meeting folders with transcripts found; nothing to aggregate");
        return;
    }

    match &result.global {
        Some(GlobalOutcome::Success {
            path,
            summaries_processed,
            generation_seconds,
        }) => Output::kv(
            "Global summary",
            &format!(
                "{} ({} meetings, {})",
                path.display(),
                summaries_processed,
                format_duration(*generation_seconds)
            ),
        ),
        Some(GlobalOutcome::Skipped { path }) => {
            Output::kv("Global summary", &format!("skipped, {} exists", path.display()))
        }
        Some(GlobalOutcome::NoSummaries) => Output::kv("Global summary", "no summaries to aggregate"),
        Some(GlobalOutcome::Error { message }) => {
            Output::kv("Global summary", &format!("error - {}", message))
        }
        None => {}
    }

    match &result.report {
        Some(ReportOutcome::Success { path }) => {
            Output::kv("Report", &format!("{}", path.display()))
        }
        Some(ReportOutcome::Skipped { path }) => {
            Output::kv("Report", &format!("skipped, {} exists", path.display()))
        }
        Some(ReportOutcome::NoSummaries) => Output::kv("Report", "no summaries available"),
        Some(ReportOutcome::Disabled) => Output::kv("Report", "disabled"),
        Some(ReportOutcome::Error { message }) => {
            Output::kv("Report", &format!("error - {}", message))
        }
        None => {}
    }

    if result.usage.total_calls > 0 {
        Output::kv(
            "Model usage",
            &format!(
                "{} calls, {} tokens ({} in / {} out), avg latency {:.1}s",
                result.usage.total_calls,
                result.usage.total_tokens,
                result.usage.total_input_tokens,
                result.usage.total_output_tokens,
                result.usage.average_latency_ms / 1000.0
            ),
        );
    }

    Output::success(&format!(
        "Done in {}",
        format_duration(result.usage.session_duration_seconds)
    ));
}

/// Write a default configuration file to the standard location.
pub fn run_init(settings: &Settings) -> Result<()> {
    let path = Settings::default_config_path();
    if path.exists() {
        Output::info(&format!("Configuration already exists at {}", path.display()));
        return Ok(());
    }

    settings.save_to(&path)?;
    Output::success(&format!("Wrote default configuration to {}", path.display()));
    Ok(())
}

/// Show or locate the configuration.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let rendered = toml::to_string_pretty(&settings)
                .map_err(|e| crate::error::ReferatError::Config(e.to_string()))?;
            println!("{}", rendered);
        }
        ConfigAction::Path => {
            println!("{}", Settings::default_config_path().display());
        }
    }
    Ok(())
}
