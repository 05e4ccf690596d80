//! Pipeline orchestrator for Referat.
//!
//! Drives the three phases over a batch of meeting folders: individual
//! summaries (parse, keyframes, remote call, write), the global
//! cross-meeting summary, and the consolidated report. Per-meeting
//! failures are isolated; one bad folder never aborts its siblings.

use crate::config::Settings;
use crate::error::{ReferatError, Result};
use crate::keyframes::KeyframePipeline;
use crate::report::{MarkdownReportRenderer, ReportInput, ReportRenderer};
use crate::stats::{UsageSummary, UsageTracker};
use crate::summarize::{
    collect_summaries, format_filename, meeting_context, write_global_summary,
    write_individual_summary, PromptEngine, Summarizer,
};
use crate::transcript::{self, TranscriptStats};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Companion video extensions, checked in order. First found wins.
const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "mov", "avi", "mkv"];

/// Context label for the global summary model call.
const GLOBAL_CONTEXT: &str = "global_summary";

/// Outcome of one meeting folder in the individual phase.
#[derive(Debug)]
pub enum MeetingOutcome {
    Success {
        summary_path: PathBuf,
        stats: TranscriptStats,
        timings: MeetingTimings,
        keyframes_extracted: usize,
    },
    Skipped {
        summary_path: PathBuf,
    },
    Error {
        message: String,
    },
}

/// Per-step elapsed times for one meeting.
#[derive(Debug, Default, Clone)]
pub struct MeetingTimings {
    pub parse_seconds: f64,
    pub keyframes_seconds: f64,
    pub generation_seconds: f64,
}

/// One meeting folder's result, tagged with its name.
#[derive(Debug)]
pub struct MeetingResult {
    pub folder_name: String,
    pub outcome: MeetingOutcome,
}

/// Aggregated individual-phase results.
///
/// Invariant: `processed + skipped + errors == total_folders`.
#[derive(Debug, Default)]
pub struct IndividualResults {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub total_folders: usize,
    pub results: Vec<MeetingResult>,
    pub elapsed_seconds: f64,
}

/// Outcome of the global summary phase.
#[derive(Debug)]
pub enum GlobalOutcome {
    Success {
        path: PathBuf,
        summaries_processed: usize,
        generation_seconds: f64,
    },
    Skipped {
        path: PathBuf,
    },
    NoSummaries,
    Error {
        message: String,
    },
}

/// Outcome of the report phase.
#[derive(Debug)]
pub enum ReportOutcome {
    Success { path: PathBuf },
    Skipped { path: PathBuf },
    NoSummaries,
    Disabled,
    Error { message: String },
}

/// Overall run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    /// No meeting folder produced or already had a summary; the global
    /// and report phases never ran.
    NoFiles,
}

/// Everything a finished run reports.
#[derive(Debug)]
pub struct RunResult {
    pub status: RunStatus,
    pub individual: IndividualResults,
    pub global: Option<GlobalOutcome>,
    pub report: Option<ReportOutcome>,
    pub usage: UsageSummary,
}

/// A discovered meeting folder with its transcript and optional video.
#[derive(Debug)]
struct MeetingFolder {
    name: String,
    transcript_path: PathBuf,
    video_path: Option<PathBuf>,
}

/// The main orchestrator for the Referat pipeline.
pub struct Orchestrator {
    settings: Settings,
    summarizer: Arc<dyn Summarizer>,
    prompt_engine: PromptEngine,
    report_renderer: Option<Box<dyn ReportRenderer>>,
    usage: UsageTracker,
}

impl Orchestrator {
    /// Create an orchestrator with the built-in markdown report renderer
    /// (when reporting is enabled).
    pub fn new(settings: Settings, summarizer: Arc<dyn Summarizer>) -> Result<Self> {
        let renderer: Option<Box<dyn ReportRenderer>> = if settings.report.enabled {
            Some(Box::new(MarkdownReportRenderer))
        } else {
            None
        };
        Self::with_components(settings, summarizer, renderer)
    }

    /// Create an orchestrator with an explicit report renderer (or none).
    pub fn with_components(
        settings: Settings,
        summarizer: Arc<dyn Summarizer>,
        report_renderer: Option<Box<dyn ReportRenderer>>,
    ) -> Result<Self> {
        let prompt_engine =
            PromptEngine::new(settings.prompts.clone(), settings.summary.clone());

        let template_errors = prompt_engine.validate_templates();
        if !template_errors.is_empty() {
            return Err(ReferatError::Config(template_errors.join("; ")));
        }

        Ok(Self {
            settings,
            summarizer,
            prompt_engine,
            report_renderer,
            usage: UsageTracker::new(),
        })
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run the full pipeline.
    ///
    /// With `force` false, meetings whose summary file already exists are
    /// skipped and the existing files stay byte-identical.
    pub async fn run(&mut self, force: bool) -> Result<RunResult> {
        let input_root = self.settings.input_folder();
        if !input_root.is_dir() {
            return Err(ReferatError::File(format!(
                "Input folder not found: {}",
                input_root.display()
            )));
        }

        let summaries_dir = self.settings.summaries_folder();
        std::fs::create_dir_all(&summaries_dir)?;
        let images_dir = summaries_dir.join("images");
        if self.settings.keyframes.enabled {
            std::fs::create_dir_all(&images_dir)?;
        }

        let folders = self.discover_meetings(&input_root)?;
        info!("Found {} meeting folders", folders.len());

        let individual = self
            .run_individual_phase(&folders, &summaries_dir, &images_dir, force)
            .await;

        // No usable summaries at all, new or pre-existing: stop here.
        if individual.processed + individual.skipped == 0 {
            return Ok(RunResult {
                status: RunStatus::NoFiles,
                individual,
                global: None,
                report: None,
                usage: self.usage.summary(),
            });
        }

        let global = self.run_global_phase(&summaries_dir, force).await;
        let report = self.run_report_phase(&summaries_dir, force);

        Ok(RunResult {
            status: RunStatus::Success,
            individual,
            global: Some(global),
            report: Some(report),
            usage: self.usage.summary(),
        })
    }

    /// Enumerate immediate subdirectories of the input root that contain
    /// a transcript file, in sorted order.
    fn discover_meetings(&self, input_root: &Path) -> Result<Vec<MeetingFolder>> {
        let matchers: Vec<Regex> = self
            .settings
            .processing
            .input_file_patterns
            .iter()
            .map(|p| glob_to_regex(p))
            .collect::<Result<_>>()?;

        let mut subdirs: Vec<PathBuf> = std::fs::read_dir(input_root)
            .map_err(|e| ReferatError::File(format!("{}: {}", input_root.display(), e)))?
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        subdirs.sort();

        let mut folders = Vec::new();
        for dir in subdirs {
            let Some(name) = dir.file_name().and_then(|n| n.to_str()).map(String::from) else {
                continue;
            };

            let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)
                .map_err(|e| ReferatError::File(format!("{}: {}", dir.display(), e)))?
                .flatten()
                .map(|e| e.path())
                .filter(|p| p.is_file())
                .collect();
            files.sort();

            let matches: Vec<&PathBuf> = files
                .iter()
                .filter(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| matchers.iter().any(|m| m.is_match(n)))
                })
                .collect();

            let Some(transcript_path) = matches.first().map(|p| (*p).clone()) else {
                continue;
            };
            if matches.len() > 1 {
                warn!(
                    "Multiple transcript files in {}, using {}",
                    name,
                    transcript_path.display()
                );
            }

            let video_path = VIDEO_EXTENSIONS.iter().find_map(|ext| {
                files
                    .iter()
                    .find(|p| {
                        p.extension()
                            .and_then(|e| e.to_str())
                            .is_some_and(|e| e.eq_ignore_ascii_case(ext))
                    })
                    .cloned()
            });

            folders.push(MeetingFolder {
                name,
                transcript_path,
                video_path,
            });
        }

        Ok(folders)
    }

    async fn run_individual_phase(
        &mut self,
        folders: &[MeetingFolder],
        summaries_dir: &Path,
        images_dir: &Path,
        force: bool,
    ) -> IndividualResults {
        let phase_start = Instant::now();
        let mut results = IndividualResults {
            total_folders: folders.len(),
            ..IndividualResults::default()
        };

        for folder in folders {
            info!("Processing meeting folder {}", folder.name);
            let outcome = self
                .process_meeting(folder, summaries_dir, images_dir, force)
                .await;

            match &outcome {
                MeetingOutcome::Success { .. } => results.processed += 1,
                MeetingOutcome::Skipped { .. } => results.skipped += 1,
                MeetingOutcome::Error { message } => {
                    warn!("Meeting {} failed: {}", folder.name, message);
                    results.errors += 1;
                }
            }
            results.results.push(MeetingResult {
                folder_name: folder.name.clone(),
                outcome,
            });
        }

        results.elapsed_seconds = phase_start.elapsed().as_secs_f64();
        results
    }

    /// Process one meeting folder. Never returns an error: every failure
    /// is folded into `MeetingOutcome::Error` so siblings keep running.
    async fn process_meeting(
        &mut self,
        folder: &MeetingFolder,
        summaries_dir: &Path,
        images_dir: &Path,
        force: bool,
    ) -> MeetingOutcome {
        let filename = format_filename(
            &self.settings.processing.individual_summary_filename,
            &folder.name,
        );
        let summary_path = summaries_dir.join(&filename);

        if summary_path.exists() && !force {
            info!("Summary for {} already exists, skipping", folder.name);
            return MeetingOutcome::Skipped { summary_path };
        }

        match self
            .generate_meeting_summary(folder, &summary_path, images_dir)
            .await
        {
            Ok((stats, timings, keyframes_extracted)) => MeetingOutcome::Success {
                summary_path,
                stats,
                timings,
                keyframes_extracted,
            },
            Err(e) => MeetingOutcome::Error {
                message: e.to_string(),
            },
        }
    }

    async fn generate_meeting_summary(
        &mut self,
        folder: &MeetingFolder,
        summary_path: &Path,
        images_dir: &Path,
    ) -> Result<(TranscriptStats, MeetingTimings, usize)> {
        let mut timings = MeetingTimings::default();

        let parse_start = Instant::now();
        let transcript = transcript::parse_file(&folder.transcript_path)?;
        timings.parse_seconds = parse_start.elapsed().as_secs_f64();

        if transcript.segments.is_empty() {
            return Err(ReferatError::Transcript(format!(
                "{} contains no usable cues",
                folder.transcript_path.display()
            )));
        }
        let stats = transcript.stats();

        // Best-effort: keyframe failures never block the summary.
        let keyframes_start = Instant::now();
        let keyframes = match (&folder.video_path, self.settings.keyframes.enabled) {
            (Some(video), true) => {
                // The decoder handle lives inside this call only.
                KeyframePipeline::new(&self.settings.keyframes).run(
                    video,
                    &transcript.segments,
                    images_dir,
                    &folder.name,
                )
            }
            _ => Vec::new(),
        };
        timings.keyframes_seconds = keyframes_start.elapsed().as_secs_f64();

        let context = meeting_context(&folder.name, &stats);
        let prompt = self
            .prompt_engine
            .individual_prompt(&transcript.full_text, Some(&context));

        let generation_start = Instant::now();
        let output = self.summarizer.generate(&prompt, &folder.name).await?;
        timings.generation_seconds = generation_start.elapsed().as_secs_f64();
        info!("Model usage for {}: {}", folder.name, output.usage.display());
        self.usage.record_individual(&folder.name, output.usage);

        let source_file = folder
            .transcript_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        write_individual_summary(
            summary_path,
            &output.text,
            &stats,
            &source_file,
            &folder.name,
            &keyframes,
        )?;

        info!(
            "Wrote summary for {} ({} keyframes)",
            folder.name,
            keyframes.len()
        );
        Ok((stats, timings, keyframes.len()))
    }

    /// Global phase: re-read every individual summary currently on disk
    /// and generate the cross-meeting analysis.
    async fn run_global_phase(&mut self, summaries_dir: &Path, force: bool) -> GlobalOutcome {
        let filename = format_filename(
            &self.settings.processing.global_summary_filename,
            GLOBAL_CONTEXT,
        );
        let path = summaries_dir.join(&filename);

        if path.exists() && !force {
            info!("Global summary already exists, skipping");
            return GlobalOutcome::Skipped { path };
        }

        let records = match collect_summaries(
            summaries_dir,
            &self.settings.processing.individual_summary_filename,
        ) {
            Ok(records) => records,
            Err(e) => {
                return GlobalOutcome::Error {
                    message: e.to_string(),
                }
            }
        };

        if records.is_empty() {
            warn!("No individual summaries found for global aggregation");
            return GlobalOutcome::NoSummaries;
        }
        info!("Aggregating {} individual summaries", records.len());

        let prompt = self.prompt_engine.global_prompt(&records);
        let generation_start = Instant::now();

        match self.summarizer.generate(&prompt, GLOBAL_CONTEXT).await {
            Ok(output) => {
                info!("Model usage for global summary: {}", output.usage.display());
                self.usage.record_global(GLOBAL_CONTEXT, output.usage);
                match write_global_summary(&path, &output.text, &records) {
                    Ok(()) => GlobalOutcome::Success {
                        path,
                        summaries_processed: records.len(),
                        generation_seconds: generation_start.elapsed().as_secs_f64(),
                    },
                    Err(e) => GlobalOutcome::Error {
                        message: e.to_string(),
                    },
                }
            }
            Err(e) => GlobalOutcome::Error {
                message: e.to_string(),
            },
        }
    }

    /// Report phase: hand everything on disk to the injected renderer.
    fn run_report_phase(&self, summaries_dir: &Path, force: bool) -> ReportOutcome {
        let Some(renderer) = &self.report_renderer else {
            return ReportOutcome::Disabled;
        };

        let output_path = summaries_dir.join(format_filename(
            &self.settings.report.filename,
            GLOBAL_CONTEXT,
        ));
        if output_path.exists() && !force {
            info!("Report already exists, skipping");
            return ReportOutcome::Skipped { path: output_path };
        }

        let records = match collect_summaries(
            summaries_dir,
            &self.settings.processing.individual_summary_filename,
        ) {
            Ok(records) => records,
            Err(e) => {
                return ReportOutcome::Error {
                    message: e.to_string(),
                }
            }
        };
        if records.is_empty() {
            return ReportOutcome::NoSummaries;
        }

        let global_summary_path = summaries_dir.join(format_filename(
            &self.settings.processing.global_summary_filename,
            GLOBAL_CONTEXT,
        ));
        let input = ReportInput {
            output_path,
            global_summary_path: global_summary_path.exists().then_some(global_summary_path),
            records,
        };

        match renderer.render(&input) {
            Ok(path) => ReportOutcome::Success { path },
            Err(e) => ReportOutcome::Error {
                message: e.to_string(),
            },
        }
    }
}

/// Compile a shell-style glob (`*`, `?`) into an anchored regex.
fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push('^');
    for c in pattern.chars() {
        match c {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            c => regex.push_str(&regex::escape(&c.to_string())),
        }
    }
    regex.push('$');
    Regex::new(&regex)
        .map_err(|e| ReferatError::Config(format!("bad file pattern {}: {}", pattern, e)))
}
