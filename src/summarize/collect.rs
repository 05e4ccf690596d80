//! Disk-truthful aggregation of previously written summaries.
//!
//! The global phase never trusts in-memory state from the individual
//! phase: it re-reads every summary file currently on disk and mines the
//! rendered markdown back into structured fields. The mining regexes are
//! brittle by nature, so they live behind [`parse_rendered_summary`] and
//! nowhere else.

use crate::error::{ReferatError, Result};
use crate::transcript::TranscriptStats;
use chrono::Local;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Fields mined out of one rendered summary document.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryFields {
    pub duration: String,
    pub transcript_words: String,
    pub participants: Vec<String>,
    pub main_topics: Vec<String>,
    pub action_items: Vec<String>,
}

/// One collected meeting summary, rebuilt from disk every global run.
#[derive(Debug, Clone)]
pub struct MeetingSummaryRecord {
    pub folder_name: String,
    pub meeting_date: Option<String>,
    pub meeting_topic: String,
    pub summary_path: PathBuf,
    pub content: String,
    pub word_count: usize,
    pub duration: String,
    pub transcript_words: String,
    pub participants: Vec<String>,
    pub main_topics: Vec<String>,
    pub action_items: Vec<String>,
}

/// Split a meeting folder name into `(date, topic)` on the first
/// underscore. The topic part is title-cased with underscores as spaces;
/// a name without an underscore has no date.
pub fn parse_folder_name(name: &str) -> (Option<String>, String) {
    match name.split_once('_') {
        Some((date, topic)) if !topic.is_empty() => {
            (Some(date.to_string()), title_case(&topic.replace('_', " ")))
        }
        _ => (None, title_case(&name.replace('_', " "))),
    }
}

/// Title-case every whitespace-separated word.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Mine structured fields back out of a rendered summary document.
///
/// Missing metadata lines fall back to `"Unknown"`; missing sections
/// yield empty lists. Section markers must match what the writer and the
/// model's format instructions produce.
pub fn parse_rendered_summary(content: &str) -> SummaryFields {
    let duration_re = Regex::new(r"- \*\*Duration\*\*: ([^\n]+)").unwrap();
    let words_re = Regex::new(r"- \*\*Transcript Words\*\*: ([^\n]+)").unwrap();
    let participants_re = Regex::new(r"(?s)## Participants\s*\n(.*?)\n\n").unwrap();
    let topics_re = Regex::new(r"(?s)## Main Topics\s*\n(.*?)\n\n").unwrap();
    let actions_re =
        Regex::new(r"(?s)## Action Items\s*\n(.*?)(?:\n\n|\n## |\n---|\nTimeline)").unwrap();
    let bullet_re = Regex::new(r"(?m)^\s*(?:\d+\.|-)\s*([^\n]+)").unwrap();

    let capture = |re: &Regex| {
        re.captures(content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
    };

    let bullets = |section: Option<String>| -> Vec<String> {
        section
            .map(|text| {
                bullet_re
                    .captures_iter(&text)
                    .filter_map(|c| c.get(1))
                    .map(|m| m.as_str().trim().to_string())
                    .collect()
            })
            .unwrap_or_default()
    };

    SummaryFields {
        duration: capture(&duration_re).unwrap_or_else(|| "Unknown".to_string()),
        transcript_words: capture(&words_re).unwrap_or_else(|| "Unknown".to_string()),
        participants: bullets(capture(&participants_re)),
        main_topics: bullets(capture(&topics_re)),
        action_items: bullets(capture(&actions_re)),
    }
}

/// Render a filename template. Supports `{folder_name}`, `{date}`
/// (today, `YYYYMMDD`) and `{timestamp}` (`YYYYMMDD_HHMMSS`).
pub fn format_filename(template: &str, folder_name: &str) -> String {
    let now = Local::now();
    template
        .replace("{folder_name}", folder_name)
        .replace("{date}", &now.format("%Y%m%d").to_string())
        .replace("{timestamp}", &now.format("%Y%m%d_%H%M%S").to_string())
}

/// Build the regex that recognizes files produced by a filename template
/// and recovers the folder name.
fn template_matcher(template: &str) -> Result<Regex> {
    let escaped = regex::escape(template);
    let pattern = escaped
        .replace(r"\{folder_name\}", "(?P<folder>.+)")
        .replace(r"\{date\}", r"\d{8}")
        .replace(r"\{timestamp\}", r"\d{8}_\d{6}");
    Regex::new(&format!("^{}$", pattern))
        .map_err(|e| ReferatError::Config(format!("bad filename template {}: {}", template, e)))
}

/// Collect every individual summary on disk matching the filename
/// template, sorted by meeting date (raw string comparison, correct for
/// `YYYYMMDD`) with folder name as fallback key.
///
/// Unreadable files are skipped with a warning.
pub fn collect_summaries(
    summaries_dir: &Path,
    filename_template: &str,
) -> Result<Vec<MeetingSummaryRecord>> {
    let matcher = template_matcher(filename_template)?;
    let mut records = Vec::new();

    let entries = std::fs::read_dir(summaries_dir)
        .map_err(|e| ReferatError::File(format!("{}: {}", summaries_dir.display(), e)))?;

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(caps) = matcher.captures(file_name) else {
            continue;
        };
        let folder_name = caps
            .name("folder")
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| file_name.trim_end_matches(".md").to_string());

        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Could not read summary {}: {}", path.display(), e);
                continue;
            }
        };

        let (meeting_date, meeting_topic) = parse_folder_name(&folder_name);
        let fields = parse_rendered_summary(&content);
        let word_count = content.split_whitespace().count();

        records.push(MeetingSummaryRecord {
            folder_name,
            meeting_date,
            meeting_topic,
            summary_path: path,
            content,
            word_count,
            duration: fields.duration,
            transcript_words: fields.transcript_words,
            participants: fields.participants,
            main_topics: fields.main_topics,
            action_items: fields.action_items,
        });
    }

    records.sort_by(|a, b| {
        let key_a = a.meeting_date.as_deref().unwrap_or(&a.folder_name);
        let key_b = b.meeting_date.as_deref().unwrap_or(&b.folder_name);
        key_a.cmp(key_b)
    });

    debug!("Collected {} summaries from disk", records.len());
    Ok(records)
}

/// Sum the `Transcript Words` figures mined from the collected records.
/// Unparseable values count as zero.
pub fn total_transcript_words(records: &[MeetingSummaryRecord]) -> u64 {
    records
        .iter()
        .filter_map(|r| r.transcript_words.replace(',', "").parse::<u64>().ok())
        .sum()
}

/// Build the meeting-context string handed to the prompt alongside the
/// transcript.
pub fn meeting_context(folder_name: &str, stats: &TranscriptStats) -> String {
    let (date, topic) = parse_folder_name(folder_name);
    let mut parts = Vec::new();

    match date {
        Some(date) => {
            parts.push(format!("Meeting Date: {}", date));
            parts.push(format!("Topic: {}", topic));
        }
        None => parts.push(format!("Meeting: {}", topic)),
    }

    parts.push(format!("Duration: {}", stats.duration_formatted));
    parts.push(format!("Transcript Length: {} words", stats.word_count));
    if stats.estimated_speakers > 0 {
        parts.push(format!("Estimated Speakers: {}", stats.estimated_speakers));
    }

    parts.join("\n")
}
