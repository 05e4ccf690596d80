//! WebVTT caption file parsing.
//!
//! Handles the cue list subset of WebVTT that meeting platforms emit:
//! optional cue identifiers, `start --> end` timecode lines, and text
//! payloads possibly carrying inline tags, bracketed annotations, and a
//! leading `Speaker Name:` prefix.

use super::{parse_timecode, Transcript, TranscriptSegment};
use crate::error::{ReferatError, Result};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

// Compiled once; text cleaning runs per cue over long transcripts.
static TAGS_RE: OnceLock<Regex> = OnceLock::new();
static SPEAKER_PREFIX_RE: OnceLock<Regex> = OnceLock::new();
static BRACKETS_RE: OnceLock<Regex> = OnceLock::new();
static PARENS_RE: OnceLock<Regex> = OnceLock::new();
static SPACES_RE: OnceLock<Regex> = OnceLock::new();
static SPEAKER_SPLIT_RE: OnceLock<Regex> = OnceLock::new();

/// Parse a WebVTT file into a transcript.
///
/// Cues whose text is empty after cleaning are dropped.
pub fn parse_file(path: &Path) -> Result<Transcript> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ReferatError::File(format!("{}: {}", path.display(), e)))?;
    let transcript = parse_str(&content)?;
    debug!(
        "Parsed {} segments from {}",
        transcript.segments.len(),
        path.display()
    );
    Ok(transcript)
}

/// Parse WebVTT content into a transcript.
pub fn parse_str(content: &str) -> Result<Transcript> {
    let mut lines = content.lines().peekable();

    // Header is optional in practice; tolerate files that omit it.
    if let Some(first) = lines.peek() {
        if first.trim_start_matches('\u{feff}').starts_with("WEBVTT") {
            lines.next();
        }
    }

    let mut segments = Vec::new();

    while let Some(line) = lines.next() {
        let Some((start_time, end_time)) = parse_cue_timing(line) else {
            continue;
        };

        let mut payload = Vec::new();
        for text_line in lines.by_ref() {
            if text_line.trim().is_empty() {
                break;
            }
            payload.push(text_line);
        }

        let original_text = payload.join("\n").trim().to_string();
        let text = clean_text(&original_text);
        if text.is_empty() {
            continue;
        }

        let start_seconds = parse_timecode(&start_time);
        let end_seconds = parse_timecode(&end_time);
        if end_seconds < start_seconds {
            return Err(ReferatError::Transcript(format!(
                "cue ends before it starts: {} --> {}",
                start_time, end_time
            )));
        }

        segments.push(TranscriptSegment {
            start_seconds,
            end_seconds,
            start_time,
            end_time,
            text,
            original_text,
        });
    }

    Ok(Transcript::new(segments))
}

/// Parse a `start --> end` cue timing line. Trailing cue settings
/// (position, alignment) are ignored.
fn parse_cue_timing(line: &str) -> Option<(String, String)> {
    let (start, rest) = line.split_once("-->")?;
    let end = rest.trim().split_whitespace().next()?;
    let start = start.trim();
    // Reject lines where the left side is clearly not a timecode
    // (e.g. a cue payload that happens to contain an arrow).
    if !start.contains(':') || !end.contains(':') {
        return None;
    }
    Some((start.to_string(), end.to_string()))
}

/// Clean raw cue text: strip inline tags, bracketed/parenthesized
/// annotations and the speaker prefix, then normalize whitespace.
fn clean_text(text: &str) -> String {
    let tags = TAGS_RE.get_or_init(|| Regex::new(r"<[^>]+>").unwrap());
    let speaker = SPEAKER_PREFIX_RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z\s]*:\s*").unwrap());
    let brackets = BRACKETS_RE.get_or_init(|| Regex::new(r"\[[^\]]*\]").unwrap());
    let parens = PARENS_RE.get_or_init(|| Regex::new(r"\([^)]*\)").unwrap());
    let spaces = SPACES_RE.get_or_init(|| Regex::new(r"\s+").unwrap());

    let text = tags.replace_all(text, "");
    let text = speaker.replace(&text, "");
    let text = brackets.replace_all(&text, "");
    let text = parens.replace_all(&text, "");
    let text = spaces.replace_all(&text, " ");
    text.trim().to_string()
}

/// Split a leading `Speaker Name:` prefix off the raw cue text.
///
/// Returns the speaker name and the remainder, or None when the text does
/// not start with a name pattern.
pub(super) fn split_speaker(text: &str) -> Option<(String, String)> {
    let re =
        SPEAKER_SPLIT_RE.get_or_init(|| Regex::new(r"^([A-Za-z][A-Za-z\s]*):\s*(.*)$").unwrap());
    let caps = re.captures(text.lines().next()?)?;
    Some((
        caps.get(1)?.as_str().trim().to_string(),
        caps.get(2)?.as_str().to_string(),
    ))
}
