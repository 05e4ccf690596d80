//! Transcript data model and WebVTT parsing.

mod vtt;

pub use vtt::parse_file;

use serde::{Deserialize, Serialize};

/// A complete parsed transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Individual caption segments with timestamps, in file order.
    pub segments: Vec<TranscriptSegment>,
    /// Full cleaned transcript text (concatenated segments).
    pub full_text: String,
    /// Total duration in seconds (end of the last segment).
    pub duration_seconds: f64,
}

impl Transcript {
    /// Create a new transcript from segments.
    pub fn new(segments: Vec<TranscriptSegment>) -> Self {
        let full_text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let duration_seconds = segments.last().map(|s| s.end_seconds).unwrap_or(0.0);

        Self {
            segments,
            full_text,
            duration_seconds,
        }
    }

    /// Compute summary statistics for the transcript.
    pub fn stats(&self) -> TranscriptStats {
        let word_count = self
            .segments
            .iter()
            .map(|s| s.text.split_whitespace().count())
            .sum();

        TranscriptStats {
            duration_seconds: self.duration_seconds,
            duration_formatted: format_timecode(self.duration_seconds),
            segment_count: self.segments.len(),
            word_count,
            estimated_speakers: self.estimated_speakers(),
        }
    }

    /// Count distinct speakers via the leading `Name:` pattern on the
    /// original (uncleaned) text. Best-effort heuristic.
    fn estimated_speakers(&self) -> usize {
        let mut speakers = std::collections::HashSet::new();
        for segment in &self.segments {
            if let Some(name) = segment.speaker() {
                speakers.insert(name);
            }
        }
        speakers.len()
    }
}

/// A single caption segment. Immutable once parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds.
    pub start_seconds: f64,
    /// End time in seconds. Always >= `start_seconds`.
    pub end_seconds: f64,
    /// Original start timecode string, kept for display.
    pub start_time: String,
    /// Original end timecode string.
    pub end_time: String,
    /// Cleaned text: tags, bracketed annotations and the speaker prefix
    /// stripped, whitespace normalized.
    pub text: String,
    /// Raw cue text as it appeared in the file (speaker prefix intact).
    pub original_text: String,
}

impl TranscriptSegment {
    /// Midpoint of this segment in seconds.
    pub fn midpoint(&self) -> f64 {
        (self.start_seconds + self.end_seconds) / 2.0
    }

    /// Speaker name from the leading `Name:` prefix of the original text,
    /// if present.
    pub fn speaker(&self) -> Option<String> {
        let (name, _) = vtt::split_speaker(&self.original_text)?;
        Some(name)
    }
}

/// Metadata about a transcript, used for meeting context and the summary
/// document header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptStats {
    pub duration_seconds: f64,
    /// Duration as `HH:MM:SS`.
    pub duration_formatted: String,
    pub segment_count: usize,
    pub word_count: usize,
    pub estimated_speakers: usize,
}

/// Parse a VTT timecode (`HH:MM:SS.mmm` or `MM:SS.mmm`) into seconds.
///
/// Malformed input yields 0.0 rather than an error; a single bad cue
/// timestamp should not sink the whole transcript.
pub fn parse_timecode(time_str: &str) -> f64 {
    let parts: Vec<&str> = time_str.trim().split(':').collect();
    let parse = |s: &str| s.parse::<f64>().unwrap_or(0.0);
    match parts.as_slice() {
        [h, m, s] => parse(h) * 3600.0 + parse(m) * 60.0 + parse(s),
        [m, s] => parse(m) * 60.0 + parse(s),
        _ => 0.0,
    }
}

/// Format seconds as `HH:MM:SS`.
pub fn format_timecode(seconds: f64) -> String {
    let total = seconds as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Format seconds as `MM:SS` (minutes may exceed 59 for long meetings).
pub fn format_mmss(seconds: f64) -> String {
    let total = seconds as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, end: f64, text: &str, original: &str) -> TranscriptSegment {
        TranscriptSegment {
            start_seconds: start,
            end_seconds: end,
            start_time: format_timecode(start),
            end_time: format_timecode(end),
            text: text.to_string(),
            original_text: original.to_string(),
        }
    }

    #[test]
    fn test_parse_timecode() {
        assert_eq!(parse_timecode("00:01:30.500"), 90.5);
        assert_eq!(parse_timecode("01:30.500"), 90.5);
        assert_eq!(parse_timecode("02:00:00.000"), 7200.0);
        assert_eq!(parse_timecode("garbage"), 0.0);
    }

    #[test]
    fn test_format_timecode() {
        assert_eq!(format_timecode(0.0), "00:00:00");
        assert_eq!(format_timecode(90.5), "00:01:30");
        assert_eq!(format_timecode(3661.0), "01:01:01");
        assert_eq!(format_mmss(125.0), "02:05");
    }

    #[test]
    fn test_transcript_stats() {
        let transcript = Transcript::new(vec![
            segment(0.0, 5.0, "hello there everyone", "Alice: hello there everyone"),
            segment(5.0, 10.0, "good morning", "Bob: good morning"),
            segment(10.0, 15.0, "let's begin", "Alice: let's begin"),
        ]);

        let stats = transcript.stats();
        assert_eq!(stats.segment_count, 3);
        assert_eq!(stats.word_count, 7);
        assert_eq!(stats.estimated_speakers, 2);
        assert_eq!(stats.duration_seconds, 15.0);
        assert_eq!(stats.duration_formatted, "00:00:15");
    }

    #[test]
    fn test_segment_midpoint() {
        let s = segment(10.0, 20.0, "x", "x");
        assert_eq!(s.midpoint(), 15.0);
    }
}
