//! Markdown output documents.
//!
//! The individual document's metadata lines and section headers are load
//! bearing: the global phase mines them back out with
//! [`super::parse_rendered_summary`].

use super::{title_case, total_transcript_words, MeetingSummaryRecord};
use crate::error::{ReferatError, Result};
use crate::keyframes::ExtractedKeyframe;
use crate::transcript::TranscriptStats;
use chrono::Local;
use std::path::Path;

/// Write a per-meeting summary document.
///
/// Layout: title, `## Meeting Information` metadata block, optional
/// `## Meeting Screenshots` section (one sub-section per keyframe), then
/// the `## Summary` body.
pub fn write_individual_summary(
    path: &Path,
    summary: &str,
    stats: &TranscriptStats,
    source_file: &str,
    folder_name: &str,
    keyframes: &[ExtractedKeyframe],
) -> Result<()> {
    let mut parts = vec![
        format!(
            "# {} - Meeting Summary\n",
            title_case(&folder_name.replace('_', " "))
        ),
        "## Meeting Information\n".to_string(),
        format!(
            "- **Date Generated**: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ),
        format!("- **Duration**: {}", stats.duration_formatted),
        format!("- **Transcript Words**: {}", thousands(stats.word_count)),
        format!("- **Source File**: {}\n", source_file),
    ];

    if !keyframes.is_empty() {
        parts.push("## Meeting Screenshots\n".to_string());
        parts.push(keyframes_section(keyframes));
        parts.push(String::new());
    }

    parts.push("## Summary\n".to_string());
    parts.push(summary.to_string());

    write_file(path, &parts.join("\n"))
}

fn keyframes_section(keyframes: &[ExtractedKeyframe]) -> String {
    let mut parts = vec!["*Key visual moments from the meeting:*\n".to_string()];

    for (i, frame) in keyframes.iter().enumerate() {
        let image_name = Path::new(&frame.image_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| frame.image_path.clone());
        let heading = format!("At {}", frame.timestamp_formatted);

        parts.push(format!("### Screenshot {}: {}\n", i + 1, heading));
        parts.push(format!("![{}](images/{})\n", heading, image_name));
        parts.push(format!("*Context: {}*\n", frame.context_text.trim()));
    }

    parts.join("\n")
}

/// Write the global summary document: series metadata block plus the
/// generated analysis body.
pub fn write_global_summary(
    path: &Path,
    analysis: &str,
    records: &[MeetingSummaryRecord],
) -> Result<()> {
    let topics: Vec<&str> = records.iter().map(|r| r.meeting_topic.as_str()).collect();
    let dates: Vec<&str> = records
        .iter()
        .filter_map(|r| r.meeting_date.as_deref())
        .collect();

    let mut parts = vec![
        "# Global Meeting Series Summary\n".to_string(),
        "## Series Information\n".to_string(),
        format!(
            "- **Date Generated**: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ),
        format!("- **Total Meetings**: {}", records.len()),
        format!(
            "- **Total Transcript Words Analyzed**: {}",
            thousands(total_transcript_words(records) as usize)
        ),
        format!("- **Meeting Topics**: {}", topics.join(", ")),
    ];

    if let (Some(min), Some(max)) = (dates.iter().min(), dates.iter().max()) {
        parts.push(format!("- **Date Range**: {} to {}", min, max));
    }

    parts.push(String::new());
    parts.push("## Analysis\n".to_string());
    parts.push(analysis.to_string());

    write_file(path, &parts.join("\n"))
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .map_err(|e| ReferatError::File(format!("{}: {}", path.display(), e)))
}

/// Format an integer with comma thousands separators.
fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarize::parse_rendered_summary;
    use std::path::PathBuf;

    fn stats() -> TranscriptStats {
        TranscriptStats {
            duration_seconds: 2712.0,
            duration_formatted: "00:45:12".to_string(),
            segment_count: 100,
            word_count: 6420,
            estimated_speakers: 3,
        }
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(6420), "6,420");
        assert_eq!(thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_individual_document_structure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("20240101_kickoff_summary.md");

        write_individual_summary(
            &path,
            "The summary body.",
            &stats(),
            "kickoff.vtt",
            "20240101_kickoff",
            &[],
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# 20240101 Kickoff - Meeting Summary\n"));
        assert!(content.contains("## Meeting Information\n"));
        assert!(content.contains("- **Duration**: 00:45:12"));
        assert!(content.contains("- **Transcript Words**: 6,420"));
        assert!(content.contains("- **Source File**: kickoff.vtt"));
        assert!(!content.contains("## Meeting Screenshots"));
        assert!(content.contains("## Summary\n\nThe summary body."));
    }

    #[test]
    fn test_screenshots_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.md");
        let keyframes = vec![ExtractedKeyframe {
            timestamp_seconds: 95.0,
            timestamp_formatted: "00:01:35".to_string(),
            image_path: "/tmp/images/demo_summary_1.png".to_string(),
            context_text: "**[01:35] Ann: the demo**".to_string(),
            relevance_score: 0.7,
        }];

        write_individual_summary(&path, "Body", &stats(), "demo.vtt", "demo", &keyframes).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("## Meeting Screenshots\n"));
        assert!(content.contains("### Screenshot 1: At 00:01:35\n"));
        assert!(content.contains("![At 00:01:35](images/demo_summary_1.png)"));
        assert!(content.contains("*Context: **[01:35] Ann: the demo***"));
    }

    #[test]
    fn test_metadata_survives_round_trip_through_miner() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.md");
        write_individual_summary(&path, "Body", &stats(), "a.vtt", "a", &[]).unwrap();

        let fields = parse_rendered_summary(&std::fs::read_to_string(&path).unwrap());
        assert_eq!(fields.duration, "00:45:12");
        assert_eq!(fields.transcript_words, "6,420");
    }

    #[test]
    fn test_global_document_structure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("GLOBAL_SUMMARY.md");

        let record = |topic: &str, date: Option<&str>, words: &str| MeetingSummaryRecord {
            folder_name: topic.to_lowercase(),
            meeting_date: date.map(String::from),
            meeting_topic: topic.to_string(),
            summary_path: PathBuf::from("x.md"),
            content: String::new(),
            word_count: 0,
            duration: "00:30:00".to_string(),
            transcript_words: words.to_string(),
            participants: vec![],
            main_topics: vec![],
            action_items: vec![],
        };
        let records = vec![
            record("Kickoff", Some("20240101"), "6,420"),
            record("Review", Some("20240115"), "3580"),
        ];

        write_global_summary(&path, "Cross-meeting analysis.", &records).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Global Meeting Series Summary\n"));
        assert!(content.contains("- **Total Meetings**: 2"));
        assert!(content.contains("- **Total Transcript Words Analyzed**: 10,000"));
        assert!(content.contains("- **Meeting Topics**: Kickoff, Review"));
        assert!(content.contains("- **Date Range**: 20240101 to 20240115"));
        assert!(content.contains("## Analysis\n\nCross-meeting analysis."));
    }

    #[test]
    fn test_global_document_omits_date_range_without_dates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("GLOBAL_SUMMARY.md");
        let records = vec![MeetingSummaryRecord {
            folder_name: "kickoff".to_string(),
            meeting_date: None,
            meeting_topic: "Kickoff".to_string(),
            summary_path: PathBuf::from("x.md"),
            content: String::new(),
            word_count: 0,
            duration: "Unknown".to_string(),
            transcript_words: "Unknown".to_string(),
            participants: vec![],
            main_topics: vec![],
            action_items: vec![],
        }];

        write_global_summary(&path, "Analysis", &records).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("Date Range"));
    }
}
