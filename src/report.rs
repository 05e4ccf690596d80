//! Consolidated report rendering.
//!
//! The orchestrator is handed a [`ReportRenderer`] (or none) at
//! construction. The shipped renderer concatenates the global summary
//! and every individual summary into one markdown document with a table
//! of contents; PDF conversion is a different implementation of the same
//! trait, not a concern of this crate.

use crate::error::{ReferatError, Result};
use crate::summarize::MeetingSummaryRecord;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything a renderer needs to produce a report.
#[derive(Debug)]
pub struct ReportInput {
    /// Destination path for the rendered report.
    pub output_path: PathBuf,
    /// Path of the global summary document, if one exists on disk.
    pub global_summary_path: Option<PathBuf>,
    /// Collected individual summaries, sorted chronologically.
    pub records: Vec<MeetingSummaryRecord>,
}

/// Renders collected summaries into a single document.
pub trait ReportRenderer: Send + Sync {
    fn render(&self, input: &ReportInput) -> Result<PathBuf>;
}

/// Consolidated-markdown renderer: title, table of contents, the global
/// summary, then one chapter per meeting.
#[derive(Debug, Default)]
pub struct MarkdownReportRenderer;

impl ReportRenderer for MarkdownReportRenderer {
    fn render(&self, input: &ReportInput) -> Result<PathBuf> {
        let mut parts = vec![
            "# Meeting Series Report".to_string(),
            String::new(),
            format!(
                "**Report Generated:** {}",
                Local::now().format("%B %d, %Y at %H:%M")
            ),
            format!("**Total Meetings:** {}", input.records.len()),
            String::new(),
        ];

        parts.push("## Table of Contents".to_string());
        parts.push(String::new());
        parts.push(format!("1. [Global Summary](#{})", slug("Global Summary")));
        for (i, record) in input.records.iter().enumerate() {
            let chapter = format!("Chapter {}: {}", i + 1, record.meeting_topic);
            parts.push(format!(
                "{}. [{}](#{})",
                i + 2,
                record.meeting_topic,
                slug(&chapter)
            ));
        }
        parts.push(String::new());
        parts.push("---".to_string());
        parts.push(String::new());

        parts.push("# Global Summary".to_string());
        parts.push(String::new());
        match &input.global_summary_path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| ReferatError::Report(format!("{}: {}", path.display(), e)))?;
                parts.push(strip_title(&content));
            }
            _ => parts.push("Global summary not available.".to_string()),
        }
        parts.push(String::new());
        parts.push("---".to_string());
        parts.push(String::new());

        for (i, record) in input.records.iter().enumerate() {
            parts.push(format!("# Chapter {}: {}", i + 1, record.meeting_topic));
            parts.push(String::new());

            if let Some(date) = &record.meeting_date {
                parts.push(format!("**Date:** {}", date));
            }
            parts.push(format!("**Duration:** {}", record.duration));
            if !record.participants.is_empty() {
                parts.push(format!(
                    "**Participants:** {}",
                    record.participants.join(", ")
                ));
            }
            parts.push(String::new());
            parts.push(strip_title(&record.content));
            parts.push(String::new());

            if i + 1 < input.records.len() {
                parts.push("---".to_string());
                parts.push(String::new());
            }
        }

        std::fs::write(&input.output_path, parts.join("\n"))
            .map_err(|e| ReferatError::Report(format!("{}: {}", input.output_path.display(), e)))?;

        info!("Wrote consolidated report to {}", input.output_path.display());
        Ok(input.output_path.clone())
    }
}

/// GitHub-style anchor slug for a heading.
fn slug(heading: &str) -> String {
    heading
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c == ' ' || c == '-' {
                Some('-')
            } else {
                None
            }
        })
        .collect()
}

/// Drop the document's own `# ` title line; the report supplies its own
/// headings.
fn strip_title(content: &str) -> String {
    content
        .lines()
        .skip_while(|line| line.starts_with("# ") || line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(topic: &str, date: Option<&str>) -> MeetingSummaryRecord {
        MeetingSummaryRecord {
            folder_name: topic.to_lowercase(),
            meeting_date: date.map(String::from),
            meeting_topic: topic.to_string(),
            summary_path: PathBuf::from("x.md"),
            content: format!("# {} - Meeting Summary\n\n## Summary\n\nBody of {}.", topic, topic),
            word_count: 10,
            duration: "00:30:00".to_string(),
            transcript_words: "1000".to_string(),
            participants: vec!["Alice".to_string()],
            main_topics: vec![],
            action_items: vec![],
        }
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Global Summary"), "global-summary");
        assert_eq!(slug("Chapter 1: Kickoff"), "chapter-1-kickoff");
    }

    #[test]
    fn test_strip_title() {
        assert_eq!(
            strip_title("# Title\n\n## Summary\n\nBody."),
            "## Summary\n\nBody."
        );
        assert_eq!(strip_title("No title here."), "No title here.");
    }

    #[test]
    fn test_render_full_report() {
        let dir = tempfile::tempdir().unwrap();
        let global_path = dir.path().join("GLOBAL_SUMMARY.md");
        std::fs::write(
            &global_path,
            "# Global Meeting Series Summary\n\n## Analysis\n\nThemes.",
        )
        .unwrap();

        let input = ReportInput {
            output_path: dir.path().join("REPORT.md"),
            global_summary_path: Some(global_path),
            records: vec![
                record("Kickoff", Some("20240101")),
                record("Review", Some("20240115")),
            ],
        };

        let path = MarkdownReportRenderer.render(&input).unwrap();
        let content = std::fs::read_to_string(path).unwrap();

        assert!(content.starts_with("# Meeting Series Report"));
        assert!(content.contains("**Total Meetings:** 2"));
        assert!(content.contains("1. [Global Summary](#global-summary)"));
        assert!(content.contains("2. [Kickoff](#chapter-1-kickoff)"));
        assert!(content.contains("3. [Review](#chapter-2-review)"));
        assert!(content.contains("# Chapter 1: Kickoff"));
        assert!(content.contains("**Date:** 20240101"));
        assert!(content.contains("Body of Kickoff."));
        assert!(content.contains("## Analysis\n\nThemes."));
    }

    #[test]
    fn test_render_without_global_summary() {
        let dir = tempfile::tempdir().unwrap();
        let input = ReportInput {
            output_path: dir.path().join("REPORT.md"),
            global_summary_path: None,
            records: vec![record("Kickoff", None)],
        };

        MarkdownReportRenderer.render(&input).unwrap();
        let content = std::fs::read_to_string(dir.path().join("REPORT.md")).unwrap();
        assert!(content.contains("Global summary not available."));
        assert!(!content.contains("**Date:**"));
    }
}
