//! Prompt assembly from configurable templates.
//!
//! Pure string work: no state beyond the configured templates and the
//! summary flags. No truncation or token budgeting is performed; long
//! transcript sets pass through in full.

use super::MeetingSummaryRecord;
use crate::config::{Prompts, SummarySettings};

/// Bullet keys rendered into the individual prompt, in order. The
/// participants, action-items and timeline bullets are gated by the
/// summary flags.
const REQUIREMENT_ORDER: [&str; 8] = [
    "participants",
    "main_topics",
    "key_points",
    "technical_details",
    "action_items",
    "decisions",
    "questions_issues",
    "timeline",
];

/// Renders the two prompt types from the configured templates.
pub struct PromptEngine {
    prompts: Prompts,
    summary: SummarySettings,
}

impl PromptEngine {
    pub fn new(prompts: Prompts, summary: SummarySettings) -> Self {
        Self { prompts, summary }
    }

    /// Build the per-meeting summary prompt.
    pub fn individual_prompt(&self, transcript: &str, meeting_context: Option<&str>) -> String {
        let individual = &self.prompts.individual;

        let instruction = individual
            .instruction
            .replace("{summary_style}", &self.summary.style);

        let requirements = REQUIREMENT_ORDER
            .iter()
            .filter(|key| self.requirement_enabled(key))
            .filter_map(|key| individual.requirements.get(*key))
            .filter(|bullet| !bullet.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");

        let context_info = match meeting_context {
            Some(context) => format!("Meeting Context: {}\n\n", context),
            None => String::new(),
        };

        individual
            .template
            .replace("{instruction}", &instruction)
            .replace("{requirements}", &requirements)
            .replace("{format_instructions}", &individual.format_instructions)
            .replace("{context_info}", &context_info)
            .replace("{transcript}", transcript)
    }

    /// Build the cross-meeting global analysis prompt.
    pub fn global_prompt(&self, records: &[MeetingSummaryRecord]) -> String {
        let global = &self.prompts.global;

        let required_sections = global.required_sections.join("\n");
        let meetings_overview = build_meetings_overview(records);
        let combined_summaries = build_combined_summaries(records);

        global
            .template
            .replace("{instruction}", &global.instruction)
            .replace("{required_sections}", &required_sections)
            .replace("{format_instructions}", &global.format_instructions)
            .replace("{meetings_overview}", &meetings_overview)
            .replace("{combined_summaries}", &combined_summaries)
    }

    fn requirement_enabled(&self, key: &str) -> bool {
        match key {
            "participants" => self.summary.include_participants,
            "action_items" => self.summary.include_action_items,
            "timeline" => self.summary.include_timestamps,
            _ => true,
        }
    }

    /// Check that every required placeholder is present in the configured
    /// templates. Returns one message per missing placeholder.
    pub fn validate_templates(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for placeholder in [
            "{instruction}",
            "{requirements}",
            "{format_instructions}",
            "{context_info}",
            "{transcript}",
        ] {
            if !self.prompts.individual.template.contains(placeholder) {
                errors.push(format!(
                    "Individual summary template missing placeholder: {}",
                    placeholder
                ));
            }
        }

        for placeholder in [
            "{instruction}",
            "{required_sections}",
            "{format_instructions}",
            "{meetings_overview}",
            "{combined_summaries}",
        ] {
            if !self.prompts.global.template.contains(placeholder) {
                errors.push(format!(
                    "Global summary template missing placeholder: {}",
                    placeholder
                ));
            }
        }

        if !self.prompts.individual.instruction.contains("{summary_style}") {
            errors.push(
                "Individual summary instruction missing placeholder: {summary_style}".to_string(),
            );
        }

        errors
    }
}

/// Numbered per-meeting overview block for the global prompt.
fn build_meetings_overview(records: &[MeetingSummaryRecord]) -> String {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            format!(
                "{}. **{}** ({})\n   - Duration: {}\n   - Participants: {} people\n   - Key Topics: {} main areas",
                i + 1,
                record.meeting_topic,
                record.meeting_date.as_deref().unwrap_or("Date unknown"),
                record.duration,
                record.participants.len(),
                record.main_topics.len(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Verbatim summary bodies separated by an 80-character rule.
fn build_combined_summaries(records: &[MeetingSummaryRecord]) -> String {
    let separator = format!("{}\n\n", "=".repeat(80));
    let parts: Vec<String> = records
        .iter()
        .map(|record| {
            format!(
                "MEETING: {} ({})\n{}",
                record.meeting_topic,
                record.meeting_date.as_deref().unwrap_or("Unknown date"),
                record.content
            )
        })
        .collect();

    format!("\n\n{}", parts.join(&separator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn engine(summary: SummarySettings) -> PromptEngine {
        PromptEngine::new(Prompts::default(), summary)
    }

    fn record(topic: &str, date: Option<&str>, content: &str) -> MeetingSummaryRecord {
        MeetingSummaryRecord {
            folder_name: topic.to_lowercase(),
            meeting_date: date.map(String::from),
            meeting_topic: topic.to_string(),
            summary_path: PathBuf::from("x.md"),
            content: content.to_string(),
            word_count: content.split_whitespace().count(),
            duration: "00:30:00".to_string(),
            transcript_words: "1000".to_string(),
            participants: vec!["Alice".to_string(), "Bob".to_string()],
            main_topics: vec!["Scope".to_string()],
            action_items: vec![],
        }
    }

    #[test]
    fn test_individual_prompt_substitution() {
        let prompt = engine(SummarySettings::default())
            .individual_prompt("the transcript text", Some("Meeting Date: 20240101"));

        assert!(prompt.contains("create a comprehensive summary"));
        assert!(prompt.contains("Meeting Context: Meeting Date: 20240101"));
        assert!(prompt.contains("**Transcript:**\nthe transcript text"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn test_flags_filter_requirements() {
        let all = engine(SummarySettings::default()).individual_prompt("t", None);
        assert!(all.contains("**Participants**"));
        assert!(all.contains("**Action Items**"));
        assert!(all.contains("**Timeline**"));

        let none = engine(SummarySettings {
            include_participants: false,
            include_action_items: false,
            include_timestamps: false,
            ..SummarySettings::default()
        })
        .individual_prompt("t", None);
        assert!(!none.contains("**Participants**"));
        assert!(!none.contains("**Action Items**"));
        assert!(!none.contains("**Timeline**"));
        // Core bullets stay
        assert!(none.contains("**Main Topics**"));
        assert!(none.contains("**Decisions Made**"));
    }

    #[test]
    fn test_no_context_no_context_line() {
        let prompt = engine(SummarySettings::default()).individual_prompt("t", None);
        assert!(!prompt.contains("Meeting Context:"));
    }

    #[test]
    fn test_global_prompt_overview_and_rule() {
        let records = vec![
            record("Kickoff", Some("20240101"), "First summary body"),
            record("Review", None, "Second summary body"),
        ];
        let prompt = engine(SummarySettings::default()).global_prompt(&records);

        assert!(prompt.contains("1. **Kickoff** (20240101)"));
        assert!(prompt.contains("2. **Review** (Date unknown)"));
        assert!(prompt.contains("- Participants: 2 people"));
        assert!(prompt.contains("- Key Topics: 1 main areas"));
        assert!(prompt.contains(&"=".repeat(80)));
        assert!(prompt.contains("MEETING: Kickoff (20240101)\nFirst summary body"));
        assert!(prompt.contains("MEETING: Review (Unknown date)\nSecond summary body"));
    }

    #[test]
    fn test_default_templates_validate() {
        assert!(engine(SummarySettings::default())
            .validate_templates()
            .is_empty());
    }

    #[test]
    fn test_broken_template_reports_missing_placeholders() {
        let mut prompts = Prompts::default();
        prompts.individual.template = "{instruction}\n{transcript}".to_string();
        prompts.individual.instruction = "Summarize this.".to_string();
        let engine = PromptEngine::new(prompts, SummarySettings::default());

        let errors = engine.validate_templates();
        assert!(errors.iter().any(|e| e.contains("{requirements}")));
        assert!(errors.iter().any(|e| e.contains("{context_info}")));
        assert!(errors.iter().any(|e| e.contains("{summary_style}")));
    }
}
