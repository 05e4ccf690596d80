//! Prompt templates for Referat.
//!
//! All templates can be overridden from the configuration file; the
//! defaults produce the standard meeting-summary document layout that the
//! aggregation stage knows how to mine back out.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub individual: IndividualPrompts,
    pub global: GlobalPrompts,
}


/// Prompts for per-meeting summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndividualPrompts {
    /// Outer template. Placeholders: `{instruction}`, `{requirements}`,
    /// `{format_instructions}`, `{context_info}`, `{transcript}`.
    pub template: String,
    /// Instruction line. Placeholder: `{summary_style}`.
    pub instruction: String,
    /// Requirement bullets, keyed by name. Participants, action items and
    /// timeline are filtered by the summary flags.
    pub requirements: HashMap<String, String>,
    pub format_instructions: String,
}

impl Default for IndividualPrompts {
    fn default() -> Self {
        let mut requirements = HashMap::new();
        requirements.insert(
            "participants".to_string(),
            "- **Participants**: List of people who spoke during the meeting".to_string(),
        );
        requirements.insert(
            "main_topics".to_string(),
            "- **Main Topics**: Key subjects discussed during the meeting".to_string(),
        );
        requirements.insert(
            "key_points".to_string(),
            "- **Key Points**: Important information, decisions, and insights shared".to_string(),
        );
        requirements.insert(
            "technical_details".to_string(),
            "- **Technical Details**: Any technical concepts, architectures, or implementations discussed"
                .to_string(),
        );
        requirements.insert(
            "action_items".to_string(),
            "- **Action Items**: Tasks, next steps, or follow-up items mentioned".to_string(),
        );
        requirements.insert(
            "decisions".to_string(),
            "- **Decisions Made**: Any concrete decisions or conclusions reached".to_string(),
        );
        requirements.insert(
            "questions_issues".to_string(),
            "- **Questions/Issues Raised**: Important questions or problems discussed".to_string(),
        );
        requirements.insert(
            "timeline".to_string(),
            "- **Timeline**: Reference key moments with approximate timestamps when significant topics were discussed"
                .to_string(),
        );

        Self {
            template: "{instruction}\n\nYour summary should include:\n{requirements}\n\n{format_instructions}\n\n{context_info}**Transcript:**\n{transcript}"
                .to_string(),
            instruction:
                "Please analyze the following meeting transcript and create a {summary_style} summary."
                    .to_string(),
            requirements,
            format_instructions:
                "Please format the summary in clear Markdown with appropriate headers and bullet points.\nFocus on technical accuracy and ensure all important information is captured."
                    .to_string(),
        }
    }
}

/// Prompts for the cross-meeting global analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalPrompts {
    /// Outer template. Placeholders: `{instruction}`, `{required_sections}`,
    /// `{format_instructions}`, `{meetings_overview}`, `{combined_summaries}`.
    pub template: String,
    pub instruction: String,
    /// Section bullets the analysis must cover, rendered in order.
    pub required_sections: Vec<String>,
    pub format_instructions: String,
}

impl Default for GlobalPrompts {
    fn default() -> Self {
        Self {
            template: "{instruction}\n\nYour analysis should cover:\n{required_sections}\n\n{format_instructions}\n\n**Meetings Overview:**\n{meetings_overview}\n\n**Combined Summaries:**\n{combined_summaries}"
                .to_string(),
            instruction:
                "Please analyze the following collection of meeting summaries and create a comprehensive global analysis of the entire meeting series."
                    .to_string(),
            required_sections: vec![
                "- **Series Overview**: The overall purpose and scope of the meeting series"
                    .to_string(),
                "- **Key Themes**: Recurring topics and threads that span multiple meetings"
                    .to_string(),
                "- **Progress and Decisions**: How the work evolved and what was decided along the way"
                    .to_string(),
                "- **Technical Landscape**: Systems, architectures and tools discussed across the series"
                    .to_string(),
                "- **Open Items**: Outstanding questions and follow-ups remaining at the end of the series"
                    .to_string(),
            ],
            format_instructions:
                "Please format the analysis in clear Markdown with appropriate headers and bullet points.\nSynthesize across meetings rather than repeating each summary."
                    .to_string(),
        }
    }
}
