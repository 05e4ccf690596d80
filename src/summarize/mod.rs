//! Summary generation: prompt assembly, the remote model boundary, disk
//! aggregation of previously written summaries, and the markdown output
//! documents.

mod collect;
mod prompt;
mod remote;
mod writer;

pub use collect::{
    collect_summaries, format_filename, meeting_context, parse_folder_name,
    parse_rendered_summary, title_case, total_transcript_words, MeetingSummaryRecord,
    SummaryFields,
};
pub use prompt::PromptEngine;
pub use remote::{OpenAiSummarizer, Summarizer, SummaryOutput};
pub use writer::{write_global_summary, write_individual_summary};
