//! Keyframe selection and extraction.
//!
//! The transcript drives everything: segments are scored for visual
//! relevance, the best-scoring moments are selected with a minimum time
//! gap between them, each gets a caption built from neighboring transcript
//! text, and the matching video frames are decoded and written as PNGs.

mod context;
mod scoring;
mod selection;
mod video;

pub use context::build_context;
pub use scoring::RelevanceScorer;
pub use selection::select_candidates;
pub use video::FrameExtractor;

use crate::config::KeyframeSettings;
use crate::transcript::TranscriptSegment;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// A transcript moment judged relevant enough to be considered for a
/// keyframe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyframeCandidate {
    /// Capture timestamp in seconds: segment midpoint plus the capture
    /// delay for its content type.
    pub timestamp_seconds: f64,
    /// Original segment start timecode, for display only.
    pub timestamp_formatted: String,
    /// Relevance score in [0, 1].
    pub relevance_score: f64,
    /// Caption text. Starts as the segment's own text; enriched with the
    /// surrounding context window before extraction.
    pub context_text: String,
    /// Index of the source segment in the transcript.
    pub segment_index: usize,
    /// Capture delay applied on top of the segment midpoint.
    pub delay_seconds: f64,
}

/// A successfully extracted keyframe, 1:1 with a persisted image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedKeyframe {
    pub timestamp_seconds: f64,
    pub timestamp_formatted: String,
    pub image_path: String,
    pub context_text: String,
    pub relevance_score: f64,
}

/// The full per-meeting keyframe pipeline: score, select, caption, extract.
pub struct KeyframePipeline {
    scorer: RelevanceScorer,
    extractor: FrameExtractor,
    max_frames: usize,
    min_interval_seconds: f64,
    caption_window_seconds: f64,
}

impl KeyframePipeline {
    /// Build a pipeline from configuration.
    pub fn new(settings: &KeyframeSettings) -> Self {
        Self {
            scorer: RelevanceScorer::new(settings.min_relevance_score, &settings.delays),
            extractor: FrameExtractor::new(settings.image_max_width),
            max_frames: settings.max_frames,
            min_interval_seconds: settings.min_interval_seconds,
            caption_window_seconds: settings.caption_context_window_seconds,
        }
    }

    /// Run the pipeline for one meeting.
    ///
    /// Best-effort: failures to open or decode the video log a warning and
    /// yield an empty list, never an error. Images are written into
    /// `output_dir` as `{base_name}_{ordinal}.png`.
    pub fn run(
        &self,
        video_path: &Path,
        segments: &[TranscriptSegment],
        output_dir: &Path,
        base_name: &str,
    ) -> Vec<ExtractedKeyframe> {
        let candidates = self.scorer.analyze(segments);
        if candidates.is_empty() {
            info!("No relevant keyframe candidates found in transcript");
            return Vec::new();
        }
        info!("Found {} keyframe candidates", candidates.len());

        let mut selected =
            select_candidates(candidates, self.max_frames, self.min_interval_seconds);
        info!("Selected {} keyframes", selected.len());

        for candidate in &mut selected {
            let context =
                build_context(candidate.segment_index, segments, self.caption_window_seconds);
            if !context.is_empty() {
                candidate.context_text = context;
            }
        }

        self.extractor
            .extract(video_path, &selected, output_dir, base_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyframeSettings;

    #[test]
    fn test_pipeline_missing_video_is_soft() {
        let settings = KeyframeSettings::default();
        let pipeline = KeyframePipeline::new(&settings);
        let dir = tempfile::tempdir().unwrap();

        let segments = vec![crate::transcript::TranscriptSegment {
            start_seconds: 0.0,
            end_seconds: 10.0,
            start_time: "00:00:00.000".to_string(),
            end_time: "00:00:10.000".to_string(),
            text: "Let me share my screen and walk through the demo".to_string(),
            original_text: "Ann: Let me share my screen and walk through the demo".to_string(),
        }];

        let frames = pipeline.run(
            Path::new("/nonexistent/video.mp4"),
            &segments,
            dir.path(),
            "test_summary",
        );
        assert!(frames.is_empty());
    }
}
