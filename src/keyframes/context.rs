//! Caption construction from the transcript neighborhood of a keyframe.

use crate::transcript::{format_mmss, TranscriptSegment};
use std::cmp::Ordering;

/// Build a caption for the segment at `target_index` from all segments
/// overlapping a window of `window_seconds` on either side of it.
///
/// Each piece renders as `[mm:ss] Speaker: text` (speaker omitted when
/// none is detected), pieces join with `" | "`, and the target segment is
/// bolded. Returns an empty string when the index is out of range.
pub fn build_context(
    target_index: usize,
    segments: &[TranscriptSegment],
    window_seconds: f64,
) -> String {
    let Some(target) = segments.get(target_index) else {
        return String::new();
    };

    let window_start = target.start_seconds - window_seconds;
    let window_end = target.end_seconds + window_seconds;

    let mut in_window: Vec<(usize, &TranscriptSegment)> = segments
        .iter()
        .enumerate()
        .filter(|(_, s)| s.end_seconds >= window_start && s.start_seconds <= window_end)
        .collect();
    in_window.sort_by(|(_, a), (_, b)| {
        a.start_seconds
            .partial_cmp(&b.start_seconds)
            .unwrap_or(Ordering::Equal)
    });

    let pieces: Vec<String> = in_window
        .into_iter()
        .map(|(i, segment)| {
            let stamp = format_mmss(segment.start_seconds);
            let body = match segment.speaker() {
                Some(name) => format!("[{}] {}: {}", stamp, name, segment.text),
                None => format!("[{}] {}", stamp, segment.text),
            };
            if i == target_index {
                format!("**{}**", body)
            } else {
                body
            }
        })
        .collect();

    pieces.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::format_timecode;

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

    fn three_segments() -> Vec<TranscriptSegment> {
        vec![
            segment(0.0, 5.0, "first part", "Ann: first part"),
            segment(10.0, 15.0, "the demo itself", "Ben: the demo itself"),
            segment(25.0, 30.0, "wrapping up", "wrapping up"),
        ]
    }

    #[test]
    fn test_window_includes_neighbors() {
        // 6s window around [10, 15] spans [4, 21]: includes the first
        // segment (ends at 5) but not the last (starts at 25)
        let segments = three_segments();
        let context = build_context(1, &segments, 6.0);
        assert_eq!(
            context,
            "[00:00] Ann: first part | **[00:10] Ben: the demo itself**"
        );
    }

    #[test]
    fn test_wide_window_includes_all() {
        let segments = three_segments();
        let context = build_context(1, &segments, 30.0);
        assert!(context.contains("Ann: first part"));
        assert!(context.contains("**[00:10] Ben: the demo itself**"));
        assert!(context.contains("[00:25] wrapping up"));
    }

    #[test]
    fn test_speaker_omitted_when_absent() {
        let segments = three_segments();
        let context = build_context(2, &segments, 1.0);
        assert_eq!(context, "**[00:25] wrapping up**");
    }

    #[test]
    fn test_out_of_range_index() {
        let segments = three_segments();
        assert_eq!(build_context(99, &segments, 30.0), "");
        assert_eq!(build_context(0, &[], 30.0), "");
    }
}
