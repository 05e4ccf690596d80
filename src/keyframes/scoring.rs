//! Transcript relevance scoring and capture-delay modeling.
//!
//! Speakers narrate before acting ("I will share my screen now" precedes
//! the screen actually being shared), so each keyword category carries a
//! capture delay alongside its score weight. When several categories
//! match one segment, the highest delay wins regardless of which category
//! contributed the most score.

use super::KeyframeCandidate;
use crate::transcript::TranscriptSegment;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Cue words suggesting a topic transition at a segment start.
const TRANSITION_CUES: [&str; 5] = ["okay", "so", "now", "next", "let's"];

/// A keyword category with its score weight and capture delay.
#[derive(Debug, Clone)]
struct Category {
    name: &'static str,
    keywords: &'static [&'static str],
    weight: f64,
    delay_seconds: f64,
}

fn default_categories() -> Vec<Category> {
    vec![
        Category {
            name: "screen_sharing",
            keywords: &[
                "share my screen",
                "can you see",
                "let me show",
                "take a look",
                "here you can see",
                "on the screen",
            ],
            weight: 0.4,
            // Wait for the screen to actually be shared
            delay_seconds: 3.0,
        },
        Category {
            name: "screen_sharing_immediate",
            keywords: &["sharing my screen", "screen is shared", "you should see"],
            weight: 0.4,
            // Already happening
            delay_seconds: 0.0,
        },
        Category {
            name: "demonstrations",
            keywords: &[
                "demo",
                "example",
                "workflow",
                "process",
                "step by step",
                "walk through",
                "walkthrough",
            ],
            weight: 0.3,
            delay_seconds: 2.0,
        },
        Category {
            name: "technical",
            keywords: &[
                "code",
                "configuration",
                "setup",
                "implementation",
                "architecture",
                "deployment",
            ],
            weight: 0.2,
            delay_seconds: 1.0,
        },
        Category {
            name: "transitions",
            keywords: &[
                "next",
                "now",
                "moving on",
                "let's go to",
                "switch to",
                "another thing",
            ],
            weight: 0.1,
            delay_seconds: 2.0,
        },
        Category {
            name: "important",
            keywords: &[
                "important",
                "key",
                "main",
                "critical",
                "essential",
                "note that",
                "remember",
            ],
            weight: 0.15,
            delay_seconds: 0.5,
        },
        Category {
            name: "questions",
            keywords: &["question", "ask", "clarify", "understand", "explain"],
            weight: 0.1,
            delay_seconds: 1.0,
        },
    ]
}

/// Scores transcript segments for visual worthiness and determines a
/// content-type-specific capture delay.
pub struct RelevanceScorer {
    categories: Vec<Category>,
    min_relevance_score: f64,
}

impl RelevanceScorer {
    /// Create a scorer with the default category table, applying per-name
    /// delay overrides from configuration.
    pub fn new(min_relevance_score: f64, delay_overrides: &HashMap<String, f64>) -> Self {
        let mut categories = default_categories();
        for category in &mut categories {
            if let Some(&delay) = delay_overrides.get(category.name) {
                category.delay_seconds = delay;
            }
        }
        Self {
            categories,
            min_relevance_score,
        }
    }

    /// Score one segment and compute its capture delay.
    ///
    /// Returns `(score, delay_seconds)` with the score clamped to [0, 1].
    pub fn score_and_delay(&self, text: &str, index: usize, segment_count: usize) -> (f64, f64) {
        let mut score = 0.0;
        let mut max_delay: f64 = 0.0;
        let text_lower = text.to_lowercase();

        // Weight accrues once per keyword hit, not once per category;
        // the clamp below bounds stacked hits.
        for category in &self.categories {
            for keyword in category.keywords {
                if text_lower.contains(keyword) {
                    score += category.weight;
                    max_delay = max_delay.max(category.delay_seconds);
                }
            }
        }

        // Bonus for longer segments (more content); the larger bonus
        // replaces the smaller.
        let word_count = text.split_whitespace().count();
        if word_count > 50 {
            score += 0.2;
        } else if word_count > 20 {
            score += 0.1;
        }

        // Bonus for segments that look like section starts
        if index + 1 < segment_count
            && TRANSITION_CUES.iter().any(|cue| text_lower.contains(cue))
        {
            score += 0.1;
        }

        (score.min(1.0), max_delay)
    }

    /// Convert a transcript into keyframe candidates, one per qualifying
    /// segment, sorted by score descending (stable on ties).
    pub fn analyze(&self, segments: &[TranscriptSegment]) -> Vec<KeyframeCandidate> {
        let mut candidates: Vec<KeyframeCandidate> = segments
            .iter()
            .enumerate()
            .filter_map(|(i, segment)| {
                let (score, delay) = self.score_and_delay(&segment.text, i, segments.len());
                if score < self.min_relevance_score {
                    return None;
                }
                Some(KeyframeCandidate {
                    timestamp_seconds: segment.midpoint() + delay,
                    timestamp_formatted: segment.start_time.clone(),
                    relevance_score: score,
                    context_text: segment.text.clone(),
                    segment_index: i,
                    delay_seconds: delay,
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(Ordering::Equal)
        });

        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::TranscriptSegment;

    fn scorer() -> RelevanceScorer {
        RelevanceScorer::new(0.3, &HashMap::new())
    }

    fn segment(start: f64, end: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment {
            start_seconds: start,
            end_seconds: end,
            start_time: crate::transcript::format_timecode(start),
            end_time: crate::transcript::format_timecode(end),
            text: text.to_string(),
            original_text: text.to_string(),
        }
    }

    #[test]
    fn test_score_bounded() {
        let s = scorer();
        let loaded = "important key critical demo example workflow code configuration \
                      setup share my screen let me show can you see question ask";
        let (score, _) = s.score_and_delay(loaded, 0, 10);
        assert!(score <= 1.0);
        assert!(score >= 0.0);

        let (score, delay) = s.score_and_delay("", 0, 10);
        assert_eq!(score, 0.0);
        assert_eq!(delay, 0.0);
    }

    #[test]
    fn test_delay_dominance_max_not_sum() {
        let s = scorer();
        // "important" carries 0.5s, "share my screen" carries 3.0s
        let (_, delay) = s.score_and_delay("this is important, let me share my screen", 0, 10);
        assert_eq!(delay, 3.0);
    }

    #[test]
    fn test_immediate_screen_share_zero_delay() {
        let s = scorer();
        let (score, delay) = s.score_and_delay("I am sharing my screen", 5, 10);
        assert!(score >= 0.4);
        assert_eq!(delay, 0.0);
    }

    #[test]
    fn test_delay_override_by_name() {
        let mut overrides = HashMap::new();
        overrides.insert("screen_sharing".to_string(), 5.5);
        let s = RelevanceScorer::new(0.3, &overrides);
        let (_, delay) = s.score_and_delay("let me share my screen", 0, 10);
        assert_eq!(delay, 5.5);
    }

    #[test]
    fn test_length_bonus_not_cumulative() {
        let s = scorer();
        let words_25 = vec!["word"; 25].join(" ");
        let words_60 = vec!["word"; 60].join(" ");
        let (short, _) = s.score_and_delay(&words_25, 0, 10);
        let (long, _) = s.score_and_delay(&words_60, 0, 10);
        assert!((short - 0.1).abs() < 1e-9);
        assert!((long - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_transition_bonus_skips_last_segment() {
        let s = scorer();
        let (mid, _) = s.score_and_delay("okay moving on", 0, 10);
        let (last, _) = s.score_and_delay("okay moving on", 9, 10);
        // Both match the transitions keyword category; only the non-final
        // segment gets the section-start bonus on top.
        assert!((mid - last - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_applies_delay_to_midpoint() {
        let s = scorer();
        let segments = vec![
            segment(0.0, 10.0, "let me share my screen with everybody"),
            segment(10.0, 20.0, "unrelated quiet chatter"),
        ];
        let candidates = s.analyze(&segments);
        assert_eq!(candidates.len(), 1);
        // midpoint 5.0 + screen_sharing delay 3.0
        assert_eq!(candidates[0].timestamp_seconds, 8.0);
        assert_eq!(candidates[0].delay_seconds, 3.0);
        assert_eq!(candidates[0].segment_index, 0);
        assert_eq!(candidates[0].timestamp_formatted, "00:00:00");
    }

    #[test]
    fn test_analyze_sorted_by_score_desc() {
        let s = scorer();
        let segments = vec![
            segment(0.0, 10.0, "a quick demo of the process"),
            segment(60.0, 70.0, "let me share my screen for the demo walkthrough"),
        ];
        let candidates = s.analyze(&segments);
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].relevance_score >= candidates[1].relevance_score);
        assert_eq!(candidates[0].segment_index, 1);
    }
}
