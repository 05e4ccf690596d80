//! Candidate de-clustering.
//!
//! Screen-share announcements come in bursts, so picking the top N by
//! score alone yields five near-identical frames of the same moment.
//! Selection walks the score-ranked list and enforces a minimum time gap
//! between accepted candidates.

use super::KeyframeCandidate;
use std::cmp::Ordering;

/// Pick up to `max_frames` candidates, keeping at least `min_interval`
/// seconds between any two accepted timestamps.
///
/// Expects `candidates` sorted by score descending. The result is sorted
/// by timestamp ascending. When the input already fits within
/// `max_frames`, all candidates pass through without the gap check.
pub fn select_candidates(
    candidates: Vec<KeyframeCandidate>,
    max_frames: usize,
    min_interval: f64,
) -> Vec<KeyframeCandidate> {
    let mut selected = if candidates.len() <= max_frames {
        candidates
    } else {
        let mut accepted: Vec<KeyframeCandidate> = Vec::with_capacity(max_frames);
        for candidate in candidates {
            let far_enough = accepted.iter().all(|picked| {
                (candidate.timestamp_seconds - picked.timestamp_seconds).abs() >= min_interval
            });
            if far_enough {
                accepted.push(candidate);
                if accepted.len() == max_frames {
                    break;
                }
            }
        }
        accepted
    };

    selected.sort_by(|a, b| {
        a.timestamp_seconds
            .partial_cmp(&b.timestamp_seconds)
            .unwrap_or(Ordering::Equal)
    });
    selected
}
