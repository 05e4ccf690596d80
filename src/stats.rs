//! Model usage accounting.
//!
//! The orchestrator owns one [`UsageTracker`] per run and records the
//! usage returned from each remote call into it. Nothing here talks to
//! the model client; the client only reports what each call cost.

use std::collections::HashMap;
use std::time::Instant;

/// Token and latency figures for one remote model call.
#[derive(Debug, Clone, Default)]
pub struct CallStats {
    pub input_tokens: u32,
    pub output_tokens: u32,
    /// Total tokens. When the API omitted usage data this is an estimate
    /// and `estimated` is set.
    pub total_tokens: u32,
    pub latency_ms: f64,
    pub model_id: String,
    pub estimated: bool,
}

impl CallStats {
    /// Estimate a token count from response text when the API returned no
    /// usage data. Rough approximation of 4 characters per token.
    pub fn estimated_from_text(text: &str, latency_ms: f64, model_id: &str) -> Self {
        Self {
            input_tokens: 0,
            output_tokens: 0,
            total_tokens: (text.len() / 4).max(1) as u32,
            latency_ms,
            model_id: model_id.to_string(),
            estimated: true,
        }
    }

    /// One-line display form for the per-call progress output.
    pub fn display(&self) -> String {
        let tokens = if self.estimated {
            format!("~{} tokens (estimated)", self.total_tokens)
        } else {
            format!(
                "{} in + {} out = {} tokens",
                self.input_tokens, self.output_tokens, self.total_tokens
            )
        };
        format!("{}, {:.1}s, {}", tokens, self.latency_ms / 1000.0, self.model_id)
    }
}

/// Session-wide aggregates over all recorded calls.
#[derive(Debug, Clone, Default)]
pub struct UsageSummary {
    pub total_calls: usize,
    pub individual_calls: usize,
    pub global_calls: usize,
    pub total_tokens: u64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_latency_ms: f64,
    pub average_latency_ms: f64,
    pub session_duration_seconds: f64,
}

/// Accumulates per-call statistics for one pipeline run.
///
/// Individual calls are keyed by meeting folder name; global-phase calls
/// by a caller-chosen label.
#[derive(Debug)]
pub struct UsageTracker {
    individual: HashMap<String, CallStats>,
    global: HashMap<String, CallStats>,
    session_start: Instant,
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageTracker {
    pub fn new() -> Self {
        Self {
            individual: HashMap::new(),
            global: HashMap::new(),
            session_start: Instant::now(),
        }
    }

    /// Record usage for a per-meeting summary call.
    pub fn record_individual(&mut self, folder_name: &str, stats: CallStats) {
        self.individual.insert(folder_name.to_string(), stats);
    }

    /// Record usage for a global-phase call.
    pub fn record_global(&mut self, context: &str, stats: CallStats) {
        self.global.insert(context.to_string(), stats);
    }

    /// Look up the stats recorded for one meeting.
    pub fn individual_stats(&self, folder_name: &str) -> Option<&CallStats> {
        self.individual.get(folder_name)
    }

    /// Look up the stats recorded for a global-phase call.
    pub fn global_stats(&self, context: &str) -> Option<&CallStats> {
        self.global.get(context)
    }

    /// Aggregate everything recorded so far.
    pub fn summary(&self) -> UsageSummary {
        let all: Vec<&CallStats> = self.individual.values().chain(self.global.values()).collect();
        let session_duration_seconds = self.session_start.elapsed().as_secs_f64();

        if all.is_empty() {
            return UsageSummary {
                session_duration_seconds,
                ..UsageSummary::default()
            };
        }

        let total_calls = all.len();
        let total_latency_ms: f64 = all.iter().map(|s| s.latency_ms).sum();

        UsageSummary {
            total_calls,
            individual_calls: self.individual.len(),
            global_calls: self.global.len(),
            total_tokens: all.iter().map(|s| s.total_tokens as u64).sum(),
            total_input_tokens: all.iter().map(|s| s.input_tokens as u64).sum(),
            total_output_tokens: all.iter().map(|s| s.output_tokens as u64).sum(),
            total_latency_ms,
            average_latency_ms: total_latency_ms / total_calls as f64,
            session_duration_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(input: u32, output: u32, latency_ms: f64) -> CallStats {
        CallStats {
            input_tokens: input,
            output_tokens: output,
            total_tokens: input + output,
            latency_ms,
            model_id: "gpt-4o".to_string(),
            estimated: false,
        }
    }

    #[test]
    fn test_empty_tracker_summary() {
        let tracker = UsageTracker::new();
        let summary = tracker.summary();
        assert_eq!(summary.total_calls, 0);
        assert_eq!(summary.total_tokens, 0);
        assert_eq!(summary.average_latency_ms, 0.0);
    }

    #[test]
    fn test_record_and_aggregate() {
        let mut tracker = UsageTracker::new();
        tracker.record_individual("20240101_kickoff", stats(1000, 500, 2000.0));
        tracker.record_individual("20240108_review", stats(2000, 700, 4000.0));
        tracker.record_global("global_summary", stats(3000, 900, 6000.0));

        let summary = tracker.summary();
        assert_eq!(summary.total_calls, 3);
        assert_eq!(summary.individual_calls, 2);
        assert_eq!(summary.global_calls, 1);
        assert_eq!(summary.total_input_tokens, 6000);
        assert_eq!(summary.total_output_tokens, 2100);
        assert_eq!(summary.total_tokens, 8100);
        assert_eq!(summary.average_latency_ms, 4000.0);
    }

    #[test]
    fn test_per_context_lookup() {
        let mut tracker = UsageTracker::new();
        tracker.record_individual("20240101_kickoff", stats(10, 20, 100.0));
        assert!(tracker.individual_stats("20240101_kickoff").is_some());
        assert!(tracker.individual_stats("other").is_none());
        assert!(tracker.global_stats("global_summary").is_none());
    }

    #[test]
    fn test_rerecord_replaces() {
        let mut tracker = UsageTracker::new();
        tracker.record_individual("a", stats(10, 10, 100.0));
        tracker.record_individual("a", stats(20, 20, 200.0));
        assert_eq!(tracker.summary().total_calls, 1);
        assert_eq!(tracker.individual_stats("a").map(|s| s.input_tokens), Some(20));
    }

    #[test]
    fn test_estimated_from_text() {
        let s = CallStats::estimated_from_text(&"x".repeat(400), 1500.0, "gpt-4o");
        assert_eq!(s.total_tokens, 100);
        assert!(s.estimated);
        assert!(s.display().contains("estimated"));

        let s = CallStats::estimated_from_text("", 0.0, "gpt-4o");
        assert_eq!(s.total_tokens, 1);
    }
}
