//! Edit plans parsed from free-text prompts.
//!
//! A prompt is a sequence of `.`-separated clauses:
//! `Keep: 0:10-0:25, 1:00-1:30. Order: 2,1. Output: mp4. Quality: high.`
//!
//! Parsing is lenient and never fails; unrecognized clauses and malformed
//! fragments are dropped. Validation is what rejects a plan that cannot be
//! cut.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timestamp::parse_timestamp;

/// Output container when the prompt has no `output:` clause.
pub const DEFAULT_OUTPUT_FORMAT: &str = "mp4";
/// Quality tier when the prompt has no `quality:` clause.
pub const DEFAULT_QUALITY: &str = "medium";

/// One retained time range of the source video, as written in the prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Segment {
    /// 1-based position of this range within its `keep:` clause.
    pub index: u32,
    /// Start timestamp text, resolved during validation.
    pub start: String,
    /// End timestamp text, resolved during validation.
    pub end: String,
}

/// Structured edit plan derived from a prompt. Unvalidated: segments may
/// still carry unparseable timestamps or inverted ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EditPlan {
    /// Segments in prompt declaration order.
    pub segments: Vec<Segment>,
    /// Segment indices in final output order.
    pub order: Vec<u32>,
    pub output_format: String,
    pub quality: String,
}

impl Default for EditPlan {
    fn default() -> Self {
        Self {
            segments: Vec::new(),
            order: Vec::new(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            quality: DEFAULT_QUALITY.to_string(),
        }
    }
}

/// An ordered cut instruction with resolved boundaries in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedSegment {
    pub start_secs: f64,
    pub end_secs: f64,
}

/// Fatal plan validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("no cuttable time ranges found in prompt")]
    EmptyPlan,

    #[error("order references no existing segments")]
    NoValidOrder,

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("segment end ({end}s) must be after start ({start}s)")]
    InvalidRange { start: f64, end: f64 },
}

impl EditPlan {
    /// Parse a free-text prompt into an edit plan. Never fails: an unusable
    /// prompt parses to an empty plan that is rejected by [`validate`].
    ///
    /// [`validate`]: EditPlan::validate
    pub fn parse(prompt: &str) -> Self {
        let mut plan = EditPlan::default();

        for clause in prompt.split('.') {
            let clause = clause.trim();

            if let Some(rest) = strip_directive(clause, "keep:") {
                plan.parse_keep(rest);
            } else if let Some(rest) = strip_directive(clause, "order:") {
                plan.parse_order(rest);
            } else if let Some(rest) = strip_directive(clause, "output:") {
                plan.output_format = rest.trim().to_lowercase();
            } else if let Some(rest) = strip_directive(clause, "quality:") {
                plan.quality = rest.trim().to_lowercase();
            }
        }

        // No usable order clause: keep segments in declaration order.
        if plan.order.is_empty() {
            plan.order = plan.segments.iter().map(|s| s.index).collect();
        }

        plan
    }

    /// Parse `keep:` ranges. Indices track the comma position, so a
    /// malformed pair still consumes its position.
    fn parse_keep(&mut self, rest: &str) {
        for (i, pair) in rest.split(',').enumerate() {
            let times: Vec<&str> = pair.split('-').collect();
            if times.len() != 2 {
                continue;
            }
            self.segments.push(Segment {
                index: i as u32 + 1,
                start: times[0].trim().to_string(),
                end: times[1].trim().to_string(),
            });
        }
    }

    /// Parse an `order:` clause. The whole list is discarded if any entry
    /// fails to parse as an integer.
    fn parse_order(&mut self, rest: &str) {
        let parsed: Result<Vec<u32>, _> =
            rest.split(',').map(|x| x.trim().parse::<u32>()).collect();
        if let Ok(order) = parsed {
            self.order = order;
        }
    }

    /// Validate the plan into an ordered list of resolved segments.
    ///
    /// Order entries referencing non-existent segment indices are skipped.
    /// Unparseable timestamps and inverted ranges on a referenced segment
    /// are fatal.
    pub fn validate(&self) -> Result<Vec<ResolvedSegment>, PlanError> {
        if self.segments.is_empty() {
            return Err(PlanError::EmptyPlan);
        }

        // Duplicate indices resolve to the last segment declared with them.
        let by_index: HashMap<u32, &Segment> =
            self.segments.iter().map(|s| (s.index, s)).collect();

        let ordered: Vec<&Segment> = self
            .order
            .iter()
            .filter_map(|i| by_index.get(i).copied())
            .collect();

        if ordered.is_empty() {
            return Err(PlanError::NoValidOrder);
        }

        let mut resolved = Vec::with_capacity(ordered.len());
        for segment in ordered {
            let start_secs = parse_timestamp(&segment.start)
                .map_err(|_| PlanError::InvalidTimestamp(segment.start.clone()))?;
            let end_secs = parse_timestamp(&segment.end)
                .map_err(|_| PlanError::InvalidTimestamp(segment.end.clone()))?;
            if end_secs <= start_secs {
                return Err(PlanError::InvalidRange {
                    start: start_secs,
                    end: end_secs,
                });
            }
            resolved.push(ResolvedSegment {
                start_secs,
                end_secs,
            });
        }

        Ok(resolved)
    }
}

/// Case-insensitive directive prefix match, returning the clause remainder.
fn strip_directive<'a>(clause: &'a str, prefix: &str) -> Option<&'a str> {
    match clause.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => Some(&clause[prefix.len()..]),
        _ => None,
    }
}
