//! Applies many rules' edits to one buffer.
//!
//! Edits are filtered against the disabled-region table, sorted by start
//! offset (stable, so equal starts keep their submission order), and
//! accepted greedily: an edit starting before the end of the previously
//! accepted one is dropped. The survivors are pairwise disjoint and are
//! applied in one left-to-right pass over the original buffer.

use crate::position::AbsolutePosition;
use crate::regions::DisabledRegions;
use crate::types::Correction;
use serde::Serialize;

/// A correction tagged with the rule that proposed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingCorrection {
    /// Originating rule.
    pub rule_id: String,
    /// The edit, in original buffer coordinates.
    pub correction: Correction,
}

impl PendingCorrection {
    /// Tags `correction` with `rule_id`.
    #[must_use]
    pub fn new(rule_id: impl Into<String>, correction: Correction) -> Self {
        Self {
            rule_id: rule_id.into(),
            correction,
        }
    }

    /// Start offset.
    #[must_use]
    pub fn start(&self) -> AbsolutePosition {
        self.correction.start
    }

    /// End offset.
    #[must_use]
    pub fn end(&self) -> AbsolutePosition {
        self.correction.end
    }
}

/// Why a correction was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum DropReason {
    /// The range touches a region where the rule is disabled.
    Disabled,
    /// The range is reversed, out of bounds or splits a character.
    Invalid {
        /// What is wrong with it.
        message: String,
    },
    /// The range overlaps an earlier accepted correction.
    Conflict {
        /// Rule of the accepted correction.
        with_rule: String,
    },
}

/// A correction the engine refused, reported for information only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedCorrection {
    /// The refused correction.
    pub correction: PendingCorrection,
    /// Why.
    pub reason: DropReason,
}

/// Result of [`CorrectionEngine::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrectionOutcome {
    /// The rewritten buffer.
    pub output: String,
    /// Applied corrections sorted by start, in original coordinates.
    pub applied: Vec<PendingCorrection>,
    /// Refused corrections.
    pub dropped: Vec<DroppedCorrection>,
}

impl CorrectionOutcome {
    /// Whether anything was applied.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Applies non-conflicting corrections to a buffer.
#[derive(Debug, Clone, Copy)]
pub struct CorrectionEngine<'r> {
    regions: Option<&'r DisabledRegions>,
}

impl<'r> CorrectionEngine<'r> {
    /// An engine that honors `regions`.
    #[must_use]
    pub fn new(regions: &'r DisabledRegions) -> Self {
        Self {
            regions: Some(regions),
        }
    }

    /// An engine with no disabled regions.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self { regions: None }
    }

    /// Applies `corrections` to `source`.
    #[must_use]
    pub fn apply(&self, source: &str, corrections: Vec<PendingCorrection>) -> CorrectionOutcome {
        let mut dropped = Vec::new();
        let mut candidates = Vec::with_capacity(corrections.len());
        for pending in corrections {
            if let Err(message) = check_bounds(source, &pending.correction) {
                dropped.push(DroppedCorrection {
                    correction: pending,
                    reason: DropReason::Invalid { message },
                });
            } else if self.is_disabled(&pending) {
                dropped.push(DroppedCorrection {
                    correction: pending,
                    reason: DropReason::Disabled,
                });
            } else {
                candidates.push(pending);
            }
        }

        // `sort_by_key` is stable: equal starts keep submission order.
        candidates.sort_by_key(PendingCorrection::start);

        let mut applied: Vec<PendingCorrection> = Vec::with_capacity(candidates.len());
        for pending in candidates {
            match applied.last() {
                Some(previous) if pending.start() < previous.end() => {
                    let with_rule = previous.rule_id.clone();
                    dropped.push(DroppedCorrection {
                        correction: pending,
                        reason: DropReason::Conflict { with_rule },
                    });
                }
                _ => applied.push(pending),
            }
        }

        for refused in &dropped {
            tracing::debug!(
                rule = %refused.correction.rule_id,
                start = refused.correction.start().offset(),
                end = refused.correction.end().offset(),
                reason = ?refused.reason,
                "dropped correction"
            );
        }

        let output = rewrite(source, &applied);
        CorrectionOutcome {
            output,
            applied,
            dropped,
        }
    }

    fn is_disabled(&self, pending: &PendingCorrection) -> bool {
        self.regions.is_some_and(|regions| {
            regions.is_disabled(&pending.rule_id, pending.start())
                || regions.is_disabled(&pending.rule_id, pending.end())
        })
    }
}

fn check_bounds(source: &str, correction: &Correction) -> Result<(), String> {
    let (start, end) = (correction.start.offset(), correction.end.offset());
    if start > end {
        return Err(format!("start {start} is after end {end}"));
    }
    if end > source.len() {
        return Err(format!("end {end} is past the buffer length {}", source.len()));
    }
    if !source.is_char_boundary(start) || !source.is_char_boundary(end) {
        return Err(format!("range {start}..{end} splits a character"));
    }
    Ok(())
}

/// Copies untouched spans and substitutes replacements for sorted, disjoint ranges.
fn rewrite(source: &str, applied: &[PendingCorrection]) -> String {
    let extra: usize = applied.iter().map(|p| p.correction.replacement.len()).sum();
    let mut output = String::with_capacity(source.len() + extra);
    let mut cursor = 0;
    for pending in applied {
        let (start, end) = (pending.start().offset(), pending.end().offset());
        output.push_str(&source[cursor..start]);
        output.push_str(&pending.correction.replacement);
        cursor = end;
    }
    output.push_str(&source[cursor..]);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::ByteRange;
    use crate::regions::{DisabledRegion, RuleSelector};

    fn edit(rule: &str, start: usize, end: usize, replacement: &str) -> PendingCorrection {
        PendingCorrection::new(
            rule,
            Correction::replace(
                ByteRange::new(AbsolutePosition(start), AbsolutePosition(end)),
                replacement,
            ),
        )
    }

    #[test]
    fn applies_in_one_pass_with_original_coordinates() {
        let source = "foo ()  .bar ()";
        let outcome = CorrectionEngine::unrestricted().apply(
            source,
            vec![edit("b", 12, 13, ""), edit("a", 3, 4, ""), edit("c", 6, 8, "")],
        );
        assert_eq!(outcome.output, "foo().bar()");
        let starts: Vec<_> = outcome.applied.iter().map(|p| p.start().offset()).collect();
        assert_eq!(starts, vec![3, 6, 12]);
        assert!(outcome.dropped.is_empty());
    }

    #[test]
    fn overlapping_edits_first_in_sorted_order_wins() {
        let outcome = CorrectionEngine::unrestricted().apply(
            "abcdef",
            vec![edit("late", 2, 5, "X"), edit("early", 1, 3, "Y")],
        );
        assert_eq!(outcome.output, "aYdef");
        assert_eq!(outcome.dropped.len(), 1);
        assert_eq!(
            outcome.dropped[0].reason,
            DropReason::Conflict {
                with_rule: "early".into()
            }
        );
    }

    #[test]
    fn equal_starts_keep_submission_order() {
        let outcome = CorrectionEngine::unrestricted().apply(
            "abc",
            vec![edit("one", 1, 1, "1"), edit("two", 1, 1, "2"), edit("three", 1, 2, "3")],
        );
        assert_eq!(outcome.output, "a123c");
        assert!(outcome.dropped.is_empty());
    }

    #[test]
    fn touching_ranges_do_not_conflict() {
        let outcome = CorrectionEngine::unrestricted()
            .apply("abcd", vec![edit("a", 0, 2, "X"), edit("b", 2, 4, "Y")]);
        assert_eq!(outcome.output, "XY");
    }

    #[test]
    fn pure_insertion_and_deletion() {
        let outcome = CorrectionEngine::unrestricted()
            .apply("ab", vec![edit("ins", 0, 0, ">"), edit("del", 1, 2, "")]);
        assert_eq!(outcome.output, ">a");
    }

    #[test]
    fn invalid_ranges_are_dropped() {
        let outcome = CorrectionEngine::unrestricted().apply(
            "é",
            vec![
                PendingCorrection::new(
                    "rev",
                    Correction {
                        start: AbsolutePosition(1),
                        end: AbsolutePosition(0),
                        replacement: String::new(),
                    },
                ),
                edit("oob", 0, 9, ""),
                edit("split", 1, 2, ""),
            ],
        );
        assert_eq!(outcome.output, "é");
        assert_eq!(outcome.dropped.len(), 3);
        assert!(outcome
            .dropped
            .iter()
            .all(|d| matches!(d.reason, DropReason::Invalid { .. })));
    }

    #[test]
    fn disabled_regions_suppress_matching_rules_only() {
        let regions = DisabledRegions::new(vec![DisabledRegion {
            selector: RuleSelector::Rule("quiet".into()),
            range: ByteRange::new(AbsolutePosition(0), AbsolutePosition(2)),
        }]);
        let outcome = CorrectionEngine::new(&regions).apply(
            "abcdef",
            vec![edit("quiet", 1, 2, "X"), edit("loud", 0, 1, "Y"), edit("quiet", 4, 5, "Z")],
        );
        assert_eq!(outcome.output, "YbcdZf");
        assert_eq!(outcome.dropped.len(), 1);
        assert_eq!(outcome.dropped[0].reason, DropReason::Disabled);
    }

    #[test]
    fn accepted_ranges_are_sorted_and_disjoint() {
        let edits = vec![
            edit("a", 5, 9, ""),
            edit("b", 0, 3, ""),
            edit("c", 2, 6, ""),
            edit("d", 9, 9, "!"),
            edit("e", 8, 12, ""),
            edit("f", 12, 14, ""),
        ];
        let outcome = CorrectionEngine::unrestricted().apply("0123456789abcdef", edits);
        for pair in outcome.applied.windows(2) {
            assert!(pair[0].end() <= pair[1].start());
        }
    }
}
