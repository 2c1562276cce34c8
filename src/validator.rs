//! Narrative validation against a game-state snapshot.

use crate::extract::{expected_entities, ExpectedEntities};
use crate::matcher::{is_mentioned, MIN_TOKEN_LEN};
use crate::state::GameState;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// Narratives shorter than this carry too little text to judge; the
/// validator makes no claim rather than reporting a false positive.
pub const MIN_NARRATIVE_LEN: usize = 50;

/// Narratives longer than this are expected to reference the current
/// location somewhere.
pub const LOCATION_CHECK_MIN_LEN: usize = 100;

/// Outcome of validating one narrative/state pair.
///
/// `entities_found` and `entities_missing` partition
/// `entities_expected`: their union is always the expected set and they
/// are disjoint. A skipped or trivially-passing validation carries empty
/// sets on all three.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub entities_expected: BTreeSet<String>,
    pub entities_found: BTreeSet<String>,
    pub entities_missing: BTreeSet<String>,
    /// A location whose name never surfaced in a long narrative.
    /// Diagnostic metadata for the classifier, not folded into
    /// `entities_missing`.
    pub location_mismatch: Option<String>,
    /// The narrative was too short to judge.
    pub skipped: bool,
    /// Wall-clock cost of the check. Diagnostic only, never serialized.
    pub validation_latency: Duration,
}

impl ValidationResult {
    /// Whether any required entity went unmentioned.
    pub fn has_desync(&self) -> bool {
        !self.entities_missing.is_empty()
    }
}

/// Validate a narrative against the snapshot it was generated from.
pub fn validate(narrative: &str, state: &GameState) -> ValidationResult {
    validate_expected(narrative, expected_entities(state))
}

/// Validate a narrative against an already-derived expected set.
///
/// Callers that need the expected set for their own bookkeeping (the
/// campaign analyzer tracks entity coverage) can derive it once and pass
/// it in.
pub fn validate_expected(narrative: &str, expected: ExpectedEntities) -> ValidationResult {
    let start = Instant::now();
    let mut result = ValidationResult::default();

    if narrative.chars().count() < MIN_NARRATIVE_LEN {
        result.skipped = true;
        result.validation_latency = start.elapsed();
        return result;
    }

    // Nothing to validate: no claim can be made either way.
    if expected.active.is_empty() {
        result.validation_latency = start.elapsed();
        return result;
    }

    for name in &expected.active {
        if is_mentioned(narrative, name) {
            result.entities_found.insert(name.clone());
        } else {
            result.entities_missing.insert(name.clone());
        }
    }
    result.entities_expected = expected.active;

    result.location_mismatch = check_location(narrative, &expected.locations);
    result.validation_latency = start.elapsed();
    result
}

/// Flag a location none of whose significant words appear in a long
/// narrative. Words of [`MIN_TOKEN_LEN`] characters or fewer are ignored.
fn check_location(narrative: &str, locations: &BTreeSet<String>) -> Option<String> {
    if narrative.chars().count() <= LOCATION_CHECK_MIN_LEN {
        return None;
    }

    let narrative_lower = narrative.to_lowercase();
    for location in locations {
        let mentioned = location
            .to_lowercase()
            .split_whitespace()
            .filter(|word| word.chars().count() > MIN_TOKEN_LEN)
            .any(|word| narrative_lower.contains(word));
        if !mentioned {
            return Some(location.clone());
        }
    }
    None
}
