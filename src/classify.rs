//! Desync pattern classification.
//!
//! Assigns a cause category to a turn with missing entities. The rules
//! form an ordered decision list; the first matching rule wins. Combat
//! correctness is the highest-value signal (a player-facing fairness
//! issue), so it dominates; structural causes come before the catch-all
//! because a precise category drives different remediation.

use crate::state::GameState;
use crate::validator::ValidationResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cause categories for a desync. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternCategory {
    /// Combat was active and a participant went unmentioned.
    CombatEntityMissing,
    /// NPC records span more than one location; the narrator likely
    /// followed the wrong group.
    SplitPartyConfusion,
    /// A missing entity's record says it is unconscious.
    UnconsciousOmission,
    /// A missing entity's record says it is hidden.
    HiddenCharacter,
    /// The narrative never referenced the current location; presence of
    /// anyone in the scene is ambiguous.
    PresenceAmbiguity,
    /// No more specific cause identified.
    GeneralEntityOmission,
}

impl PatternCategory {
    /// Stable wire name, matching the serialized form.
    pub fn name(&self) -> &'static str {
        match self {
            PatternCategory::CombatEntityMissing => "combat_entity_missing",
            PatternCategory::SplitPartyConfusion => "split_party_confusion",
            PatternCategory::UnconsciousOmission => "unconscious_omission",
            PatternCategory::HiddenCharacter => "hidden_character",
            PatternCategory::PresenceAmbiguity => "presence_ambiguity",
            PatternCategory::GeneralEntityOmission => "general_entity_omission",
        }
    }

    /// All categories, in classification precedence order.
    pub fn all() -> [PatternCategory; 6] {
        [
            PatternCategory::CombatEntityMissing,
            PatternCategory::SplitPartyConfusion,
            PatternCategory::UnconsciousOmission,
            PatternCategory::HiddenCharacter,
            PatternCategory::PresenceAmbiguity,
            PatternCategory::GeneralEntityOmission,
        ]
    }
}

impl fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One entry in the decision list.
struct Rule {
    category: PatternCategory,
    applies: fn(&GameState, &ValidationResult) -> bool,
}

/// Precedence-ordered rules. New categories slot in here without
/// touching the classification control flow.
const RULES: [Rule; 5] = [
    Rule {
        category: PatternCategory::CombatEntityMissing,
        applies: combat_active,
    },
    Rule {
        category: PatternCategory::SplitPartyConfusion,
        applies: party_is_split,
    },
    Rule {
        category: PatternCategory::UnconsciousOmission,
        applies: missing_entity_unconscious,
    },
    Rule {
        category: PatternCategory::HiddenCharacter,
        applies: missing_entity_hidden,
    },
    Rule {
        category: PatternCategory::PresenceAmbiguity,
        applies: presence_ambiguous,
    },
];

/// Classify why a turn with missing entities desynced.
///
/// Only meaningful when `result.entities_missing` is non-empty; callers
/// route passing turns elsewhere.
pub fn classify(state: &GameState, result: &ValidationResult) -> PatternCategory {
    RULES
        .iter()
        .find(|rule| (rule.applies)(state, result))
        .map(|rule| rule.category)
        .unwrap_or(PatternCategory::GeneralEntityOmission)
}

fn combat_active(state: &GameState, _result: &ValidationResult) -> bool {
    state.in_combat()
}

fn party_is_split(state: &GameState, _result: &ValidationResult) -> bool {
    state.npc_locations().len() > 1
}

fn missing_entity_unconscious(state: &GameState, result: &ValidationResult) -> bool {
    result
        .entities_missing
        .iter()
        .any(|name| state.find_npc(name).is_some_and(|npc| npc.conscious == Some(false)))
}

fn missing_entity_hidden(state: &GameState, result: &ValidationResult) -> bool {
    result
        .entities_missing
        .iter()
        .any(|name| state.find_npc(name).is_some_and(|npc| npc.hidden == Some(true)))
}

fn presence_ambiguous(_state: &GameState, result: &ValidationResult) -> bool {
    result.location_mismatch.is_some()
}
