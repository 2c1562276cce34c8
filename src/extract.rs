//! Expected-entity derivation from game-state snapshots.
//!
//! Pure function of the snapshot: no side effects, never fails. Missing
//! or malformed sub-maps degrade to empty sets.

use crate::state::GameState;
use std::collections::BTreeSet;

/// The entities a narrative should and should not be required to mention,
/// derived from one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedEntities {
    /// Display names that must appear in the narrative.
    pub active: BTreeSet<String>,
    /// Hidden, unconscious, or absent entities. Not required, and kept
    /// separate so callers never flag them as missing.
    pub excluded: BTreeSet<String>,
    /// Current location names, consumed by the location-mismatch check
    /// rather than the character-presence check.
    pub locations: BTreeSet<String>,
}

impl ExpectedEntities {
    /// Whether there is nothing to validate against.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Derive the expected-entity sets for a snapshot.
///
/// Player characters with a non-empty name are active unless marked
/// hidden or unconscious. NPCs are active iff present, conscious, and
/// not hidden, with unset flags defaulting to visible. When combat is
/// active, every listed participant is forced active regardless of its
/// record's flags: combat narration must name all active combatants even
/// when other metadata is stale. A participant with no matching record
/// is still required rather than silently dropped.
pub fn expected_entities(state: &GameState) -> ExpectedEntities {
    let mut expected = ExpectedEntities::default();

    for pc in state.player_characters.values() {
        if pc.name.is_empty() {
            continue;
        }
        if pc.is_observable() {
            expected.active.insert(pc.name.clone());
        } else {
            expected.excluded.insert(pc.name.clone());
        }
    }

    for (key, npc) in &state.npcs {
        let name = npc.display_name(key);
        if name.is_empty() {
            continue;
        }
        if npc.is_observable() {
            expected.active.insert(name.to_string());
        } else {
            expected.excluded.insert(name.to_string());
        }
    }

    if let Some(combat) = &state.combat {
        if combat.in_combat {
            for participant in &combat.participants {
                if participant.is_empty() {
                    continue;
                }
                expected.excluded.remove(participant);
                expected.active.insert(participant.clone());
            }
        }
    }

    if let Some(location) = &state.world.current_location {
        if !location.is_empty() {
            expected.locations.insert(location.clone());
        }
    }

    expected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CombatState, Npc, PlayerCharacter};

    fn state_with_npc(key: &str, npc: Npc) -> GameState {
        let mut state = GameState::default();
        state.npcs.insert(key.to_string(), npc);
        state
    }

    #[test]
    fn test_empty_state_yields_empty_sets() {
        let expected = expected_entities(&GameState::default());
        assert!(expected.is_empty());
        assert!(expected.excluded.is_empty());
        assert!(expected.locations.is_empty());
    }

    #[test]
    fn test_player_character_active() {
        let mut state = GameState::default();
        state
            .player_characters
            .insert("pc1".to_string(), PlayerCharacter::new("Sariel"));

        let expected = expected_entities(&state);
        assert!(expected.active.contains("Sariel"));
    }

    #[test]
    fn test_unconscious_pc_excluded() {
        let mut state = GameState::default();
        let mut pc = PlayerCharacter::new("Sariel");
        pc.conscious = Some(false);
        state.player_characters.insert("pc1".to_string(), pc);

        let expected = expected_entities(&state);
        assert!(!expected.active.contains("Sariel"));
        assert!(expected.excluded.contains("Sariel"));
    }

    #[test]
    fn test_nameless_pc_skipped() {
        let mut state = GameState::default();
        state
            .player_characters
            .insert("pc1".to_string(), PlayerCharacter::default());

        assert!(expected_entities(&state).is_empty());
    }

    #[test]
    fn test_untagged_npc_is_active() {
        let state = state_with_npc("Cassian", Npc::default());
        let expected = expected_entities(&state);
        assert!(expected.active.contains("Cassian"));
    }

    #[test]
    fn test_hidden_npc_excluded() {
        let state = state_with_npc(
            "Zara",
            Npc {
                hidden: Some(true),
                ..Default::default()
            },
        );
        let expected = expected_entities(&state);
        assert!(!expected.active.contains("Zara"));
        assert!(expected.excluded.contains("Zara"));
    }

    #[test]
    fn test_npc_display_name_used() {
        let state = state_with_npc(
            "cassian",
            Npc {
                name: Some("Prince Cassian Arcanus".to_string()),
                ..Default::default()
            },
        );
        let expected = expected_entities(&state);
        assert!(expected.active.contains("Prince Cassian Arcanus"));
        assert!(!expected.active.contains("cassian"));
    }

    #[test]
    fn test_combat_overrides_flags() {
        let mut state = state_with_npc(
            "Zara",
            Npc {
                hidden: Some(true),
                ..Default::default()
            },
        );
        state.combat = Some(CombatState {
            in_combat: true,
            round: 2,
            participants: vec!["Zara".to_string(), "Guard".to_string()],
        });

        let expected = expected_entities(&state);
        // Combat forces the hidden NPC back into the required set, and
        // the unknown participant "Guard" is required too.
        assert!(expected.active.contains("Zara"));
        assert!(!expected.excluded.contains("Zara"));
        assert!(expected.active.contains("Guard"));
    }

    #[test]
    fn test_inactive_combat_does_not_override() {
        let mut state = GameState::default();
        state.combat = Some(CombatState {
            in_combat: false,
            round: 0,
            participants: vec!["Guard".to_string()],
        });

        assert!(expected_entities(&state).is_empty());
    }

    #[test]
    fn test_location_in_separate_subset() {
        let mut state = GameState::default();
        state.world.current_location = Some("Throne Room".to_string());

        let expected = expected_entities(&state);
        assert!(expected.active.is_empty());
        assert!(expected.locations.contains("Throne Room"));
    }
}
