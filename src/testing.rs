//! Test fixtures for campaign analysis.
//!
//! Small builders over the state types plus a canned campaign with known
//! desyncs, used by the integration tests and usable by downstream
//! crates for their own tests.

use crate::state::{Campaign, CombatState, GameState, Npc, PlayerCharacter, Session, Turn};

/// A present, conscious, visible NPC.
pub fn present_npc() -> Npc {
    Npc {
        present: Some(true),
        ..Default::default()
    }
}

/// A hidden NPC that narration should not be required to mention.
pub fn hidden_npc() -> Npc {
    Npc {
        hidden: Some(true),
        ..Default::default()
    }
}

/// An unconscious NPC.
pub fn unconscious_npc() -> Npc {
    Npc {
        conscious: Some(false),
        ..Default::default()
    }
}

/// Throne-room snapshot: PC "Sariel", NPCs "Cassian" and "Valerius".
pub fn throne_room_state() -> GameState {
    let mut state = GameState::default();
    state
        .player_characters
        .insert("pc1".to_string(), PlayerCharacter::new("Sariel"));
    state.npcs.insert("Cassian".to_string(), present_npc());
    state.npcs.insert("Valerius".to_string(), present_npc());
    state.world.current_location = Some("Throne Room".to_string());
    state
}

/// Combat snapshot with participants Sariel, Cassian, and Guard.
pub fn combat_state() -> GameState {
    let mut state = GameState::default();
    state
        .player_characters
        .insert("pc1".to_string(), PlayerCharacter::new("Sariel"));
    state.npcs.insert(
        "Cassian".to_string(),
        Npc {
            present: Some(true),
            location: Some("throne".to_string()),
            ..Default::default()
        },
    );
    state.npcs.insert("Guard".to_string(), present_npc());
    state.combat = Some(CombatState {
        in_combat: true,
        round: 1,
        participants: vec![
            "Sariel".to_string(),
            "Cassian".to_string(),
            "Guard".to_string(),
        ],
    });
    state
}

/// A one-session campaign with two turns, each carrying a known desync:
/// turn 1 omits Cassian from an exploration scene, turn 2 omits Cassian
/// from active combat.
pub fn sample_campaign() -> Campaign {
    let mut exploration_turn = Turn::new(
        "Sariel stood before the throne as Valerius approached with measured steps.",
        throne_room_state(),
    );
    exploration_turn.turn_number = 1;

    let mut combat_turn = Turn::new(
        "The guard attacked! Sariel dodged sideways while drawing her blade to engage.",
        combat_state(),
    );
    combat_turn.turn_number = 2;

    Campaign {
        id: "sariel_v2_001".to_string(),
        name: "Sariel v2: The Awakening".to_string(),
        sessions: vec![Session {
            session_number: 1,
            turns: vec![exploration_turn, combat_turn],
        }],
    }
}
