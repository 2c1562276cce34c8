//! Campaign and game-state snapshot types.
//!
//! These types mirror the documents produced by the persistence layer:
//! a campaign is an ordered list of sessions, each an ordered list of
//! turns, and every turn carries a narrative string plus the game-state
//! snapshot the narrative was generated from. The snapshot is read-only
//! input to the analysis core; nothing here mutates it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Errors from campaign document ingestion.
#[derive(Debug, Error)]
pub enum CampaignDataError {
    #[error("failed to parse campaign document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A player character as recorded in a game-state snapshot.
///
/// Presence flags are tri-state: `None` means the upstream record never
/// set the flag, and the permissive default (visible, conscious) applies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerCharacter {
    pub name: String,
    pub hp: Option<i32>,
    pub hp_max: Option<i32>,
    pub conscious: Option<bool>,
    pub hidden: Option<bool>,
    pub location: Option<String>,
}

impl PlayerCharacter {
    /// Create a player character with only a name set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Whether this character should be observable in narration.
    ///
    /// Unset flags default to conscious and not hidden.
    pub fn is_observable(&self) -> bool {
        self.conscious.unwrap_or(true) && !self.hidden.unwrap_or(false)
    }
}

/// An NPC as recorded in a game-state snapshot.
///
/// NPC records are keyed by id in [`GameState::npcs`]; the optional
/// `name` field overrides the key as the display name (documents often
/// key by short id and carry the full title in `name`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Npc {
    pub name: Option<String>,
    pub present: Option<bool>,
    pub conscious: Option<bool>,
    pub hidden: Option<bool>,
    pub hostile: Option<bool>,
    pub location: Option<String>,
}

impl Npc {
    /// The name narration is expected to use: the `name` field when
    /// present, otherwise the record's map key.
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(key)
    }

    /// Whether this NPC should be observable in narration.
    ///
    /// Permissive default: an NPC whose record never got presence flags
    /// populated is assumed present, conscious, and not hidden. This can
    /// mask desyncs for untagged NPCs; it is preserved deliberately
    /// because tightening it changes reported desync rates.
    pub fn is_observable(&self) -> bool {
        self.present.unwrap_or(true)
            && self.conscious.unwrap_or(true)
            && !self.hidden.unwrap_or(false)
    }
}

/// Combat tracking within a snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatState {
    pub in_combat: bool,
    pub round: u32,
    /// Entity display names, in initiative order.
    pub participants: Vec<String>,
}

/// World-level state within a snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldState {
    pub current_location: Option<String>,
}

/// One game-state snapshot, as supplied by the persistence layer.
///
/// Every sub-structure is optional in the source documents; missing maps
/// deserialize to empty ones so a sparse snapshot degrades to an empty
/// expected-entity set instead of failing. The serde aliases accept the
/// legacy document field names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameState {
    #[serde(alias = "player_character_data")]
    pub player_characters: BTreeMap<String, PlayerCharacter>,
    #[serde(alias = "npc_data")]
    pub npcs: BTreeMap<String, Npc>,
    #[serde(alias = "combat_state")]
    pub combat: Option<CombatState>,
    #[serde(alias = "world_data")]
    pub world: WorldState,
}

impl GameState {
    /// Whether combat is currently active.
    pub fn in_combat(&self) -> bool {
        self.combat.as_ref().is_some_and(|c| c.in_combat)
    }

    /// Find an NPC record by display name (case-insensitive).
    pub fn find_npc(&self, name: &str) -> Option<&Npc> {
        self.npcs
            .iter()
            .find(|(key, npc)| npc.display_name(key).eq_ignore_ascii_case(name))
            .map(|(_, npc)| npc)
    }

    /// Distinct `location` values among NPC records.
    ///
    /// More than one distinct location means the party is split across
    /// scenes, a known source of narration confusion.
    pub fn npc_locations(&self) -> BTreeSet<&str> {
        self.npcs
            .values()
            .filter_map(|npc| npc.location.as_deref())
            .filter(|loc| !loc.is_empty())
            .collect()
    }
}

/// One exchange unit: a generated narrative tied to the snapshot it was
/// generated from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Turn {
    pub turn_number: u32,
    pub narrative: String,
    /// Absent when the document is malformed; the analyzer skips the
    /// turn rather than failing the campaign.
    pub game_state: Option<GameState>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Turn {
    /// Create a turn from a narrative and its snapshot.
    pub fn new(narrative: impl Into<String>, game_state: GameState) -> Self {
        Self {
            narrative: narrative.into(),
            game_state: Some(game_state),
            ..Default::default()
        }
    }
}

/// An ordered run of turns played in one sitting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub session_number: u32,
    pub turns: Vec<Turn>,
}

/// A full campaign document: an identifier, a display name, and an
/// ordered sequence of sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Campaign {
    #[serde(alias = "campaign_id")]
    pub id: String,
    #[serde(alias = "campaign_name")]
    pub name: String,
    pub sessions: Vec<Session>,
}

impl Campaign {
    /// Parse a campaign from a JSON document.
    pub fn from_json(document: &str) -> Result<Self, CampaignDataError> {
        Ok(serde_json::from_str(document)?)
    }
}
