//! Campaign analysis: drives validation and classification across every
//! session and turn of a campaign, folding results into a report.
//!
//! Analysis is pure aggregation over already-materialized data: no I/O,
//! no retries. A single bad turn degrades to "no claim" and is counted
//! as skipped rather than aborting the campaign.

use crate::classify::{classify, PatternCategory};
use crate::extract::expected_entities;
use crate::state::{Campaign, GameState, Session, Turn};
use crate::validator::validate_expected;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Maximum characters of narrative preserved in a pattern record.
pub const EXCERPT_MAX_LEN: usize = 200;

/// One detected desync: a turn whose narrative failed to mention at
/// least one required entity. Created once per desync turn and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesyncPattern {
    pub session: u32,
    pub turn: u32,
    #[serde(rename = "pattern_type")]
    pub category: PatternCategory,
    pub expected_entities: Vec<String>,
    pub found_entities: Vec<String>,
    pub missing_entities: Vec<String>,
    /// Narrative truncated to [`EXCERPT_MAX_LEN`] characters.
    pub narrative_excerpt: String,
    /// The turn's own timestamp, when the document carried one. Never
    /// sampled from the wall clock, so re-analysis reproduces the exact
    /// same record.
    pub timestamp: Option<DateTime<Utc>>,
}

/// The terminal artifact of one campaign analysis run. Finalized once,
/// then handed to aggregation or serialization; never mutated after.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignAnalysisReport {
    pub campaign_id: String,
    pub campaign_name: String,
    pub total_sessions: usize,
    pub total_turns: usize,
    /// Turns with at least one missing entity.
    pub desync_turns: usize,
    /// Turns where no claim could be made: missing game state, narrative
    /// too short, or nothing to validate.
    pub skipped_turns: usize,
    /// `desync_turns / total_turns`, 0 for an empty campaign.
    pub desync_rate: f64,
    pub pattern_counts: BTreeMap<PatternCategory, usize>,
    pub patterns: Vec<DesyncPattern>,
    /// Union of every required entity name seen across the campaign,
    /// independent of whether a desync occurred.
    pub entities_tracked: BTreeSet<String>,
}

impl CampaignAnalysisReport {
    /// Whether any desync was detected.
    pub fn has_desyncs(&self) -> bool {
        self.desync_turns > 0
    }

    /// The most frequent pattern category, if any desync occurred.
    /// Ties resolve to the earlier category in precedence order.
    pub fn dominant_category(&self) -> Option<PatternCategory> {
        self.pattern_counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(category, _)| *category)
    }
}

/// Analyzes campaigns for desync patterns.
///
/// The analyzer itself holds no running state; every [`analyze`] call
/// builds a fresh report, so one value can be reused across campaigns,
/// and independent instances can analyze campaigns in parallel with
/// results merged by the caller.
///
/// [`analyze`]: CampaignAnalyzer::analyze
#[derive(Debug, Clone, Copy, Default)]
pub struct CampaignAnalyzer;

impl CampaignAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze a campaign for desync patterns.
    ///
    /// Sessions and turns are visited in document order; session and
    /// turn indices feed into pattern identity, so repeated runs over
    /// the same input produce identical reports.
    pub fn analyze(&self, campaign: &Campaign) -> CampaignAnalysisReport {
        let mut report = CampaignAnalysisReport {
            campaign_id: campaign.id.clone(),
            campaign_name: campaign.name.clone(),
            total_sessions: campaign.sessions.len(),
            ..Default::default()
        };

        for (position, session) in campaign.sessions.iter().enumerate() {
            let session_index = session_index(session, position);
            debug!(
                session = session_index,
                turns = session.turns.len(),
                "analyzing session"
            );
            for (turn_position, turn) in session.turns.iter().enumerate() {
                let turn_index = turn_index(turn, turn_position);
                analyze_turn(&mut report, session_index, turn_index, turn);
            }
        }

        report.desync_rate = if report.total_turns > 0 {
            report.desync_turns as f64 / report.total_turns as f64
        } else {
            0.0
        };

        debug!(
            campaign = %report.campaign_id,
            total_turns = report.total_turns,
            desync_turns = report.desync_turns,
            skipped_turns = report.skipped_turns,
            "campaign analysis complete"
        );
        report
    }
}

fn analyze_turn(
    report: &mut CampaignAnalysisReport,
    session: u32,
    turn_index: u32,
    turn: &Turn,
) {
    report.total_turns += 1;

    let Some(state) = &turn.game_state else {
        warn!(session, turn = turn_index, "turn has no game state, skipping");
        report.skipped_turns += 1;
        return;
    };

    let expected = expected_entities(state);
    report
        .entities_tracked
        .extend(expected.active.iter().cloned());

    // Nothing to validate against.
    if expected.is_empty() {
        report.skipped_turns += 1;
        return;
    }

    let result = validate_expected(&turn.narrative, expected);
    if result.skipped {
        report.skipped_turns += 1;
        return;
    }
    if !result.has_desync() {
        return;
    }

    report.desync_turns += 1;
    let category = classify(state, &result);
    *report.pattern_counts.entry(category).or_default() += 1;
    report.patterns.push(DesyncPattern {
        session,
        turn: turn_index,
        category,
        expected_entities: result.entities_expected.iter().cloned().collect(),
        found_entities: result.entities_found.iter().cloned().collect(),
        missing_entities: result.entities_missing.iter().cloned().collect(),
        narrative_excerpt: excerpt(&turn.narrative),
        timestamp: turn.timestamp,
    });
}

/// Session index used in pattern identity: the recorded session number
/// when the document has one, otherwise 1-based position.
fn session_index(session: &Session, position: usize) -> u32 {
    if session.session_number > 0 {
        session.session_number
    } else {
        position as u32 + 1
    }
}

/// Turn index used in pattern identity; same fallback as sessions.
fn turn_index(turn: &Turn, position: usize) -> u32 {
    if turn.turn_number > 0 {
        turn.turn_number
    } else {
        position as u32 + 1
    }
}

/// Truncate a narrative to [`EXCERPT_MAX_LEN`] characters, appending an
/// ellipsis only when something was actually cut.
fn excerpt(narrative: &str) -> String {
    let mut chars = narrative.char_indices();
    match chars.nth(EXCERPT_MAX_LEN) {
        Some((byte_offset, _)) => {
            let mut excerpt = narrative[..byte_offset].to_string();
            excerpt.push_str("...");
            excerpt
        }
        None => narrative.to_string(),
    }
}

// ============================================================================
// Snapshot export
// ============================================================================

/// A minimal serializable snapshot of a campaign, keeping only the turns
/// where a desync was detected alongside their full game state.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignSnapshot {
    pub campaign_id: String,
    pub campaign_name: String,
    pub total_sessions: usize,
    pub desync_turns: Vec<DesyncTurnSnapshot>,
}

/// One desync turn with the data needed to reproduce the finding.
#[derive(Debug, Clone, Serialize)]
pub struct DesyncTurnSnapshot {
    pub session: u32,
    pub turn: u32,
    pub game_state: GameState,
    pub narrative: String,
    pub desync_info: DesyncPattern,
}

/// Pair a report's desync findings back with the originating turns.
///
/// Turns the report flagged but the campaign no longer contains (the
/// inputs diverged) are silently omitted.
pub fn export_snapshot(campaign: &Campaign, report: &CampaignAnalysisReport) -> CampaignSnapshot {
    let mut desync_turns = Vec::with_capacity(report.patterns.len());

    for pattern in &report.patterns {
        let turn = campaign
            .sessions
            .iter()
            .enumerate()
            .find(|&(position, session)| session_index(session, position) == pattern.session)
            .and_then(|(_, session)| {
                session
                    .turns
                    .iter()
                    .enumerate()
                    .find(|&(position, turn)| turn_index(turn, position) == pattern.turn)
            });

        if let Some((_, turn)) = turn {
            let Some(state) = &turn.game_state else {
                continue;
            };
            desync_turns.push(DesyncTurnSnapshot {
                session: pattern.session,
                turn: pattern.turn,
                game_state: state.clone(),
                narrative: turn.narrative.clone(),
                desync_info: pattern.clone(),
            });
        }
    }

    CampaignSnapshot {
        campaign_id: campaign.id.clone(),
        campaign_name: campaign.name.clone(),
        total_sessions: campaign.sessions.len(),
        desync_turns,
    }
}
