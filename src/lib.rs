//! Narrative/state desync detection for AI-driven tabletop RPG campaigns.
//!
//! Given a structured game-state snapshot and the freeform narrative an
//! AI game master generated from it, this crate decides whether the
//! narrative faithfully mentions the entities the state says should be
//! observable, classifies why a mismatch happened, and aggregates the
//! findings across whole campaigns.
//!
//! The pipeline, leaf-first:
//! - [`extract`] derives the set of entities a snapshot requires.
//! - [`matcher`] decides whether a name is referenced in a text.
//! - [`validator`] combines the two into a per-turn result.
//! - [`classify`] assigns a cause category to each miss.
//! - [`analyzer`] folds every turn of a campaign into a report.
//! - [`report`] ranks reports across campaigns and renders summaries.
//!
//! The core is synchronous and pure: campaign data is materialized in
//! memory before analysis, and a bad turn degrades to "no claim" instead
//! of failing the run.
//!
//! # Quick Start
//!
//! ```
//! use narrative_sync::{CampaignAnalyzer, ReportAggregator};
//! use narrative_sync::testing::sample_campaign;
//!
//! let campaign = sample_campaign();
//! let report = CampaignAnalyzer::new().analyze(&campaign);
//! assert!(report.has_desyncs());
//!
//! let aggregator = ReportAggregator::new();
//! let summary = aggregator.summarize(std::slice::from_ref(&report));
//! println!("{}", aggregator.render_markdown(&summary));
//! ```

pub mod analyzer;
pub mod classify;
pub mod extract;
pub mod matcher;
pub mod report;
pub mod state;
pub mod testing;
pub mod validator;

// Primary public API
pub use analyzer::{
    export_snapshot, CampaignAnalysisReport, CampaignAnalyzer, CampaignSnapshot, DesyncPattern,
};
pub use classify::{classify, PatternCategory};
pub use extract::{expected_entities, ExpectedEntities};
pub use matcher::is_mentioned;
pub use report::{AnalysisSummary, ReportAggregator, ReportFilter};
pub use state::{
    Campaign, CampaignDataError, CombatState, GameState, Npc, PlayerCharacter, Session, Turn,
    WorldState,
};
pub use validator::{validate, ValidationResult};
