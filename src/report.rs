//! Cross-campaign ranking and report rendering.
//!
//! Everything here is pure formatting and ordering over finalized
//! [`CampaignAnalysisReport`] values; no analytical logic lives in this
//! module.

use crate::analyzer::CampaignAnalysisReport;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Campaign-name fragments that mark throwaway test campaigns.
const TEST_NAME_PATTERNS: [&str; 5] = [
    "my epic adventure",
    "test campaign",
    "demo campaign",
    "tutorial",
    "test-",
];

/// Whether a campaign display name looks like a throwaway test campaign.
pub fn is_test_campaign_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    TEST_NAME_PATTERNS.iter().any(|pattern| lower.contains(pattern))
}

/// Thresholds for excluding statistically insignificant campaigns and
/// bounding the presented subset.
#[derive(Debug, Clone)]
pub struct ReportFilter {
    /// Campaigns with fewer turns than this are dropped.
    pub min_turns: usize,
    /// Campaigns below this desync rate are dropped.
    pub min_desync_rate: f64,
    /// At most this many campaigns are kept after ranking.
    pub top: usize,
    /// Drop campaigns whose name matches known test-campaign patterns.
    pub exclude_test_campaigns: bool,
}

impl Default for ReportFilter {
    fn default() -> Self {
        Self {
            min_turns: 0,
            min_desync_rate: 0.0,
            top: usize::MAX,
            exclude_test_campaigns: false,
        }
    }
}

impl ReportFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require at least this many turns.
    pub fn with_min_turns(mut self, min_turns: usize) -> Self {
        self.min_turns = min_turns;
        self
    }

    /// Require at least this desync rate.
    pub fn with_min_desync_rate(mut self, rate: f64) -> Self {
        self.min_desync_rate = rate;
        self
    }

    /// Keep only the top N campaigns after ranking.
    pub fn with_top(mut self, top: usize) -> Self {
        self.top = top;
        self
    }

    /// Exclude campaigns with test-looking names.
    pub fn without_test_campaigns(mut self) -> Self {
        self.exclude_test_campaigns = true;
        self
    }

    fn passes(&self, report: &CampaignAnalysisReport) -> bool {
        report.total_turns >= self.min_turns
            && report.desync_rate >= self.min_desync_rate
            && !(self.exclude_test_campaigns && is_test_campaign_name(&report.campaign_name))
    }
}

/// Structured cross-campaign summary, ready for serialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_campaigns_analyzed: usize,
    pub total_turns: usize,
    pub total_desync_turns: usize,
    /// Ranked subset of reports, worst desync rate first.
    pub top_campaigns: Vec<CampaignAnalysisReport>,
}

/// Ranks and filters campaign reports and renders summaries.
#[derive(Debug, Clone, Default)]
pub struct ReportAggregator {
    filter: ReportFilter,
}

impl ReportAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(filter: ReportFilter) -> Self {
        Self { filter }
    }

    /// Filter and rank reports by desync rate, descending. Ties break on
    /// campaign id so output order is deterministic.
    pub fn rank<'a>(
        &self,
        reports: &'a [CampaignAnalysisReport],
    ) -> Vec<&'a CampaignAnalysisReport> {
        let mut ranked: Vec<_> = reports.iter().filter(|r| self.filter.passes(r)).collect();
        ranked.sort_by(|a, b| {
            b.desync_rate
                .partial_cmp(&a.desync_rate)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.campaign_id.cmp(&b.campaign_id))
        });
        ranked.truncate(self.filter.top);
        ranked
    }

    /// Build the structured summary over a set of reports.
    ///
    /// The totals cover every input report; only `top_campaigns` is
    /// subject to filtering and truncation.
    pub fn summarize(&self, reports: &[CampaignAnalysisReport]) -> AnalysisSummary {
        AnalysisSummary {
            total_campaigns_analyzed: reports.len(),
            total_turns: reports.iter().map(|r| r.total_turns).sum(),
            total_desync_turns: reports.iter().map(|r| r.desync_turns).sum(),
            top_campaigns: self.rank(reports).into_iter().cloned().collect(),
        }
    }

    /// Render a markdown report of the ranked campaigns, with pattern
    /// breakdowns and up to three example incidents each.
    pub fn render_markdown(&self, summary: &AnalysisSummary) -> String {
        let mut md = String::new();
        md.push_str("# Campaign Desync Analysis\n\n");
        md.push_str(&format!(
            "- Campaigns analyzed: {}\n",
            summary.total_campaigns_analyzed
        ));
        md.push_str(&format!("- Total turns: {}\n", summary.total_turns));
        md.push_str(&format!(
            "- Total desync turns: {}\n\n",
            summary.total_desync_turns
        ));

        md.push_str("## Ranked Campaigns\n\n");
        for (rank, report) in summary.top_campaigns.iter().enumerate() {
            md.push_str(&format!("### {}. {}\n", rank + 1, report.campaign_name));
            md.push_str(&format!("- **Campaign ID**: {}\n", report.campaign_id));
            md.push_str(&format!("- **Sessions**: {}\n", report.total_sessions));
            md.push_str(&format!(
                "- **Desync Rate**: {:.1}% ({} incidents in {} turns)\n",
                report.desync_rate * 100.0,
                report.desync_turns,
                report.total_turns
            ));
            if report.skipped_turns > 0 {
                md.push_str(&format!("- **Turns Skipped**: {}\n", report.skipped_turns));
            }

            if !report.pattern_counts.is_empty() {
                let breakdown = report
                    .pattern_counts
                    .iter()
                    .map(|(category, count)| format!("{category}: {count}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                md.push_str(&format!("- **Pattern Breakdown**: {breakdown}\n"));
            }

            if !report.patterns.is_empty() {
                md.push_str("- **Example Desyncs**:\n");
                for pattern in report.patterns.iter().take(3) {
                    md.push_str(&format!(
                        "  - Session {}, turn {}: missing {} ({})\n",
                        pattern.session,
                        pattern.turn,
                        pattern.missing_entities.join(", "),
                        pattern.category
                    ));
                }
            }
            md.push('\n');
        }

        md
    }

    /// Render a short plain-text summary, one line per ranked campaign.
    pub fn render_text(&self, summary: &AnalysisSummary) -> String {
        let mut text = format!(
            "{} campaigns analyzed, {} desync turns across {} turns\n",
            summary.total_campaigns_analyzed, summary.total_desync_turns, summary.total_turns
        );
        for report in &summary.top_campaigns {
            text.push_str(&format!(
                "  {}: {}/{} desyncs ({:.1}%)\n",
                report.campaign_id,
                report.desync_turns,
                report.total_turns,
                report.desync_rate * 100.0
            ));
        }
        text
    }
}
