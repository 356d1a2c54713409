use std::sync::OnceLock;

use regex::Regex;

use crate::parser::cached_regex;

const DEFAULT_BUDGET: &str = "$15,000";
const DEFAULT_ROI: &str = "3.2x";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanVerdict {
    ReadyToLaunch,
    ReviewNeeded,
}

impl PlanVerdict {
    pub fn label(self) -> &'static str {
        match self {
            PlanVerdict::ReadyToLaunch => "Ready to Launch",
            PlanVerdict::ReviewNeeded => "Review Needed",
        }
    }
}

/// Headline figures pulled out of the coordinated campaign plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub verdict: PlanVerdict,
    pub budget: String,
    pub roi: String,
}

/// Extracts the verdict, first dollar amount and first ROI multiple from a
/// plan. Missing figures fall back to the service's default estimates.
pub fn summarize_plan(text: &str) -> PlanSummary {
    static BUDGET_RE: OnceLock<Option<Regex>> = OnceLock::new();
    static ROI_RE: OnceLock<Option<Regex>> = OnceLock::new();

    let verdict = if text.contains("REVIEW NEEDED") {
        PlanVerdict::ReviewNeeded
    } else {
        PlanVerdict::ReadyToLaunch
    };

    let budget = cached_regex(&BUDGET_RE, r"\$[\d,]+")
        .and_then(|re| re.find(text))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_BUDGET.to_string());

    let roi = cached_regex(&ROI_RE, r"(\d+\.?\d*)x")
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| format!("{}x", m.as_str()))
        .unwrap_or_else(|| DEFAULT_ROI.to_string());

    PlanSummary {
        verdict,
        budget,
        roi,
    }
}

#[cfg(test)]
mod tests {
    use super::{summarize_plan, PlanVerdict};

    #[test]
    fn extracts_figures_from_generated_plan() {
        let plan = "✅ APPROVED - Summer launch\n\n💰 Budget: $50,000\n🚀 Status: Ready to launch\n📊 Expected ROI: 3.2x in 3-4 months";
        let summary = summarize_plan(plan);
        assert_eq!(summary.verdict, PlanVerdict::ReadyToLaunch);
        assert_eq!(summary.budget, "$50,000");
        assert_eq!(summary.roi, "3.2x");
    }

    #[test]
    fn review_needed_wins() {
        let summary = summarize_plan("⚠️ REVIEW NEEDED - promo\n💰 Budget: $5,000\nROI 2.8x");
        assert_eq!(summary.verdict, PlanVerdict::ReviewNeeded);
        assert_eq!(summary.roi, "2.8x");
    }

    #[test]
    fn falls_back_to_defaults() {
        let summary = summarize_plan("nothing to see");
        assert_eq!(summary.budget, "$15,000");
        assert_eq!(summary.roi, "3.2x");
    }
}
