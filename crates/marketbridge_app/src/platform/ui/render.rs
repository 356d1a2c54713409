use marketbridge_core::{
    AppViewModel, ContentBlock, ProgressView, ResultsPhase, StageCardView, StageStatus,
};
use marketbridge_engine::{Scenario, SentimentReport};

use super::constants::*;

/// Single status line shown while the analysis runs.
pub fn progress_line(view: &AppViewModel) -> Option<String> {
    view.progress.as_ref().map(format_progress)
}

/// Full report printed once the run has settled.
pub fn report(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(error) = &view.form_error {
        lines.push(format!("❌ {}", error));
        return lines;
    }
    if view.phase == ResultsPhase::Empty {
        return lines;
    }

    lines.push(view.headline.clone());
    if let Some(progress) = &view.progress {
        lines.push(format_progress(progress));
    }
    lines.push(String::new());

    for card in &view.cards {
        lines.extend(card_lines(card));
    }

    if let Some(failure) = &view.failure {
        lines.push(String::new());
        lines.push(format!("❌ {}", failure));
    }

    if let Some(plan) = &view.plan {
        lines.push(String::new());
        lines.push(format!(
            "Campaign Execution Plan: {} | Budget: {} | Expected ROI: {}",
            plan.verdict.label(),
            plan.budget,
            plan.roi
        ));
    }

    lines
}

/// One block per projected strategy.
pub fn scenario_lines(scenarios: &[Scenario]) -> Vec<String> {
    if scenarios.is_empty() {
        return vec!["No scenarios returned.".to_string()];
    }
    let mut lines = vec!["🔮 What-If Scenarios".to_string()];
    for scenario in scenarios {
        lines.push(String::new());
        lines.push(format!(
            "{}{} ({} risk)",
            CARD_INDENT, scenario.name, scenario.risk_level
        ));
        lines.push(format!(
            "{}{} Discount: {:.1}%",
            BLOCK_INDENT, BULLET, scenario.discount
        ));
        lines.push(format!(
            "{}{} Projected ROI: {:.1}%",
            BLOCK_INDENT, BULLET, scenario.roi
        ));
        lines.push(format!(
            "{}{} Conversion rate: {:.1}%",
            BLOCK_INDENT, BULLET, scenario.conversion_rate
        ));
        lines.push(format!(
            "{}{} Success probability: {}",
            BLOCK_INDENT, BULLET, scenario.probability
        ));
    }
    lines
}

pub fn sentiment_lines(report: &SentimentReport) -> Vec<String> {
    let sentiment = &report.sentiment_analysis;
    let mut lines = vec![
        "💬 Sentiment Analysis".to_string(),
        format!(
            "{}Overall: {} ({:.0}% confidence)",
            CARD_INDENT,
            sentiment.overall_sentiment,
            sentiment.confidence * 100.0
        ),
    ];
    for (emotion, score) in &sentiment.emotions {
        lines.push(format!(
            "{}{} {}: {:.0}%",
            BLOCK_INDENT,
            BULLET,
            emotion,
            score * 100.0
        ));
    }

    let trends = &report.trend_analysis;
    if !trends.keywords.is_empty() || !trends.overall_trend.is_empty() {
        lines.push(String::new());
        lines.push("📈 Trends".to_string());
        if !trends.overall_trend.is_empty() {
            lines.push(format!("{}Overall: {}", CARD_INDENT, trends.overall_trend));
        }
        for keyword in &trends.keywords {
            lines.push(format!(
                "{}{} {}: score {:.2}, volume {:+.1}%, {}",
                BLOCK_INDENT,
                BULLET,
                keyword.keyword,
                keyword.trend_score,
                keyword.volume_change,
                keyword.sentiment_trend
            ));
        }
    }

    let recommendations: Vec<&String> = sentiment
        .recommendations
        .iter()
        .chain(&trends.recommendations)
        .collect();
    if !recommendations.is_empty() {
        lines.push(String::new());
        lines.push("Recommendations".to_string());
        for text in recommendations {
            lines.push(format!("{}{} {}", BLOCK_INDENT, BULLET, text));
        }
    }

    if !report.ai_insights.is_empty() {
        lines.push(String::new());
        lines.push("🤖 Insights".to_string());
        for text in &report.ai_insights {
            lines.push(format!("{}{} {}", BLOCK_INDENT, BULLET, text));
        }
    }
    lines
}

fn format_progress(progress: &ProgressView) -> String {
    let percent = usize::from(progress.percent.min(100));
    let filled = percent * PROGRESS_BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}% {} {}",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled),
        percent,
        progress.stage.glyph(),
        progress.status_line
    )
}

fn card_lines(card: &StageCardView) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} {} {}",
        card.glyph,
        card.label,
        status_glyph(card.status),
        status_label(card.status)
    )];

    if card.expanded {
        for block in &card.blocks {
            lines.extend(block_lines(block));
        }
    } else if card.has_results {
        lines.push(format!(
            "{}(collapsed; --expand {} to view)",
            CARD_INDENT,
            card.stage.wire_key().to_lowercase()
        ));
    }
    lines
}

fn block_lines(block: &ContentBlock) -> Vec<String> {
    match block {
        ContentBlock::Header(text) => {
            let rule: String = std::iter::repeat(HEADER_RULE)
                .take(text.chars().count())
                .collect();
            vec![
                format!("{}{}", CARD_INDENT, text),
                format!("{}{}", CARD_INDENT, rule),
            ]
        }
        ContentBlock::Bullet(text) => vec![format!("{}{} {}", BLOCK_INDENT, BULLET, text)],
        ContentBlock::Plain(text) => vec![format!("{}{}", BLOCK_INDENT, text)],
    }
}

fn status_glyph(status: StageStatus) -> &'static str {
    match status {
        StageStatus::Pending => "⏸",
        StageStatus::Running => "⏳",
        StageStatus::Completed => "✅",
        StageStatus::Failed => "❌",
    }
}

fn status_label(status: StageStatus) -> &'static str {
    match status {
        StageStatus::Pending => "WAITING",
        StageStatus::Running => "PROCESSING...",
        StageStatus::Completed => "COMPLETED",
        StageStatus::Failed => "FAILED",
    }
}
