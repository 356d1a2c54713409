use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use marketbridge_core::{StageName, SubmissionError};
use marketbridge_engine::{SentimentRequest, WhatIfRequest};
use thiserror::Error;

use super::config::DEFAULT_CONFIG_FILENAME;

#[derive(Debug, Parser)]
#[command(
    name = "marketbridge",
    version,
    about = "Run a campaign brief through the creative, finance, inventory and lead agents"
)]
pub struct Cli {
    /// Path to the RON config file.
    #[arg(
        long,
        global = true,
        env = "MARKETBRIDGE_CONFIG",
        default_value = DEFAULT_CONFIG_FILENAME
    )]
    pub config: PathBuf,

    /// Base URL of the analysis service; overrides the config file.
    #[arg(long, global = true, env = "MARKETBRIDGE_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a campaign brief with all four agents.
    Campaign(CampaignArgs),

    /// Project conservative, balanced and aggressive outcomes.
    WhatIf(WhatIfArgs),

    /// Score campaign copy for sentiment and keyword trends.
    Sentiment(SentimentArgs),
}

#[derive(Debug, Args)]
pub struct CampaignArgs {
    /// Campaign brief, e.g. "Summer sale for eco-friendly water bottles".
    #[arg(long, short)]
    pub query: String,

    /// Product the campaign targets.
    #[arg(long, short)]
    pub product: String,

    /// Agent cards to expand in the final report (creative, finance,
    /// inventory, lead) or `all`.
    #[arg(long, value_delimiter = ',')]
    pub expand: Vec<String>,
}

#[derive(Debug, Args)]
pub struct WhatIfArgs {
    /// Discount in percent, 5 to 50.
    #[arg(long, default_value_t = 20.0, value_parser = parse_discount)]
    pub discount: f64,

    /// Campaign length in days.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(7..=180))]
    pub duration: u32,

    /// Audience size.
    #[arg(long, default_value_t = 5_000, value_parser = clap::value_parser!(u32).range(1_000..=100_000))]
    pub target_size: u32,

    /// Budget in dollars.
    #[arg(long, default_value_t = 50_000, value_parser = clap::value_parser!(u32).range(10_000..=500_000))]
    pub budget: u32,
}

#[derive(Debug, Args)]
pub struct SentimentArgs {
    #[arg(long, short)]
    pub product: String,

    /// Campaign copy to score.
    #[arg(long, short = 't')]
    pub campaign_text: String,

    /// Keywords to track, comma separated.
    #[arg(long, short, value_delimiter = ',')]
    pub keywords: Vec<String>,
}

impl WhatIfArgs {
    pub fn request(&self) -> WhatIfRequest {
        WhatIfRequest {
            discount: self.discount,
            duration: self.duration,
            target_size: self.target_size,
            budget: self.budget,
        }
    }
}

impl SentimentArgs {
    /// Builds the request, trimming every field and dropping blank keywords.
    pub fn request(&self) -> Result<SentimentRequest, SubmissionError> {
        let product = self.product.trim();
        let campaign_text = self.campaign_text.trim();
        if product.is_empty() || campaign_text.is_empty() {
            return Err(SubmissionError::MissingFields);
        }
        Ok(SentimentRequest {
            product: product.to_string(),
            campaign_text: campaign_text.to_string(),
            keywords: self
                .keywords
                .iter()
                .map(|keyword| keyword.trim())
                .filter(|keyword| !keyword.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }
}

fn parse_discount(value: &str) -> Result<f64, String> {
    let discount: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("{value:?} is not a number"))?;
    if !(5.0..=50.0).contains(&discount) {
        return Err(format!("discount {discount} is outside 5-50"));
    }
    Ok(discount)
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown agent {0:?}; expected creative, finance, inventory, lead or all")]
pub struct UnknownStage(pub String);

/// Resolves `--expand` values in canonical stage order without duplicates.
pub fn stages_to_expand(values: &[String]) -> Result<Vec<StageName>, UnknownStage> {
    let mut stages = Vec::new();
    for value in values.iter().map(|value| value.trim()) {
        if value.is_empty() {
            continue;
        }
        if value.eq_ignore_ascii_case("all") {
            return Ok(StageName::ALL.to_vec());
        }
        let stage = StageName::parse(value).ok_or_else(|| UnknownStage(value.to_string()))?;
        if !stages.contains(&stage) {
            stages.push(stage);
        }
    }
    stages.sort_by_key(|stage| stage.index());
    Ok(stages)
}
