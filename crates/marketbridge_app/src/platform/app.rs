use std::io::{self, Write};
use std::thread;
use std::time::Instant;

use anyhow::{anyhow, bail, Context};
use chrono::Local;
use clap::Parser;
use marketbridge_core::{update, AppState, Msg, ResultsPhase, StageName};
use marketbridge_engine::{EngineEvent, EngineHandle};
use marketbridge_logging::{bridge_info, bridge_warn, set_clock_ms};

use super::cli::{self, CampaignArgs, Cli, Command, SentimentArgs, WhatIfArgs};
use super::config::AppConfig;
use super::effects::EffectRunner;
use super::{logging, ui};

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (mut config, source) = AppConfig::load(&cli.config)?;
    if let Some(url) = &cli.api_url {
        config.analysis_url = url.clone();
    }
    logging::initialize(config.log_destination, config.verbose);
    bridge_info!("{}", source);
    bridge_info!(
        "marketbridge starting; service={} tick={:?}",
        config.analysis_url,
        config.tick_interval()
    );

    match &cli.command {
        Command::Campaign(args) => run_campaign(&config, args),
        Command::WhatIf(args) => run_what_if(&config, args),
        Command::Sentiment(args) => run_sentiment(&config, args),
    }
}

fn run_campaign(config: &AppConfig, args: &CampaignArgs) -> anyhow::Result<()> {
    let expand = cli::stages_to_expand(&args.expand)?;

    let mut app = App::new(
        AppState::with_pacing(config.pacing()),
        EffectRunner::new(config.analysis_settings()),
    );
    let mut out = io::stdout().lock();

    app.dispatch(Msg::QueryChanged(args.query.clone()));
    app.dispatch(Msg::ProductChanged(args.product.clone()));
    app.dispatch(Msg::SubmitClicked);
    if let Some(error) = app.state.view().form_error {
        bail!(error);
    }

    let started = Instant::now();
    loop {
        let now = started.elapsed();
        set_clock_ms(u64::try_from(now.as_millis()).unwrap_or(u64::MAX));
        app.dispatch(Msg::Tick { now });
        for msg in app.runner.poll() {
            app.dispatch(msg);
        }
        app.render_progress(&mut out)?;
        if app.state.is_settled() {
            break;
        }
        thread::sleep(config.tick_interval());
    }
    writeln!(out).context("write report")?;

    app.finish(&expand, &mut out)
}

fn run_what_if(config: &AppConfig, args: &WhatIfArgs) -> anyhow::Result<()> {
    let engine = EngineHandle::new(config.analysis_settings());
    engine.what_if(args.request());

    let scenarios = match engine.recv() {
        Some(EngineEvent::ScenariosReady { result }) => result.map_err(|err| {
            bridge_warn!("what-if failed: {}", err);
            anyhow!(err)
        })?,
        other => bail!("unexpected engine reply: {:?}", other),
    };
    bridge_info!("what-if returned {} scenarios", scenarios.len());
    print_lines(ui::render::scenario_lines(&scenarios))
}

fn run_sentiment(config: &AppConfig, args: &SentimentArgs) -> anyhow::Result<()> {
    let request = args.request()?;
    let engine = EngineHandle::new(config.analysis_settings());
    engine.sentiment(request);

    let report = match engine.recv() {
        Some(EngineEvent::SentimentReady { result }) => result.map_err(|err| {
            bridge_warn!("sentiment analysis failed: {}", err);
            anyhow!(err)
        })?,
        other => bail!("unexpected engine reply: {:?}", other),
    };
    print_lines(ui::render::sentiment_lines(&report))
}

fn print_lines(lines: Vec<String>) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    for line in lines {
        writeln!(out, "{}", line).context("write report")?;
    }
    Ok(())
}

struct App {
    state: AppState,
    runner: EffectRunner,
}

impl App {
    fn new(state: AppState, runner: EffectRunner) -> Self {
        Self { state, runner }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
    }

    fn render_progress(&mut self, out: &mut impl Write) -> anyhow::Result<()> {
        if !self.state.consume_dirty() {
            return Ok(());
        }
        if let Some(line) = ui::render::progress_line(&self.state.view()) {
            write!(out, "\r{:<80}", line).context("write progress")?;
            out.flush().context("flush progress")?;
        }
        Ok(())
    }

    /// Opens the requested cards, prints the report and leaves the page.
    fn finish(mut self, expand: &[StageName], out: &mut impl Write) -> anyhow::Result<()> {
        for stage in expand {
            self.dispatch(Msg::CardToggled(*stage));
        }

        let view = self.state.view();
        for line in ui::render::report(&view) {
            writeln!(out, "{}", line).context("write report")?;
        }
        writeln!(out, "\nReport generated {}", Local::now().to_rfc3339())
            .context("write report")?;

        self.dispatch(Msg::ResultsClosed);
        bridge_info!("results closed; phase={:?}", view.phase);

        if view.phase == ResultsPhase::Failed {
            bail!(view
                .failure
                .unwrap_or_else(|| "Campaign failed".to_string()));
        }
        Ok(())
    }
}
