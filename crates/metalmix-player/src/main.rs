/// MetalMix headless player: plays one scripted round at the bar
///
/// Architecture:
///   script/    pour scripts and the fixed 30 FPS run loop
///   presenter/ console presenter (session events → log lines)

mod presenter;
mod script;

use anyhow::{Context, Result};
use clap::Parser;
use metalmix_common::AppConfig;
use metalmix_engine::{IngredientTable, MixerGame};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use presenter::LogPresenter;
use script::{PourStep, RunSummary, Script};

#[derive(Parser, Debug)]
#[command(author, version, about = "Pour, mix and serve one MetalMix drink without a screen")]
struct Cli {
    /// Pour step as BOTTLE=SECONDS (e.g. Alko2=2.5); repeatable, runs in order
    #[arg(long = "pour", value_parser = script::parse_pour)]
    pours: Vec<PourStep>,

    /// Append N random pours
    #[arg(long, value_name = "N")]
    random_pours: Option<usize>,

    /// Seed for --random-pours
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Never press mix
    #[arg(long)]
    no_mix: bool,

    /// Never press serve (the countdown will forfeit the drink)
    #[arg(long)]
    no_serve: bool,

    /// Seconds to idle between the last pour and the mix press
    #[arg(long, default_value_t = 0.0)]
    wait: f64,

    /// TOML config file (log level + [mixer] table)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON ingredient table replacing the built-in bottles
    #[arg(long)]
    ingredients: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .with_context(|| format!("Invalid log level '{}'", config.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("MetalMix player v{}", env!("CARGO_PKG_VERSION"));

    let table = match &cli.ingredients {
        Some(path) => load_table(path)?,
        None => IngredientTable::builtin(),
    };
    tracing::info!("{} bottles on the bar", table.len());

    let mut pours = cli.pours.clone();
    if let Some(count) = cli.random_pours {
        let mut rng = StdRng::seed_from_u64(cli.seed);
        pours.extend(Script::random(&mut rng, &table, count));
    }
    for pour in &pours {
        if !table.contains(pour.id) {
            tracing::warn!("{} is not on the bar; it will pour but add nothing", pour.id);
        }
    }

    let script = Script {
        pours,
        wait: cli.wait.max(0.0),
        mix: !cli.no_mix,
        serve: !cli.no_serve,
    };

    let game = MixerGame::try_from_config(table, &config.mixer).context("Invalid mixer config")?;
    let mut presenter = LogPresenter::default();
    let summary = script::run(game, &script, &mut presenter);
    tracing::debug!("{} presentation cues played", presenter.cues.len());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn load_table(path: &Path) -> Result<IngredientTable> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ingredient table {}", path.display()))?;
    IngredientTable::from_json(&text)
        .with_context(|| format!("Failed to parse ingredient table {}", path.display()))
}

fn print_summary(summary: &RunSummary) {
    println!("=== MetalMix ===");
    for pour in &summary.pours {
        println!("  poured {:<8} {:>5.2}s", pour.id.to_string(), pour.seconds);
    }
    println!("  glass:   {:.0}% full", summary.fill_fraction * 100.0);

    match &summary.mix {
        Some(mix) => {
            println!(
                "  mix:     {} (aggro {:.2}, energy {:.2}, clarity {:.2}, power {:.2})",
                mix.result,
                mix.attributes.aggro,
                mix.attributes.energy_stat,
                mix.attributes.clarity,
                mix.power
            );
            println!(
                "  score:   {} = base {} + combo {} (balance {:.2})",
                mix.score, mix.base_score, mix.combo_bonus, mix.balance
            );
        }
        None => println!("  mix:     never mixed"),
    }

    if summary.rejected_serves > 0 {
        println!("  serve rejected {} time(s): not enough in the glass", summary.rejected_serves);
    }
    match &summary.served {
        Some(served) => println!(
            "  served:  {} / variant {} / {} points{}",
            served.result,
            served.variant,
            served.score,
            if served.forfeit { " (time ran out)" } else { "" }
        ),
        None => println!("  served:  nothing"),
    }
    println!(
        "  state:   {:?} after {:.2}s ({} frames)",
        summary.final_state, summary.elapsed_secs, summary.frames
    );
}
