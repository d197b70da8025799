use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};
use points_core::{
    config::{self, PricingConfig},
    FactionBuilder, FactionDiscovery, FactionLoader, PricedFaction, RulesetVersion,
};

/// Price faction rosters and print the results as JSON.
#[derive(Debug, Parser)]
#[command(name = "onepage-points", version, about)]
struct Args {
    /// Faction directories to price.
    factions: Vec<PathBuf>,

    /// Price every faction directory found beneath this root.
    #[arg(long, value_name = "ROOT")]
    all: Option<PathBuf>,

    /// Configuration file to use instead of the default location.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ruleset version, overriding the configured one.
    #[arg(long, value_name = "ID", value_parser = parse_ruleset)]
    ruleset: Option<RulesetVersion>,

    /// Directory with shared equipment, overriding the configured one.
    #[arg(long, value_name = "DIR")]
    common: Option<PathBuf>,

    /// Write the JSON here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Keep going when a faction fails to build.
    #[arg(long)]
    keep_going: bool,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PricingConfig::load_from(Some(path))?,
        None => {
            config::ensure_default_config()?;
            PricingConfig::load()?
        }
    };
    if let Some(version) = args.ruleset {
        config.ruleset = version;
    }
    if let Some(common) = &args.common {
        config.common_dir = common.clone();
    }

    let mut paths = args.factions.clone();
    if let Some(root) = &args.all {
        let common = root.join(&config.common_dir);
        paths.extend(FactionDiscovery::discover(root, Some(&common))?);
        config.common_dir = common;
    }
    if paths.is_empty() {
        return Err(anyhow!("no faction directories given"));
    }

    let loader = FactionLoader::new(Some(config.common_dir.clone()));
    let builder = FactionBuilder::new(config.ruleset());
    info!("Pricing {} faction(s) with {}", paths.len(), config.ruleset);

    let mut priced: Vec<PricedFaction> = Vec::with_capacity(paths.len());
    for path in &paths {
        match price_faction(&loader, &builder, path) {
            Ok(faction) => priced.push(faction),
            Err(err) if args.keep_going => error!("{err:#}"),
            Err(err) => return Err(err),
        }
    }

    let json = serde_json::to_string_pretty(&priced).context("failed to encode priced factions")?;
    match &args.output {
        Some(path) => fs::write(path, json + "\n")
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}

fn price_faction(
    loader: &FactionLoader,
    builder: &FactionBuilder,
    path: &Path,
) -> Result<PricedFaction> {
    let source = loader.load(path)?;
    Ok(builder.build(&source)?)
}

fn parse_ruleset(id: &str) -> Result<RulesetVersion, String> {
    RulesetVersion::from_id(id).ok_or_else(|| {
        let known = RulesetVersion::ALL.map(RulesetVersion::id).join(", ");
        format!("unknown ruleset '{id}' (expected one of: {known})")
    })
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}
