use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use fanclash_rs::{
    placement, Config, FanclashApiClient, MatchCatalogClient, MatchOdds, Outcome, Session,
    WagerSlipEngine,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fanclash")]
#[command(about = "Fanclash wager slip CLI", long_about = None)]
struct Cli {
    /// Path to the configuration file (default: $FANCLASH_CONFIG or config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the payout of a stake at decimal odds
    Payout {
        #[arg(short, long)]
        stake: Decimal,
        #[arg(short, long)]
        odds: Decimal,
    },
    /// List matches open in the catalog
    Matches,
    /// Show the odds of one match
    Show {
        match_id: String,
    },
    /// Fill a slip and submit it
    Place {
        match_id: String,
        /// home, away or draw
        #[arg(short, long)]
        outcome: Outcome,
        #[arg(short, long)]
        stake: Decimal,
        /// Available wallet balance, the upper bound for the stake
        #[arg(short, long)]
        balance: Decimal,
        /// Overrides the [session] user from the configuration
        #[arg(long)]
        user_id: Option<String>,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tokio::runtime::Runtime::new()?.block_on(run(cli.config, cli.command))
}

fn load_config(path: Option<String>) -> Result<Config> {
    match path.or_else(|| std::env::var("FANCLASH_CONFIG").ok()) {
        Some(path) => Config::from_path(path),
        None => Config::new(),
    }
}

fn connect(config_path: Option<String>) -> Result<(Config, FanclashApiClient)> {
    let config = load_config(config_path)?;
    let client = FanclashApiClient::new(&config)?;
    Ok((config, client))
}

async fn run(config_path: Option<String>, command: Commands) -> Result<()> {
    match command {
        Commands::Payout { stake, odds } => {
            println!("{}", quote(stake, odds)?);
        }
        Commands::Matches => {
            let (_, client) = connect(config_path)?;
            let matches = client.list_matches().await?;
            info!("Catalog returned {} match(es)", matches.len());
            for snapshot in &matches {
                print_match(snapshot);
            }
        }
        Commands::Show { match_id } => {
            let (_, client) = connect(config_path)?;
            let snapshot = client.fetch_match(&match_id).await?;
            print_match(&snapshot);
        }
        Commands::Place {
            match_id,
            outcome,
            stake,
            balance,
            user_id,
        } => {
            let (config, client) = connect(config_path)?;
            let session = match (user_id, config.session.clone()) {
                (Some(user_id), _) => Session::new(user_id),
                (None, Some(session)) => session,
                (None, None) => {
                    anyhow::bail!("No session: pass --user-id or add [session] to the config")
                }
            };

            let mut slip = placement::open_slip(&client, &match_id).await?;
            slip.select_outcome(outcome)?;
            slip.set_stake(stake, balance)?;

            println!(
                "{} vs {}: {} on '{}' @ {} pays {}",
                slip.match_odds().home_team(),
                slip.match_odds().away_team(),
                stake,
                outcome,
                slip.match_odds().odds_for(outcome).unwrap_or_default(),
                slip.potential_payout()
            );

            let receipt = placement::submit_slip(&mut slip, &client, &session).await?;
            println!("Wager placed: {}", receipt.wager_id);
        }
    }

    Ok(())
}

/// Payout of `stake` at `odds` with the same checks a real slip applies.
fn quote(stake: Decimal, odds: Decimal) -> Result<Decimal> {
    let snapshot = MatchOdds::new(
        "quote",
        "home",
        "away",
        BTreeMap::from([(Outcome::Home, odds)]),
        DateTime::<Utc>::MAX_UTC,
    )?;

    let mut slip = WagerSlipEngine::new(Arc::new(snapshot));
    slip.select_outcome(Outcome::Home)?;
    slip.set_stake(stake, stake)?;
    Ok(slip.potential_payout())
}

fn print_match(snapshot: &MatchOdds) {
    println!("{}", "=".repeat(60));
    println!(
        "{} | {} vs {} | kicks off {}",
        snapshot.match_id(),
        snapshot.home_team(),
        snapshot.away_team(),
        snapshot.start_time().format("%Y-%m-%d %H:%M UTC")
    );
    for (outcome, odds) in snapshot.odds() {
        println!("  {:<6} {:>8}", outcome.as_str(), odds.to_string());
    }
}
