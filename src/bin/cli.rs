//! MoodPulse CLI
//!
//! Command-line interface for MoodPulse:
//! - Cast a vote
//! - Show or follow the community tally
//! - Create, fund and inspect testnet accounts
//! - Generate a config file

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use moodpulse::config::{generate_default_config, Config};
use moodpulse::ledger::{HorizonClient, LedgerApi};
use moodpulse::vote::{
    catalog, MoodBoard, MoodPoller, MoodTally, TallySummary, VoteService, MAX_HISTORY_LIMIT, MOODS,
};
use moodpulse::wallet::{KeypairSigner, WalletSession};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Parser)]
#[command(name = "moodpulse")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Emoji mood votes on the Stellar test network")]
#[command(long_about = "MoodPulse records emoji votes as memo-tagged payments on Stellar.\nCast a vote, watch the community tally, and manage testnet accounts.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: searched in the usual locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cast a vote
    Vote {
        /// Emoji or mood name (Happy, Sad, Angry, Tired, Cool)
        mood: String,
        /// Secret seed to sign with (default: MOODPULSE_SECRET_KEY)
        #[arg(long)]
        secret: Option<String>,
    },

    /// Show the community tally
    Tally {
        /// Payment records to scan (at most 200)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Follow the community tally until Ctrl+C
    Watch {
        /// Refresh interval in seconds
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Generate a new keypair
    Keygen,

    /// Fund a testnet account through Friendbot
    Fund {
        /// Account address (G...)
        address: String,
    },

    /// Show the XLM balance of an account
    Balance {
        /// Account address (G...)
        address: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    config.logging.init_tracing();

    let json = cli.format.eq_ignore_ascii_case("json");

    match cli.command {
        Commands::Vote { mood, secret } => {
            let Some(mood) = catalog::resolve(&mood) else {
                let known: Vec<String> = MOODS
                    .iter()
                    .map(|m| format!("{} {}", m.emoji, m.name))
                    .collect();
                bail!("Unknown mood {:?}. Choose one of: {}", mood, known.join(", "));
            };

            let secret = secret
                .or_else(|| config.wallet.secret_key.clone())
                .context("No secret key: pass --secret or set MOODPULSE_SECRET_KEY")?;
            let signer = KeypairSigner::from_secret(&secret, config.network.details())?;
            let mut session = WalletSession::new();
            session.connect(&signer).await?;

            let service = vote_service(&config)?;
            let locale = service.config().hint_locale;

            println!(
                "Voting {} {} as {}",
                mood.emoji,
                mood.name,
                session.address().unwrap_or_default()
            );
            match service.submit_vote(&signer, mood.emoji, mood.name).await {
                Ok(receipt) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&receipt)?);
                    } else {
                        println!("Vote recorded!");
                        println!("  Memo:        {}", receipt.memo);
                        println!("  Transaction: {}", receipt.hash);
                        if let Some(ledger) = receipt.ledger {
                            println!("  Ledger:      {}", ledger);
                        }
                        println!("  Explorer:    {}", receipt.explorer_url);
                    }
                }
                Err(e) => {
                    eprintln!("Vote failed: {}", e.hint(locale));
                    std::process::exit(1);
                }
            }
        }

        Commands::Tally { limit } => {
            let mut vote_config = config.vote_config();
            if let Some(limit) = limit {
                vote_config.history_limit = limit;
            }
            let ledger = Arc::new(HorizonClient::new(config.network.horizon_config())?);
            let service = VoteService::new(ledger, vote_config);

            let moods = service
                .fetch_community_moods()
                .await
                .context("Failed to read votes from Horizon")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&moods)?);
            } else if moods.tallies.is_empty() {
                println!("No votes yet.");
                println!();
                println!("Cast the first one with:");
                println!("  moodpulse-cli vote happy");
            } else {
                print_tallies(&moods.tallies);
                println!();
                println!(
                    "Scanned {} payments, counted {} votes",
                    moods.scanned_payments, moods.votes_counted
                );
                if moods.page_full {
                    println!(
                        "(history limit of {} reached, older votes not counted; --limit goes up to {})",
                        service.config().history_limit,
                        MAX_HISTORY_LIMIT
                    );
                }
            }
        }

        Commands::Watch { interval } => {
            let service = Arc::new(vote_service(&config)?);
            let board = Arc::new(RwLock::new(MoodBoard::new()));
            let interval = Duration::from_secs(interval.unwrap_or(config.poll.interval_secs).max(1));

            let poller = MoodPoller::spawn(service, board, interval);
            let mut updates = poller.subscribe();

            loop {
                tokio::select! {
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let update = updates.borrow_and_update().clone();
                        let Some(update) = update else { continue };

                        if json {
                            println!("{}", serde_json::to_string(&update)?);
                            continue;
                        }
                        println!("--- {} ---", update.at.format("%Y-%m-%d %H:%M:%S UTC"));
                        if let Some(error) = &update.board.last_error {
                            println!("Refresh failed: {}", error);
                        } else if update.board.chart.tallies.is_empty() {
                            println!("No votes yet.");
                        } else {
                            print_tallies(&update.board.chart.tallies);
                        }
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }

            poller.stop().await;
        }

        Commands::Keygen => {
            let signer = KeypairSigner::generate(config.network.details());

            if json {
                let keys = serde_json::json!({
                    "public_key": signer.account_id().to_string(),
                    "secret_key": signer.secret_seed(),
                });
                println!("{}", serde_json::to_string_pretty(&keys)?);
            } else {
                println!("Public key: {}", signer.account_id());
                println!("Secret key: {}", signer.secret_seed());
                println!();
                println!("Keep the secret key safe. Fund the account with:");
                println!("  moodpulse-cli fund {}", signer.account_id());
            }
        }

        Commands::Fund { address } => {
            moodpulse::ledger::AccountId::parse(&address)
                .with_context(|| format!("Invalid address {}", address))?;
            let client = HorizonClient::new(config.network.horizon_config())?;

            let hash = client
                .fund_with_friendbot(&address)
                .await
                .context("Friendbot funding failed")?;
            println!("Funded {}", address);
            println!("  Transaction: {}", hash);
        }

        Commands::Balance { address } => {
            let client = HorizonClient::new(config.network.horizon_config())?;
            let account = client
                .load_account(&address)
                .await
                .with_context(|| format!("Failed to load account {}", address))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&account.balances)?);
            } else {
                let xlm = account
                    .balance_of("XLM")
                    .map(|b| b.balance.as_str())
                    .unwrap_or("0");
                println!("{}: {} XLM", address, xlm);
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn vote_service(config: &Config) -> anyhow::Result<VoteService> {
    let ledger = Arc::new(HorizonClient::new(config.network.horizon_config())?);
    Ok(VoteService::new(ledger, config.vote_config()))
}

fn print_tallies(tallies: &[MoodTally]) {
    println!("{:<6} {:<12} {:>7} {:>8}", "Emoji", "Mood", "Votes", "Share");
    println!("{}", "-".repeat(36));
    for tally in tallies {
        println!(
            "{:<6} {:<12} {:>7} {:>7.1}%",
            tally.emoji, tally.name, tally.count, tally.percentage
        );
    }

    let summary = TallySummary::from_tallies(tallies);
    println!("{}", "-".repeat(36));
    println!(
        "Total: {}  Most popular: {}",
        summary.total_votes,
        summary.most_popular.as_deref().unwrap_or("?")
    );
}
