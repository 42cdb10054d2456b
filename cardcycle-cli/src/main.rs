use anyhow::{Context, Result, bail};
use cardcycle_core::{BillingProfile, CardRecord};
use cardcycle_ingest::{
    FileInbox, PastedMessage, RawMessage, ScanOptions, apply_updates, scan_inbox,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

mod config;
mod state;

#[derive(Parser, Debug)]
#[command(
    name = "cardcycle",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CARDCYCLE_BUILD_SHA"), ")"),
    about = "Credit card billing cycle tracker"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default ~/.cardcycle/config.toml
    Init,

    /// Countdowns for a single bill/due day pair
    Days {
        /// Bill generation day (1-31)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31))]
        bill: u32,

        /// Payment due day (1-31)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31))]
        due: u32,

        /// Reference time, e.g. "2024-01-15 09:30" (default: now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Countdowns for every card in the card list
    Cards {
        /// Card list JSON (default: ~/.cardcycle/cards.json)
        #[arg(long)]
        cards: Option<PathBuf>,

        #[arg(long)]
        at: Option<String>,
    },

    /// Extract billing fields from one pasted message
    Extract {
        #[arg(long)]
        text: String,

        /// Card id the message is about (default: match by digits/bank name)
        #[arg(long)]
        card: Option<String>,

        #[arg(long)]
        cards: Option<PathBuf>,
    },

    /// Scan an exported inbox (.json or .csv) for billing messages
    Scan {
        #[arg(long)]
        inbox: PathBuf,

        #[arg(long)]
        cards: Option<PathBuf>,

        #[arg(long)]
        at: Option<String>,

        /// Merge recognized fields back into the card list
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Init => {
            config::init_config()?;
        }

        Command::Days { bill, due, at } => {
            let cfg = config::load_config()?;
            let reference = cfg.reference(at.as_deref())?;
            let snap = BillingProfile::new(bill, due).snapshot(reference);

            println!("Reference: {}", reference.format("%Y-%m-%d %H:%M"));
            println!("Days to bill:  {}", snap.days_to_bill);
            println!("Days to due:   {}", snap.days_to_due);
            println!("Credit period: {}", snap.credit_period_days);
        }

        Command::Cards { cards, at } => {
            let cfg = config::load_config()?;
            let reference = cfg.reference(at.as_deref())?;
            let cards = load_cards(cards)?;

            if cards.is_empty() {
                println!("No cards.");
            }

            for card in &cards {
                let snap = card.profile().snapshot(reference);
                println!(
                    "{} {} x{} | bill in {}d | due in {}d | credit {}d",
                    card.id,
                    card.bank_name,
                    card.last_four,
                    snap.days_to_bill,
                    snap.days_to_due,
                    snap.credit_period_days
                );
            }
        }

        Command::Extract { text, card, cards } => {
            let cfg = config::load_config()?;
            let extractor = cfg.extractor()?;

            match card {
                Some(id) => {
                    let cards = load_cards(cards)?;
                    let Some(card) = cards.iter().find(|c| c.id == id) else {
                        bail!("no card with id '{id}'");
                    };
                    let extraction = extractor.extract(&text, &card.profile());
                    println!("{}", serde_json::to_string_pretty(&extraction)?);
                }
                None => {
                    let cards = load_cards(cards)?;
                    let source = PastedMessage(RawMessage::new("", text));
                    let options = ScanOptions {
                        lookback_days: cfg.scan.lookback_days,
                        now: cfg.reference(None)?,
                    };
                    let updates = scan_inbox(&source, &cards, &extractor, &options)?;
                    if updates.is_empty() {
                        println!("No card matched, or no billing info found.");
                    } else {
                        println!("{}", serde_json::to_string_pretty(&updates)?);
                    }
                }
            }
        }

        Command::Scan {
            inbox,
            cards,
            at,
            write,
        } => {
            let cfg = config::load_config()?;
            let extractor = cfg.extractor()?;
            let cards_file = match cards {
                Some(p) => p,
                None => state::cards_path()?,
            };
            let mut cards = state::read_cards(&cards_file)?;

            let options = ScanOptions {
                lookback_days: cfg.scan.lookback_days,
                now: cfg.reference(at.as_deref())?,
            };
            let source = FileInbox::new(&inbox);
            let updates = scan_inbox(&source, &cards, &extractor, &options)
                .with_context(|| format!("scanning {}", inbox.display()))?;

            println!("{}", serde_json::to_string_pretty(&updates)?);

            if write {
                let changed = apply_updates(&mut cards, &updates);
                state::write_cards(&cards_file, &cards)?;
                info!(changed, path = %cards_file.display(), "card list updated");
                println!("\nUpdated {} card(s) in {}", changed, cards_file.display());
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Explicit path, or the default card list if it exists.
fn load_cards(path: Option<PathBuf>) -> Result<Vec<CardRecord>> {
    match path {
        Some(p) => state::read_cards(&p),
        None => {
            let p = state::cards_path()?;
            if p.exists() {
                state::read_cards(&p)
            } else {
                Ok(Vec::new())
            }
        }
    }
}
