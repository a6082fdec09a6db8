use clap::{Parser, Subcommand, ValueEnum};
use estate_ledger::application::coordinator::TransactionCoordinator;
use estate_ledger::application::outcome::{Outcome, Status, TreasuryAction};
use estate_ledger::config::{
    CATALOG_FILE, CLASS_CATALOG_FILE, EngineConfig, LEDGER_FILE, OWNERSHIP_FILE,
};
use estate_ledger::domain::ledger::OPENING_CREDIT;
use estate_ledger::error::EngineError;
use estate_ledger::interfaces::csv::statement_writer::StatementWriter;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about = "Track property ownership and player balances", long_about = None)]
struct Cli {
    /// Directory holding the game's JSON documents.
    #[arg(long, env = "ESTATE_DATA_DIR", default_value = ".", global = true)]
    data_dir: PathBuf,

    /// Player ownership database, relative to the data directory.
    #[arg(long, env = "ESTATE_PLAYER_DB", default_value = OWNERSHIP_FILE, global = true)]
    player_db: PathBuf,

    /// Player accounts ledger, relative to the data directory.
    #[arg(long, env = "ESTATE_ACCOUNTS_DB", default_value = LEDGER_FILE, global = true)]
    accounts_db: PathBuf,

    /// Residential asset catalog. Validation and pricing are skipped if it is missing.
    #[arg(long, env = "ESTATE_ASSET_DB", default_value = CATALOG_FILE, global = true)]
    asset_db: PathBuf,

    /// Utility and transport catalog.
    #[arg(long, env = "ESTATE_COMMERCIAL_DB", default_value = CLASS_CATALOG_FILE, global = true)]
    commercial_db: PathBuf,

    /// How long to wait for another operation's lock before giving up.
    #[arg(long, env = "ESTATE_LOCK_TIMEOUT_MS", default_value_t = 5000, global = true)]
    lock_timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assign a residential asset to a player, or add houses to it
    Assign {
        #[arg(long)]
        player: String,
        #[arg(long)]
        area: String,
        #[arg(long)]
        asset: String,
        /// Houses to add (capped at 4 in total)
        #[arg(long, allow_negative_numbers = true)]
        houses: i64,
    },
    /// Buy a utility or transport asset from the Treasurer
    Buy {
        #[arg(long)]
        player: String,
        #[arg(long)]
        class: String,
        #[arg(long)]
        asset: String,
    },
    /// Pay rent from one player to another
    Rent {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long, allow_negative_numbers = true)]
        amount: i64,
    },
    /// Pay money to, or collect it from, the Treasurer
    Treasury {
        #[arg(value_enum)]
        action: TreasuryArg,
        #[arg(long)]
        player: String,
        #[arg(long, allow_negative_numbers = true)]
        amount: i64,
    },
    /// Wipe all data and seed the given players with a starting balance
    Start {
        #[arg(long, value_delimiter = ',', required = true)]
        players: Vec<String>,
        #[arg(long, default_value_t = OPENING_CREDIT)]
        balance: i64,
    },
    /// Wipe all ownership and account data
    Reset,
    /// Show a player's current balance
    Balance {
        #[arg(long)]
        player: String,
    },
    /// Show everything a player owns
    Holdings {
        #[arg(long)]
        player: String,
    },
    /// Export a player's ledger entries as CSV
    Statement {
        #[arg(long)]
        player: String,
    },
    /// List every known player
    Players,
    /// List catalog areas
    Areas,
    /// List the assets of one catalog area
    Assets {
        #[arg(long)]
        area: String,
    },
    /// Dump both databases
    State,
    /// Show the rent due to the owner of an asset
    Quote {
        #[arg(long)]
        asset: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TreasuryArg {
    Pay,
    Collect,
}

impl From<TreasuryArg> for TreasuryAction {
    fn from(arg: TreasuryArg) -> Self {
        match arg {
            TreasuryArg::Pay => Self::Pay,
            TreasuryArg::Collect => Self::Collect,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "estate_ledger=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = EngineConfig {
        data_dir: cli.data_dir,
        ownership_file: cli.player_db,
        ledger_file: cli.accounts_db,
        catalog_file: cli.asset_db,
        class_catalog_file: cli.commercial_db,
        lock_timeout: Duration::from_millis(cli.lock_timeout_ms),
    };
    let coordinator = config.build_coordinator();

    run(&coordinator, cli.command).await
}

async fn run(coordinator: &TransactionCoordinator, command: Command) -> Result<ExitCode> {
    let outcome = match command {
        Command::Assign {
            player,
            area,
            asset,
            houses,
        } => coordinator
            .assign_residential_asset(&player, &area, &asset, houses)
            .await
            .map(|result| Outcome::from(&result)),
        Command::Buy {
            player,
            class,
            asset,
        } => coordinator
            .assign_class_asset(&player, &class, &asset)
            .await
            .map(|result| Outcome::from(&result)),
        Command::Rent { from, to, amount } => coordinator
            .transfer_rent(&from, &to, amount)
            .await
            .map(|result| Outcome::from(&result)),
        Command::Treasury {
            action,
            player,
            amount,
        } => coordinator
            .settle_with_treasury(&player, action.into(), amount)
            .await
            .map(|result| Outcome::from(&result)),
        Command::Start { players, balance } => coordinator
            .start_game(players.as_slice(), balance)
            .await
            .map(|result| Outcome::from(&result)),
        Command::Reset => coordinator.reset_game().await.map(|()| Outcome {
            status: Status::Success,
            message: "Game reset - all player data cleared.".to_string(),
            details: serde_json::Value::Null,
        }),
        Command::Balance { player } => {
            let balance = coordinator.balance(&player).await?;
            return print_json(&serde_json::json!({ "player": player.trim(), "balance": balance }));
        }
        Command::Holdings { player } => {
            return print_json(&coordinator.holdings(&player).await?);
        }
        Command::Statement { player } => {
            let entries = coordinator.statement(&player).await?;
            StatementWriter::new(io::stdout().lock()).write_entries(&entries)?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Players => return print_json(&coordinator.players().await?),
        Command::Areas => return print_json(&coordinator.areas()),
        Command::Assets { area } => match coordinator.assets(&area) {
            Some(assets) => return print_json(&assets),
            None => Err(EngineError::InvalidArgument(format!(
                "Area '{}' not found",
                area.trim()
            ))),
        },
        Command::State => return print_json(&coordinator.snapshot().await?),
        Command::Quote { asset } => return print_json(&coordinator.quote_rent(&asset).await?),
    };

    match outcome {
        Ok(outcome) => {
            println!("{outcome}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_rejection() => {
            println!("{}", Outcome::from_error(&e));
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_json(value: &impl Serialize) -> Result<ExitCode> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).into_diagnostic()?;
    writeln!(stdout).into_diagnostic()?;
    Ok(ExitCode::SUCCESS)
}
