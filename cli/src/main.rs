use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use serde::Deserialize;

use factory::TokenFactory;
use fees::{BasisPointsCalculator, FeeCalculator, FlatCalculator, ScarcityCalculator};
use mintgate_storage::ControllerStore;

#[derive(Parser)]
#[command(name = "mintgate")]
#[command(about = "Capped, fee-gated token controller")]
struct Cli {
    /// Directory holding the controller store
    #[arg(short, long, value_name = "DIR", default_value = "mintgate-data")]
    data_dir: PathBuf,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Deploy a new controller instance
    Deploy {
        name: String,
        symbol: String,
        minter: String,
        cap: u64,
        fee_collector: String,
    },
    /// Mint tokens with an attached payment
    Mint {
        id: String,
        caller: String,
        account: String,
        amount: u64,
        payment: u64,
    },
    /// Pause a controller
    Pause { id: String, caller: String },
    /// Unpause a controller
    Unpause { id: String, caller: String },
    /// Propose a new minter (current minter only)
    ProposeMinter {
        id: String,
        caller: String,
        candidate: String,
    },
    /// Approve a pending minter proposal (candidate only)
    ApproveMinter { id: String, caller: String },
    /// Transfer tokens between accounts
    Transfer {
        id: String,
        from: String,
        to: String,
        amount: u64,
    },
    /// Show controller metadata and state
    Info {
        id: String,
        /// Emit machine-readable JSON instead of the text report
        #[arg(long)]
        json: bool,
    },
    /// Show an account balance
    Balance { id: String, account: String },
    /// List deployed controller ids
    List,
}

#[derive(Debug, serde::Serialize)]
struct ControllerInfo {
    id: String,
    name: String,
    symbol: String,
    decimals: u8,
    cap: u64,
    total_supply: u64,
    initialized: bool,
    paused: bool,
    pending_minter: Option<factory::PendingMinter>,
}

#[derive(Debug, Deserialize, Default)]
struct Config {
    #[serde(default)]
    fees: FeeConfig,
}

#[derive(Debug, Deserialize, Default)]
struct FeeConfig {
    /// "basis-points" (default), "scarcity" or "flat"
    model: Option<String>,
    bps: Option<u32>,
    fee: Option<u64>,
    base_fee_per_token: Option<u64>,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

fn build_calculator(config: &FeeConfig) -> Arc<dyn FeeCalculator + Send + Sync> {
    match config.model.as_deref().unwrap_or("basis-points") {
        "flat" => Arc::new(FlatCalculator::new(config.fee.unwrap_or(0))),
        "scarcity" => Arc::new(ScarcityCalculator::new(
            config.base_fee_per_token.unwrap_or(1),
        )),
        _ => Arc::new(BasisPointsCalculator::new(config.bps.unwrap_or(50))),
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(cli.config.as_ref())?;
    let calculator = build_calculator(&config.fees);
    let store = ControllerStore::open(&cli.data_dir)?;
    let factory = TokenFactory::with_store(calculator, store)?;

    match cli.command {
        Command::Deploy {
            name,
            symbol,
            minter,
            cap,
            fee_collector,
        } => {
            let id = factory.deploy(&name, &symbol, &minter, cap, &fee_collector)?;
            println!("{} {}", "deployed".green(), id);
        }
        Command::Mint {
            id,
            caller,
            account,
            amount,
            payment,
        } => {
            let receipt = factory.mint(&id, &caller, &account, amount, payment)?;
            println!(
                "{} {} -> {} (fee {} of {} forwarded to {})",
                "minted".green(),
                receipt.amount,
                receipt.account,
                receipt.fee_required,
                receipt.payment,
                receipt.collector
            );
        }
        Command::Pause { id, caller } => {
            factory.pause(&id, &caller)?;
            println!("{} {}", "paused".yellow(), id);
        }
        Command::Unpause { id, caller } => {
            factory.unpause(&id, &caller)?;
            println!("{} {}", "unpaused".green(), id);
        }
        Command::ProposeMinter {
            id,
            caller,
            candidate,
        } => {
            factory.propose_minter(&id, &caller, &candidate)?;
            println!("{} {} for {}", "proposed".green(), candidate, id);
        }
        Command::ApproveMinter { id, caller } => {
            factory.approve_minter(&id, &caller)?;
            println!("{} minter {} for {}", "approved".green(), caller, id);
        }
        Command::Transfer { id, from, to, amount } => {
            factory.transfer(&id, &from, &to, amount)?;
            println!("{} {} from {} to {}", "transferred".green(), amount, from, to);
        }
        Command::Info { id, json } => {
            let info = ControllerInfo {
                id: id.clone(),
                name: factory.token_name(&id)?,
                symbol: factory.token_symbol(&id)?,
                decimals: factory.decimals(&id)?,
                cap: factory.cap(&id)?,
                total_supply: factory.total_supply(&id)?,
                initialized: factory.is_initialized(&id)?,
                paused: factory.is_paused(&id)?,
                pending_minter: factory.pending_minter(&id),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("name:         {}", info.name);
                println!("symbol:       {}", info.symbol);
                println!("decimals:     {}", info.decimals);
                println!("cap:          {}", info.cap);
                println!("total supply: {}", info.total_supply);
                println!("initialized:  {}", info.initialized);
                println!("paused:       {}", info.paused);
                if let Some(pending) = &info.pending_minter {
                    println!(
                        "pending minter: {} (proposed by {})",
                        pending.candidate, pending.proposed_by
                    );
                }
            }
        }
        Command::Balance { id, account } => {
            println!("{}", factory.balance_of(&id, &account)?);
        }
        Command::List => {
            for id in factory.controller_ids() {
                println!("{}", id);
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "error:".red(), e);
        std::process::exit(1);
    }
}
