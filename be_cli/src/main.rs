//! Organizer preview tool for four-player brackets.
//!
//! Shows bracket shapes and exact payouts before a tournament is created, and
//! runs whole tournaments in memory with random winners.

mod commands;
mod config;

use anyhow::{Error, anyhow};
use bracket_engine::prize::parse_amount;
use config::CliConfig;
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Preview four-player single-elimination brackets and prize pools

USAGE:
  be_cli [FLAGS] <COMMAND> [OPTIONS]

COMMANDS:
  shape        Rounds, matches and finishing cohorts
  payouts      Pool, commission and payout schedule
  simulate     Run a tournament in memory with random winners

OPTIONS:
  --players    N           Bracket size, a power of 4
  --entry-fee  AMOUNT      Entry fee, e.g. 5.00           [payouts, simulate]
  --commission PERCENT     House commission               [default: env BRACKET_COMMISSION_RATE or 10]
  --curve      NAME|P,P    Curve name or percentages      [default: env BRACKET_PRIZE_CURVE or standard]
  --seed       N           Random seed                    [simulate; default: random]

FLAGS:
  --json                   Print JSON instead of text
  -h, --help               Print help information

ENVIRONMENT:
  BRACKET_COMMISSION_RATE  Default commission percent
  BRACKET_PRIZE_CURVE      Default prize curve
  BRACKET_CURRENCY_SYMBOL  Currency symbol for text output [default: $]
  RUST_LOG                 Log level
";

enum Command {
    Shape,
    Payouts { entry_fee: String },
    Simulate { entry_fee: String, seed: Option<u64> },
}

struct Args {
    json: bool,
    players: usize,
    commission: Option<String>,
    curve: Option<String>,
    command: Command,
}

fn parse_args(mut pargs: Arguments) -> Result<Args, Error> {
    let json = pargs.contains("--json");
    let subcommand = pargs
        .subcommand()?
        .ok_or_else(|| anyhow!("missing command, see --help"))?;

    let players = pargs.value_from_str("--players")?;
    let commission = pargs.opt_value_from_str("--commission")?;
    let curve = pargs.opt_value_from_str("--curve")?;

    let command = match subcommand.as_str() {
        "shape" => Command::Shape,
        "payouts" => Command::Payouts {
            entry_fee: pargs.value_from_str("--entry-fee")?,
        },
        "simulate" => Command::Simulate {
            entry_fee: pargs.value_from_str("--entry-fee")?,
            seed: pargs.opt_value_from_str("--seed")?,
        },
        other => return Err(anyhow!("unknown command '{other}', see --help")),
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        return Err(anyhow!("unexpected arguments: {remaining:?}"));
    }

    Ok(Args {
        json,
        players,
        commission,
        curve,
        command,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = parse_args(pargs)?;

    env_logger::builder().format_target(false).init();

    let config = CliConfig::from_env(args.commission, args.curve)?;
    config.validate()?;
    info!(
        "Commission {} bps, curve {}",
        config.commission_bps, config.prize_curve
    );

    match args.command {
        Command::Shape => {
            let report = commands::shape(args.players)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                commands::print_shape(&report);
            }
        }
        Command::Payouts { entry_fee } => {
            let report = commands::payouts(&config, args.players, parse_amount(&entry_fee)?)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                commands::print_payouts(&config, &report);
            }
        }
        Command::Simulate { entry_fee, seed } => {
            let seed = seed.unwrap_or_else(rand::random);
            let report =
                commands::simulate(&config, args.players, parse_amount(&entry_fee)?, seed).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                commands::print_simulation(&config, &report);
            }
        }
    }

    Ok(())
}
