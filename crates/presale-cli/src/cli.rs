//! CLI argument definitions for the `presale` binary.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `convert` | Price a purchase at the discounted rate |
//! | `progress` | Scheduled fundraising progress and countdown |
//! | `prices` | Poll both tracked assets once |
//! | `wallet` | Connect, inspect and query the wallet session |
//! | `watch` | Keep prices, conversion and progress refreshed |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--verbose` | `false` | Debug logging on stderr |

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Presale conversion calculator and campaign monitor.
#[derive(Debug, Parser)]
#[command(
    name = "presale",
    author,
    version,
    about = "Discounted presale conversion and progress tracker"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log at debug level instead of `RUST_LOG` (default: warn).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON document per result.
    Json,
    /// `slot : text` lines.
    Table,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert an amount of the source asset into discounted target units.
    ///
    /// # Examples
    ///
    ///   presale convert 1.5
    ///   presale convert --max --format table
    Convert(ConvertArgs),

    /// Show allocation progress at a point in time (default: now).
    ///
    /// # Examples
    ///
    ///   presale progress
    ///   presale progress --at 2026-02-06T12:00:00Z
    Progress(ProgressArgs),

    /// Fetch current quotes for the source and target assets.
    Prices,

    /// Wallet session commands.
    Wallet(WalletArgs),

    /// Poll prices and refresh progress until interrupted.
    ///
    /// # Examples
    ///
    ///   presale watch --amount 2 --cycles 3
    Watch(WatchArgs),
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Amount of the source asset to spend.
    #[arg(required_unless_present = "max", conflicts_with = "max")]
    pub amount: Option<f64>,

    /// Spend the connected wallet's full balance.
    #[arg(long, default_value_t = false)]
    pub max: bool,
}

#[derive(Debug, Args)]
pub struct ProgressArgs {
    /// RFC3339 UTC instant to evaluate instead of the current time.
    #[arg(long)]
    pub at: Option<String>,
}

#[derive(Debug, Args)]
pub struct WalletArgs {
    #[command(subcommand)]
    pub command: WalletCommand,
}

#[derive(Debug, Subcommand)]
pub enum WalletCommand {
    /// Connect the configured wallet and remember it.
    Connect,
    /// Show the remembered wallet.
    Status,
    /// Look up the remembered wallet's balance.
    Balance,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Source amount priced on every price update.
    #[arg(long, default_value_t = 0.0)]
    pub amount: f64,

    /// Stop after this many price updates.
    #[arg(long)]
    pub cycles: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_requires_amount_or_max() {
        assert!(Cli::try_parse_from(["presale", "convert"]).is_err());
        assert!(Cli::try_parse_from(["presale", "convert", "1", "--max"]).is_err());

        let cli = Cli::try_parse_from(["presale", "convert", "--max"]).expect("parses");
        assert!(matches!(cli.command, Command::Convert(ConvertArgs { max: true, amount: None })));
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from(["presale", "wallet", "status", "--format", "table", "-v"])
            .expect("parses");

        assert_eq!(cli.format, OutputFormat::Table);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Command::Wallet(WalletArgs {
                command: WalletCommand::Status
            })
        ));
    }
}
