//! CLI argument definitions for cartpick.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `search` | Best offer for a keyword across marketplaces |
//! | `plan` | Scale a recipe amount, then search |
//! | `candidates` | Ranked candidate list for one marketplace |
//! | `scale` | Scale an amount between portions |
//! | `quantity` | Items needed to cover an amount |
//! | `sources` | List registered strategies and their fallback chains |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--mock` | `false` | Use the seeded catalogs instead of live sources |
//! | `--timeout-ms` | `5000` | Per-marketplace search budget |
//! | `--verbose` | `false` | Debug-level logging on stderr |
//! | `--log-json` | `false` | JSON log lines on stderr |
//!
//! # Examples
//!
//! ```bash
//! cartpick search 우유 --amount 1000
//! cartpick plan 양파 --amount 200 --base 2 --target 4 --malls kurly,bmart
//! cartpick candidates 그릭요거트 --mall bmart --low-sugar --format table
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Grocery price comparison across Korean online marketplaces.
#[derive(Debug, Parser)]
#[command(
    name = "cartpick",
    author,
    version,
    about = "Find the cheapest matching grocery offer across marketplaces",
    long_about = "cartpick searches Coupang, Kurly, B-mart and Naver shopping at once, drops \
results that do not match the keyword, and picks the offer with the lowest unit price.\n\
\n\
Use 'cartpick <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Search the seeded catalogs only; no network access.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Search budget per marketplace in milliseconds.
    #[arg(long, global = true, default_value_t = 5000)]
    pub timeout_ms: u64,

    /// Log at debug level.
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON envelope.
    Json,
    /// Plain-text table for terminals.
    Table,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Find the best offer for a keyword.
    ///
    /// # Examples
    ///
    ///   cartpick search 우유 --amount 1000
    ///   cartpick search 두부 --malls coupang,kurly
    Search(SearchArgs),

    /// Scale a recipe amount between portions, then find the best offer.
    ///
    /// # Examples
    ///
    ///   cartpick plan 양파 --amount 200 --base 2 --target 4
    Plan(PlanArgs),

    /// List the ranked candidates one marketplace returns.
    Candidates(CandidatesArgs),

    /// Scale an amount from the base portion to the target portion.
    Scale(ScaleArgs),

    /// Number of items of a given capacity needed for an amount.
    Quantity(QuantityArgs),

    /// List registered strategies and their source chains.
    Sources,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Ingredient keyword, e.g. "우유".
    pub keyword: String,

    /// Required amount in the product's unit (g, ml or pieces).
    #[arg(long, default_value_t = 0.0)]
    pub amount: f64,

    /// Comma-separated marketplaces, or "all".
    #[arg(long, default_value = "all")]
    pub malls: String,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Ingredient keyword.
    pub keyword: String,

    /// Amount the recipe asks for at the base portion.
    #[arg(long)]
    pub amount: f64,

    /// Servings the recipe is written for.
    #[arg(long, default_value_t = 1)]
    pub base: i64,

    /// Servings to cook.
    #[arg(long, default_value_t = 1)]
    pub target: i64,

    /// Comma-separated marketplaces, or "all".
    #[arg(long, default_value = "all")]
    pub malls: String,
}

#[derive(Debug, Args)]
pub struct CandidatesArgs {
    /// Ingredient keyword.
    pub keyword: String,

    /// Marketplace to query.
    #[arg(long)]
    pub mall: String,

    /// Required amount, used only for validation.
    #[arg(long, default_value_t = 0.0)]
    pub amount: f64,

    /// Order by sugar content where the source reports it.
    #[arg(long, default_value_t = false)]
    pub low_sugar: bool,
}

#[derive(Debug, Args)]
pub struct ScaleArgs {
    /// Amount at the base portion.
    #[arg(allow_negative_numbers = true)]
    pub amount: f64,

    #[arg(long, allow_negative_numbers = true)]
    pub base: i64,

    #[arg(long, allow_negative_numbers = true)]
    pub target: i64,
}

#[derive(Debug, Args)]
pub struct QuantityArgs {
    /// Amount to cover.
    #[arg(allow_negative_numbers = true)]
    pub required: f64,

    /// Capacity of a single item.
    #[arg(long, allow_negative_numbers = true)]
    pub capacity: i64,
}
