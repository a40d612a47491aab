mod candidates;
mod plan;
mod quantity;
mod scale;
mod search;
mod sources;

use std::sync::Arc;
use std::time::Duration;

use cartpick_core::{
    BestMatchSelector, Envelope, EnvelopeError, Marketplace, SelectorConfig, SourceReport,
    SourceStatus, StrategyRegistryBuilder,
};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::{Metadata, RequestId};
use crate::output::Table;

pub struct CommandResult {
    pub data: Value,
    pub table: Table,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
    pub marketplaces: Vec<Marketplace>,
}

impl CommandResult {
    pub fn ok(data: Value, table: Table) -> Self {
        Self {
            data,
            table,
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            marketplaces: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_error(mut self, error: EnvelopeError) -> Self {
        self.errors.push(error);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_marketplaces(mut self, marketplaces: Vec<Marketplace>) -> Self {
        self.marketplaces = marketplaces;
        self
    }
}

/// Envelope plus its plain-text rendering.
pub struct CommandOutput {
    pub envelope: Envelope<Value>,
    pub table: Table,
}

pub async fn run(cli: &Cli, request_id: RequestId) -> Result<CommandOutput, CliError> {
    if cli.timeout_ms == 0 {
        return Err(CliError::Command(String::from(
            "--timeout-ms must be greater than zero",
        )));
    }

    let command_result = match &cli.command {
        Command::Search(args) => search::run(args, &selector(cli)).await?,
        Command::Plan(args) => plan::run(args, &selector(cli)).await?,
        Command::Candidates(args) => candidates::run(args, &selector(cli)).await?,
        Command::Scale(args) => scale::run(args)?,
        Command::Quantity(args) => quantity::run(args)?,
        Command::Sources => sources::run(&selector(cli))?,
    };

    let CommandResult {
        data,
        table,
        warnings,
        errors,
        latency_ms,
        marketplaces,
    } = command_result;

    let mut metadata = Metadata::new(request_id, marketplaces, latency_ms);
    for warning in warnings {
        metadata.push_warning(warning);
    }

    let mut envelope = Envelope::success(metadata.into_envelope_meta()?, data);
    for error in errors {
        envelope.push_error(error)?;
    }

    Ok(CommandOutput { envelope, table })
}

fn selector(cli: &Cli) -> BestMatchSelector {
    let builder = if cli.mock {
        StrategyRegistryBuilder::new().with_mock_mode()
    } else {
        StrategyRegistryBuilder::new().with_real_clients()
    };
    let registry = builder.build();
    debug!(mock = cli.mock, strategies = registry.len(), "registry ready");

    BestMatchSelector::new(
        Arc::new(registry),
        SelectorConfig {
            search_timeout: Duration::from_millis(cli.timeout_ms),
        },
    )
}

/// One warning per marketplace that did not answer normally.
fn source_warnings(reports: &[SourceReport]) -> Vec<String> {
    reports
        .iter()
        .filter(|report| {
            matches!(
                report.status,
                SourceStatus::Skipped | SourceStatus::TimedOut | SourceStatus::Cancelled
            )
        })
        .map(|report| format!("{}: {}", report.marketplace, report.status.as_str()))
        .collect()
}

fn no_match_error(keyword: &str) -> Result<EnvelopeError, CliError> {
    EnvelopeError::new(
        "search.no_match",
        format!("no marketplace returned a relevant offer for '{keyword}'"),
    )
    .map_err(CliError::from)
}

fn offer_row(best: &cartpick_core::BestMatch) -> Vec<String> {
    vec![
        best.marketplace.to_string(),
        best.product.name().to_owned(),
        best.product.price().to_string(),
        format!("{}{}", best.product.capacity_units(), best.product.unit_label()),
        format!("{:.2}", best.unit_price),
        best.purchase_quantity.to_string(),
    ]
}

const OFFER_HEADERS: [&str; 6] = ["mall", "name", "price", "capacity", "unit_price", "qty"];
