use serde::Serialize;

use cartpick_core::{
    BestMatch, BestMatchSelector, MarketplaceSelection, SearchRequest, SourceReport,
};

use crate::cli::SearchArgs;
use crate::error::CliError;
use crate::output::Table;

use super::{no_match_error, offer_row, source_warnings, CommandResult, OFFER_HEADERS};

#[derive(Debug, Serialize)]
struct SearchResponseData {
    keyword: String,
    required_amount: f64,
    best: Option<BestMatch>,
    sources: Vec<SourceReport>,
    cancelled: bool,
}

pub async fn run(args: &SearchArgs, selector: &BestMatchSelector) -> Result<CommandResult, CliError> {
    let targets = MarketplaceSelection::parse(&args.malls)?;
    let request = SearchRequest::new(args.keyword.as_str(), args.amount, targets)?;

    let outcome = selector.search(&request, interrupted()).await;

    let mut table = Table::new(&OFFER_HEADERS);
    if let Some(best) = &outcome.best {
        table.push_row(offer_row(best));
    }

    let marketplaces = outcome
        .sources
        .iter()
        .map(|report| report.marketplace)
        .collect();
    let warnings = source_warnings(&outcome.sources);
    let latency_ms = outcome.latency_ms;
    let missing = outcome.best.is_none();

    let data = serde_json::to_value(SearchResponseData {
        keyword: request.keyword.clone(),
        required_amount: request.required_amount,
        best: outcome.best,
        sources: outcome.sources,
        cancelled: outcome.cancelled,
    })?;

    let mut result = CommandResult::ok(data, table)
        .with_warnings(warnings)
        .with_latency(latency_ms)
        .with_marketplaces(marketplaces);
    if missing {
        result = result.with_error(no_match_error(&request.keyword)?);
    }
    Ok(result)
}

/// Resolves on Ctrl-C; never resolves if the signal handler cannot be installed.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
