use std::time::Instant;

use serde::Serialize;

use cartpick_core::{BestMatchSelector, CandidateProduct, Marketplace};

use crate::cli::CandidatesArgs;
use crate::error::CliError;
use crate::output::Table;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct CandidatesResponseData {
    keyword: String,
    marketplace: Marketplace,
    low_sugar: bool,
    candidates: Vec<CandidateProduct>,
}

pub async fn run(
    args: &CandidatesArgs,
    selector: &BestMatchSelector,
) -> Result<CommandResult, CliError> {
    let marketplace = args.mall.parse::<Marketplace>()?;

    let started = Instant::now();
    let candidates = selector
        .candidates(marketplace, &args.keyword, args.amount, args.low_sugar)
        .await?;
    let latency_ms = started.elapsed().as_millis() as u64;

    let mut table = Table::new(&["#", "name", "price", "capacity", "unit_price", "sugar/100g"]);
    for (rank, candidate) in candidates.iter().enumerate() {
        table.push_row(vec![
            (rank + 1).to_string(),
            candidate.name().to_owned(),
            candidate.price().to_string(),
            format!("{}{}", candidate.capacity_units(), candidate.unit_label()),
            format!("{:.2}", candidate.unit_price()),
            candidate
                .sugar_per_100g()
                .map(|sugar| format!("{sugar:.1}"))
                .unwrap_or_else(|| String::from("-")),
        ]);
    }

    let mut warnings = Vec::new();
    if args.low_sugar && !selector.registry().resolve(marketplace)?.supports_nutrition() {
        warnings.push(format!(
            "{marketplace} does not report sugar content; ordered by price"
        ));
    }

    let data = serde_json::to_value(CandidatesResponseData {
        keyword: args.keyword.trim().to_owned(),
        marketplace,
        low_sugar: args.low_sugar,
        candidates,
    })?;

    Ok(CommandResult::ok(data, table)
        .with_warnings(warnings)
        .with_latency(latency_ms)
        .with_marketplaces(vec![marketplace]))
}
