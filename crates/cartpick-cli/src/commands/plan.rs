use std::time::Instant;

use cartpick_core::{BestMatchSelector, MarketplaceSelection, ScalingContext};

use crate::cli::PlanArgs;
use crate::error::CliError;
use crate::output::Table;

use super::{no_match_error, offer_row, CommandResult, OFFER_HEADERS};

pub async fn run(args: &PlanArgs, selector: &BestMatchSelector) -> Result<CommandResult, CliError> {
    let targets = MarketplaceSelection::parse(&args.malls)?;
    let context = ScalingContext::new(args.base, args.target)?;

    let started = Instant::now();
    let plan = selector
        .plan(&args.keyword, args.amount, context, &targets)
        .await?;
    let latency_ms = started.elapsed().as_millis() as u64;

    let mut table = Table::new(&OFFER_HEADERS);
    if let Some(best) = &plan.best {
        table.push_row(offer_row(best));
    }

    let marketplaces = targets.resolve(&selector.registry().marketplaces());
    let missing = plan.best.is_none();
    let ingredient = plan.ingredient.clone();
    let data = serde_json::to_value(plan)?;

    let mut result = CommandResult::ok(data, table)
        .with_latency(latency_ms)
        .with_marketplaces(marketplaces);
    if missing {
        result = result.with_error(no_match_error(&ingredient)?);
    }
    Ok(result)
}
