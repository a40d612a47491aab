use serde::Serialize;

use cartpick_core::{BestMatchSelector, StrategyDescriptor};

use crate::error::CliError;
use crate::output::Table;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct SourcesResponseData {
    strategies: Vec<StrategyDescriptor>,
}

pub fn run(selector: &BestMatchSelector) -> Result<CommandResult, CliError> {
    let strategies = selector.registry().describe();

    let mut table = Table::new(&["mall", "nutrition", "chain"]);
    for strategy in &strategies {
        let chain = strategy
            .sources
            .iter()
            .map(|source| match source.circuit {
                Some(state) => format!("{} [{state}]", source.name),
                None => source.name.to_owned(),
            })
            .collect::<Vec<_>>()
            .join(" -> ");
        table.push_row(vec![
            strategy.marketplace.to_string(),
            strategy.nutrition.to_string(),
            chain,
        ]);
    }

    let marketplaces = selector.registry().marketplaces();
    let data = serde_json::to_value(SourcesResponseData { strategies })?;
    Ok(CommandResult::ok(data, table).with_marketplaces(marketplaces))
}
