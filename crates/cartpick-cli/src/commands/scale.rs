use serde::Serialize;

use cartpick_core::scale_amount;

use crate::cli::ScaleArgs;
use crate::error::CliError;
use crate::output::Table;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ScaleResponseData {
    original_amount: f64,
    base_portion: i64,
    target_portion: i64,
    scaled_amount: f64,
}

pub fn run(args: &ScaleArgs) -> Result<CommandResult, CliError> {
    let scaled_amount = scale_amount(args.amount, args.base, args.target)?;

    let mut table = Table::new(&["original", "base", "target", "scaled"]);
    table.push_row(vec![
        args.amount.to_string(),
        args.base.to_string(),
        args.target.to_string(),
        scaled_amount.to_string(),
    ]);

    let data = serde_json::to_value(ScaleResponseData {
        original_amount: args.amount,
        base_portion: args.base,
        target_portion: args.target,
        scaled_amount,
    })?;
    Ok(CommandResult::ok(data, table))
}
