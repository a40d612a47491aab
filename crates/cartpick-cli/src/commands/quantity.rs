use serde::Serialize;

use cartpick_core::purchase_quantity;

use crate::cli::QuantityArgs;
use crate::error::CliError;
use crate::output::Table;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct QuantityResponseData {
    required_amount: f64,
    unit_capacity: i64,
    purchase_quantity: u64,
}

pub fn run(args: &QuantityArgs) -> Result<CommandResult, CliError> {
    let quantity = purchase_quantity(args.required, args.capacity)?;

    let mut table = Table::new(&["required", "capacity", "qty"]);
    table.push_row(vec![
        args.required.to_string(),
        args.capacity.to_string(),
        quantity.to_string(),
    ]);

    let data = serde_json::to_value(QuantityResponseData {
        required_amount: args.required,
        unit_capacity: args.capacity,
        purchase_quantity: quantity,
    })?;
    Ok(CommandResult::ok(data, table))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_to_whole_items() {
        let args = QuantityArgs {
            required: 1500.0,
            capacity: 1000,
        };
        let result = run(&args).expect("valid capacity");
        assert_eq!(result.data["purchase_quantity"], 2);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let args = QuantityArgs {
            required: 100.0,
            capacity: 0,
        };
        assert!(run(&args).is_err());
    }
}
