use stockcast_core::{DataSourceGateway, Horizon, Symbol};

use crate::cli::PredictArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &PredictArgs, gateway: &DataSourceGateway) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let horizon = Horizon::new(args.days)?;
    let prediction = gateway.prediction(&symbol, horizon).await?;
    Ok(CommandResult::from_sourced(prediction)?.with_catalog_check(&symbol))
}
