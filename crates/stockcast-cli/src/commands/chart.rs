use stockcast_core::{DataSourceGateway, Horizon, Symbol};

use crate::cli::ChartArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &ChartArgs, gateway: &DataSourceGateway) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let horizon = args.days.map(Horizon::new).transpose()?;
    let chart = gateway.chart(&symbol, horizon).await?;
    Ok(CommandResult::from_sourced(chart)?.with_catalog_check(&symbol))
}
