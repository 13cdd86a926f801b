use stockcast_core::{DataSourceGateway, Symbol};

use crate::cli::SymbolArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &SymbolArgs, gateway: &DataSourceGateway) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let series = gateway.historical(&symbol).await?;
    Ok(CommandResult::from_sourced(series)?.with_catalog_check(&symbol))
}
