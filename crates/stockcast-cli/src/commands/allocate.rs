use serde::Serialize;
use stockcast_core::{
    AllocationEngine, AllocationTables, GatewayConfig, Portfolio, SectorAggregate,
};
use tracing::debug;

use crate::cli::AllocateArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct AllocationResponseData {
    portfolio: Portfolio,
    sectors: Vec<SectorAggregate>,
}

pub fn run(args: &AllocateArgs, config: &GatewayConfig) -> Result<CommandResult, CliError> {
    let tables = match args.table.as_ref().or(config.allocation_table.as_ref()) {
        Some(path) => {
            debug!(path = %path.display(), "loading allocation tables");
            AllocationTables::from_path(path)?
        }
        None => AllocationTables::builtin(),
    };

    let portfolio = AllocationEngine::new(tables).allocate(args.amount, args.risk.into())?;
    let sectors = portfolio.sector_aggregates();
    let data = serde_json::to_value(AllocationResponseData { portfolio, sectors })?;
    Ok(CommandResult::ok(data))
}
