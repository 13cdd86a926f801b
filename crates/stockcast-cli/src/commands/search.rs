use stockcast_core::DataSourceGateway;

use crate::cli::SearchArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &SearchArgs, gateway: &DataSourceGateway) -> Result<CommandResult, CliError> {
    let matches = gateway.search(&args.query).await?;
    CommandResult::from_sourced(matches)
}
