use stockcast_core::DataSourceGateway;

use crate::cli::PopularArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &PopularArgs, gateway: &DataSourceGateway) -> Result<CommandResult, CliError> {
    let listing = gateway.popular(args.market.into()).await;
    CommandResult::from_sourced(listing)
}
