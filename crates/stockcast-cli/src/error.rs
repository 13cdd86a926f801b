use stockcast_core::{AllocationError, ConfigError, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Allocation(AllocationError::Validation(_)) => 2,
            Self::Allocation(AllocationError::InvariantViolation(_)) => 5,
            Self::Config(_) => 3,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }

    /// Stable code carried in the error envelope.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::Allocation(AllocationError::Validation(_)) => {
                "validation.rejected"
            }
            Self::Allocation(AllocationError::InvariantViolation(_)) => {
                "allocation.invariant_violation"
            }
            Self::Config(_) => "config.invalid",
            Self::Serialization(_) => "output.serialization",
            Self::Io(_) => "output.io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_mistakes_share_one_exit_code() {
        let validation = CliError::from(ValidationError::EmptyQuery);
        let allocation = CliError::from(AllocationError::from(ValidationError::NonPositiveAmount));
        assert_eq!(validation.exit_code(), 2);
        assert_eq!(allocation.exit_code(), 2);

        let defect = CliError::from(AllocationError::InvariantViolation(String::from("sum")));
        assert_eq!(defect.exit_code(), 5);
    }

    #[test]
    fn error_codes_follow_the_exit_code_categories() {
        let validation = CliError::from(ValidationError::EmptyQuery);
        let allocation = CliError::from(AllocationError::from(ValidationError::NonPositiveAmount));
        assert_eq!(validation.code(), "validation.rejected");
        assert_eq!(allocation.code(), validation.code());

        let defect = CliError::from(AllocationError::InvariantViolation(String::from("sum")));
        assert_eq!(defect.code(), "allocation.invariant_violation");

        let config = CliError::from(ConfigError::InvalidEnv {
            name: "STOCKCAST_SEED",
            value: String::from("x"),
        });
        assert_eq!(config.code(), "config.invalid");
    }
}
