use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] presale_core::ValidationError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Wallet(#[from] presale_core::WalletError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(presale_core::CoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Command(_) => 2,
            Self::Wallet(_) => 3,
            Self::Serialization(_) => 4,
            Self::Config(_) => 5,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_failures_exit_with_three() {
        let error = CliError::from(presale_core::WalletError::WalletUnavailable);
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn config_failures_exit_with_five() {
        let error = CliError::Config(presale_core::CoreError::from(
            presale_core::ValidationError::EmptyDuration,
        ));
        assert_eq!(error.exit_code(), 5);
        assert!(error.to_string().starts_with("configuration error"));
    }
}
