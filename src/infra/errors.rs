// src/infra/errors.rs — Error types for claimbot
//
// Remote-call failures (429 exhaustion, dropped connections, non-2xx
// statuses) are modeled as result values in the api/engine layers and never
// surface as errors; this enum covers the infrastructure that can genuinely
// fail a pass or the process.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClaimBotError {
    #[error("Accounts file not found: {path}")]
    AccountsFileNotFound { path: String },

    #[error("No account ids found in {path}")]
    NoAccounts { path: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid base URL '{url}': {message}")]
    BaseUrl { url: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
