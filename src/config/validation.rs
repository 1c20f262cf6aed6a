//! Configuration validation.
//!
//! Semantic checks on top of what serde already guarantees. Returns all
//! validation errors, not just the first, so a broken config can be fixed
//! in one pass.

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyNodeUrl,
    InvalidNodeUrl(String),
    ZeroRpcTimeout,
    EmptyDefaultAccount,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyNodeUrl => write!(f, "node.url must not be empty"),
            ValidationError::InvalidNodeUrl(url) => {
                write!(f, "node.url '{}' is not a valid URL", url)
            }
            ValidationError::ZeroRpcTimeout => {
                write!(f, "node.rpc_timeout_secs must be greater than zero")
            }
            ValidationError::EmptyDefaultAccount => {
                write!(f, "account.default_account must not be empty")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a configuration, collecting every problem.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.node.url.trim().is_empty() {
        errors.push(ValidationError::EmptyNodeUrl);
    } else if config.node.url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::InvalidNodeUrl(config.node.url.clone()));
    }

    if config.node.rpc_timeout_secs == 0 {
        errors.push(ValidationError::ZeroRpcTimeout);
    }

    if config.account.default_account.trim().is_empty() {
        errors.push(ValidationError::EmptyDefaultAccount);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
