//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parseable)
//! - Catch discovery settings that would make every scan empty
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::RouterConfig;

/// One semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    ZeroRequestTimeout,
    EmptyRouteRoot,
    NoExtensions,
    ExtensionHasLeadingDot(String),
    EmptyCacheFile,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener.bind_address {:?} is not a socket address", addr)
            }
            ValidationError::ZeroRequestTimeout => {
                write!(f, "listener.request_timeout_secs must be greater than zero")
            }
            ValidationError::EmptyRouteRoot => write!(f, "discovery.root must not be empty"),
            ValidationError::NoExtensions => {
                write!(f, "discovery.extensions must list at least one extension")
            }
            ValidationError::ExtensionHasLeadingDot(ext) => {
                write!(f, "discovery.extensions entry {:?} must not start with a dot", ext)
            }
            ValidationError::EmptyCacheFile => {
                write!(f, "discovery.cache_file must not be empty")
            }
        }
    }
}

/// Check a parsed configuration for semantic problems.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.discovery.root.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyRouteRoot);
    }
    if config.discovery.extensions.is_empty() {
        errors.push(ValidationError::NoExtensions);
    }
    for ext in &config.discovery.extensions {
        if ext.starts_with('.') {
            errors.push(ValidationError::ExtensionHasLeadingDot(ext.clone()));
        }
    }
    if config.discovery.cache_file.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyCacheFile);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&RouterConfig::default()).is_ok());
    }

    #[test]
    fn all_errors_are_reported_together() {
        let mut config = RouterConfig::default();
        config.listener.bind_address = "nope".into();
        config.listener.request_timeout_secs = 0;
        config.discovery.extensions = vec![".rs".into()];

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::InvalidBindAddress("nope".into())));
        assert!(errors.contains(&ValidationError::ZeroRequestTimeout));
        assert!(errors.contains(&ValidationError::ExtensionHasLeadingDot(".rs".into())));
    }
}
