//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate origin URLs and value ranges (window > 0, limit > 0)
//! - Check path rules are well-formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EdgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use url::Url;

use crate::config::schema::EdgeConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: invalid origin URL {value:?}")]
    InvalidOrigin { field: &'static str, value: String },
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("{field}: path {value:?} must start with '/'")]
    RelativePath { field: &'static str, value: String },
    #[error("routing.section_root must name a section and not end with '/'")]
    SectionRootTrailingSlash,
    #[error("listener.tls requires both cert_path and key_path")]
    IncompleteTls,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_origin(&mut errors, "origins.static_origin", &config.origins.static_origin);
    check_origin(&mut errors, "origins.legacy_origin", &config.origins.legacy_origin);

    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError::Zero { field: "rate_limit.max_requests" });
    }
    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::Zero { field: "rate_limit.window_secs" });
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::Zero { field: "listener.max_connections" });
    }

    let routing = &config.routing;
    check_path(&mut errors, "routing.section_root", &routing.section_root);
    if routing.section_root.ends_with('/') {
        errors.push(ValidationError::SectionRootTrailingSlash);
    }
    check_path(&mut errors, "routing.shell_html_path", &routing.shell_html_path);
    for file in &routing.root_files {
        check_path(&mut errors, "routing.root_files", file);
    }
    for prefix in routing.framework_prefixes.iter().chain(&routing.static_prefixes) {
        check_path(&mut errors, "routing prefixes", prefix);
    }
    for prefix in &config.rate_limit.path_prefixes {
        check_path(&mut errors, "rate_limit.path_prefixes", prefix);
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() || tls.key_path.is_empty() {
            errors.push(ValidationError::IncompleteTls);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_origin(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let valid = Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::InvalidOrigin {
            field,
            value: value.to_string(),
        });
    }
}

fn check_path(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if !value.starts_with('/') {
        errors.push(ValidationError::RelativePath {
            field,
            value: value.to_string(),
        });
    }
}
