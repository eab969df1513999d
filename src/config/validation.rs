//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate paths, header names/values and HTTP methods
//! - Compile route patterns so bad patterns fail at startup
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::str::FromStr;

use axum::http::{HeaderName, HeaderValue, Method};

use crate::config::schema::GateConfig;
use crate::routing::PathPattern;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `cors.allowed_methods`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_path(&mut errors, "gate.api_prefix", &config.gate.api_prefix);
    check_path(&mut errors, "auth.admin_prefix", &config.auth.admin_prefix);
    check_path(&mut errors, "auth.sign_in_path", &config.auth.sign_in_path);
    check_path(&mut errors, "auth.unauthorized_path", &config.auth.unauthorized_path);
    for route in &config.auth.public_routes {
        check_path(&mut errors, "auth.public_routes", route);
    }
    if config.auth.admin_role.is_empty() {
        errors.push(ValidationError::new("auth.admin_role", "must not be empty"));
    }
    if config.auth.callback_param.is_empty() {
        errors.push(ValidationError::new("auth.callback_param", "must not be empty"));
    }

    for method in &config.cors.allowed_methods {
        if Method::from_str(method).is_err() {
            errors.push(ValidationError::new(
                "cors.allowed_methods",
                format!("`{method}` is not an HTTP method"),
            ));
        }
    }
    for header in &config.cors.allowed_headers {
        if HeaderName::from_str(header).is_err() {
            errors.push(ValidationError::new(
                "cors.allowed_headers",
                format!("`{header}` is not a header name"),
            ));
        }
    }
    for origin in &config.cors.allowed_origins {
        if HeaderValue::from_str(origin).is_err() {
            errors.push(ValidationError::new(
                "cors.allowed_origins",
                format!("`{origin}` is not a valid header value"),
            ));
        }
        if origin == "*" && config.cors.allow_credentials {
            errors.push(ValidationError::new(
                "cors.allowed_origins",
                "`*` cannot be combined with allow_credentials",
            ));
        }
    }

    for (field, patterns) in [
        ("routes.protected", &config.routes.protected),
        ("routes.excluded", &config.routes.excluded),
    ] {
        for pattern in patterns {
            if let Err(e) = PathPattern::parse(pattern) {
                errors.push(ValidationError::new(field, e.to_string()));
            }
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }
    if config.identity.timeout_ms == 0 {
        errors.push(ValidationError::new("identity.timeout_ms", "must be > 0"));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::new("listener.max_connections", "must be > 0"));
    }

    match url::Url::parse(&config.identity.session_endpoint) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "identity.session_endpoint",
            format!("unsupported scheme `{}`", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "identity.session_endpoint",
            e.to_string(),
        )),
    }
    for cookie in &config.identity.session_cookies {
        if cookie.is_empty() || cookie.contains(['=', ';', ' ']) {
            errors.push(ValidationError::new(
                "identity.session_cookies",
                format!("`{cookie}` is not a cookie name"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_path(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if !value.starts_with('/') {
        errors.push(ValidationError::new(
            field,
            format!("`{value}` must start with '/'"),
        ));
    }
}
