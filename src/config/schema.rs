//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the request gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Application upstream that receives forwarded requests.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Path classification settings.
    pub gate: ClassifierConfig,

    /// CORS headers emitted for API traffic.
    pub cors: CorsConfig,

    /// Authorization policy for non-API traffic.
    pub auth: AuthConfig,

    /// Which non-API paths go through the auth gate at all.
    pub routes: RoutesConfig,

    /// Identity provider used to verify session tokens.
    pub identity: IdentityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent in-flight requests (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Upstream application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Path classifier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Paths starting with this prefix are API traffic.
    pub api_prefix: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            api_prefix: "/api/".to_string(),
        }
    }
}

/// CORS configuration for API traffic.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. Empty reflects the caller's `Origin` header.
    pub allowed_origins: Vec<String>,

    /// Value list for `Access-Control-Allow-Methods`.
    pub allowed_methods: Vec<String>,

    /// Value list for `Access-Control-Allow-Headers`.
    pub allowed_headers: Vec<String>,

    /// Emit `Access-Control-Allow-Credentials: true`.
    pub allow_credentials: bool,

    /// Preflight cache duration in seconds.
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allowed_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            allowed_headers: ["Content-Type", "Authorization", "Cookie"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
            allow_credentials: true,
            max_age_secs: 86_400,
        }
    }
}

/// Authorization policy for non-API traffic.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Paths served without a session (exact match).
    pub public_routes: Vec<String>,

    /// Paths starting with this prefix require `admin_role`.
    pub admin_prefix: String,

    /// Role value required for admin paths (case-sensitive).
    pub admin_role: String,

    /// Identity provider sign-in entry point.
    pub sign_in_path: String,

    /// Query parameter carrying the original path on the sign-in redirect.
    pub callback_param: String,

    /// Redirect target when the role check fails.
    pub unauthorized_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            public_routes: vec!["/login".into(), "/register".into(), "/".into()],
            admin_prefix: "/admin".to_string(),
            admin_role: "admin".to_string(),
            sign_in_path: "/api/auth/signin".to_string(),
            callback_param: "callbackUrl".to_string(),
            unauthorized_path: "/unauthorized".to_string(),
        }
    }
}

/// Route matcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Patterns always routed through the auth gate.
    pub protected: Vec<String>,

    /// Patterns never routed through the auth gate unless listed in `protected`.
    pub excluded: Vec<String>,

    /// Route every path that is not excluded.
    pub catch_all: bool,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        let protected = [
            "/home/:path*",
            "/lookup/:path*",
            "/vocabulary/:path*",
            "/profile/:path*",
            "/admin/:path*",
            "/reviewHistory/:path*",
            "/review/:path*",
            "/wordlist/:path*",
        ];
        let excluded = [
            "/",
            "/login*",
            "/register*",
            "/api*",
            "/_next/static*",
            "/_next/image*",
            "/favicon.ico*",
        ];
        Self {
            protected: protected.iter().map(|p| p.to_string()).collect(),
            excluded: excluded.iter().map(|p| p.to_string()).collect(),
            catch_all: true,
        }
    }
}

/// Identity provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Session endpoint returning the caller's session as JSON.
    pub session_endpoint: String,

    /// Cookie names carrying the session token.
    pub session_cookies: Vec<String>,

    /// Verification timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            session_endpoint: "http://127.0.0.1:3000/api/auth/session".to_string(),
            session_cookies: vec![
                "next-auth.session-token".to_string(),
                "__Secure-next-auth.session-token".to_string(),
            ],
            timeout_ms: 3_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: GateConfig = toml::from_str(
            r#"
            [gate]
            api_prefix = "/v1/"

            [auth]
            admin_role = "superuser"
            "#,
        )
        .unwrap();

        assert_eq!(config.gate.api_prefix, "/v1/");
        assert_eq!(config.auth.admin_role, "superuser");
        assert_eq!(config.auth.admin_prefix, "/admin");
        assert_eq!(config.cors.max_age_secs, 86_400);
        assert_eq!(config.routes.protected.len(), 8);
    }

    #[test]
    fn test_log_format_lowercase() {
        let config: GateConfig = toml::from_str(
            r#"
            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }
}
