//! CORS handling for API traffic.
//!
//! # Responsibilities
//! - Answer preflight (`OPTIONS`) requests directly
//! - Compute the CORS headers attached to forwarded API responses
//!
//! # Design Decisions
//! - Header values are rendered once at startup
//! - `Access-Control-Max-Age` is only ever sent on preflight responses
//! - With an empty allow-list the caller's `Origin` is reflected (`*` when absent).
//!   Combined with credentials this lets any site make credentialed calls, so
//!   deployments should set `allowed_origins`.
//! - With an allow-list, a request without `Origin` gets `*` and no credentials

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};

use crate::config::CorsConfig;
use crate::gate::Decision;
use crate::http::GateRequest;

/// Errors raised while building a [`CorsResponder`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid CORS value for {field}: `{value}`")]
pub struct CorsConfigError {
    pub field: &'static str,
    pub value: String,
}

#[derive(Debug, Clone)]
enum OriginPolicy {
    Reflect,
    AllowList(Vec<HeaderValue>),
}

/// Precomputed CORS policy for API paths.
#[derive(Debug, Clone)]
pub struct CorsResponder {
    origins: OriginPolicy,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    allow_credentials: bool,
    max_age: HeaderValue,
}

impl CorsResponder {
    pub fn from_config(config: &CorsConfig) -> Result<Self, CorsConfigError> {
        let origins = if config.allowed_origins.is_empty() {
            OriginPolicy::Reflect
        } else {
            let list = config
                .allowed_origins
                .iter()
                .map(|o| {
                    HeaderValue::from_str(o).map_err(|_| CorsConfigError {
                        field: "allowed_origins",
                        value: o.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            OriginPolicy::AllowList(list)
        };

        Ok(Self {
            origins,
            allow_methods: joined("allowed_methods", &config.allowed_methods)?,
            allow_headers: joined("allowed_headers", &config.allowed_headers)?,
            allow_credentials: config.allow_credentials,
            max_age: HeaderValue::from(config.max_age_secs),
        })
    }

    /// Decide the outcome for an API-classified request.
    pub fn respond(&self, req: &GateRequest<'_>) -> Decision {
        let Some((origin, credentials)) = self.resolve_origin(req.origin()) else {
            tracing::debug!(
                origin = ?req.origin(),
                path = %req.path(),
                "Origin not in CORS allow-list"
            );
            return if req.is_preflight() {
                Decision::Reject {
                    status: StatusCode::FORBIDDEN,
                }
            } else {
                Decision::PassThrough
            };
        };

        let mut headers = self.base_headers(origin, credentials);
        if req.is_preflight() {
            headers.insert(header::ACCESS_CONTROL_MAX_AGE, self.max_age.clone());
            Decision::Preflight(headers)
        } else {
            Decision::PassThroughWithCors(headers)
        }
    }

    /// The `Access-Control-Allow-Origin` value and whether credentials may be
    /// advertised with it, or `None` when the origin is refused.
    ///
    /// An allow-list never pairs `*` with credentials; reflect mode keeps the
    /// deployed behaviour and does.
    fn resolve_origin(&self, origin: Option<&HeaderValue>) -> Option<(HeaderValue, bool)> {
        let wildcard = HeaderValue::from_static("*");
        match (&self.origins, origin) {
            (OriginPolicy::Reflect, None) => Some((wildcard, self.allow_credentials)),
            (OriginPolicy::Reflect, Some(origin)) => Some((origin.clone(), self.allow_credentials)),
            (OriginPolicy::AllowList(_), None) => Some((wildcard, false)),
            (OriginPolicy::AllowList(list), Some(origin)) => list
                .iter()
                .find(|o| *o == origin)
                .map(|o| (o.clone(), self.allow_credentials)),
        }
    }

    fn base_headers(&self, origin: HeaderValue, credentials: bool) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(5);
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        if credentials {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
        headers
    }
}

fn joined(field: &'static str, values: &[String]) -> Result<HeaderValue, CorsConfigError> {
    let value = values.join(", ");
    HeaderValue::from_str(&value).map_err(|_| CorsConfigError { field, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, Request};

    fn responder() -> CorsResponder {
        CorsResponder::from_config(&CorsConfig::default()).unwrap()
    }

    fn request(method: Method, origin: Option<&str>) -> Request<()> {
        let mut builder = Request::builder().method(method).uri("/api/words");
        if let Some(origin) = origin {
            builder = builder.header(header::ORIGIN, origin);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_preflight_reflects_origin() {
        let req = request(Method::OPTIONS, Some("https://x.com"));
        let Decision::Preflight(headers) = responder().respond(&GateRequest::from(&req)) else {
            panic!("expected preflight");
        };

        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://x.com");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_METHODS],
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Content-Type, Authorization, Cookie"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "86400");
        assert_eq!(headers.len(), 5);
    }

    #[test]
    fn test_pass_through_without_origin() {
        let req = request(Method::GET, None);
        let Decision::PassThroughWithCors(headers) = responder().respond(&GateRequest::from(&req))
        else {
            panic!("expected pass-through");
        };

        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(headers.get(header::ACCESS_CONTROL_MAX_AGE).is_none());
        assert_eq!(headers.len(), 4);
    }

    #[test]
    fn test_allow_list() {
        let config = CorsConfig {
            allowed_origins: vec!["https://app.example".into()],
            ..CorsConfig::default()
        };
        let cors = CorsResponder::from_config(&config).unwrap();

        let ok = request(Method::OPTIONS, Some("https://app.example"));
        assert!(matches!(
            cors.respond(&GateRequest::from(&ok)),
            Decision::Preflight(_)
        ));

        let evil = request(Method::OPTIONS, Some("https://evil.example"));
        assert_eq!(
            cors.respond(&GateRequest::from(&evil)),
            Decision::Reject {
                status: StatusCode::FORBIDDEN
            }
        );

        let evil_get = request(Method::POST, Some("https://evil.example"));
        assert_eq!(cors.respond(&GateRequest::from(&evil_get)), Decision::PassThrough);
    }

    #[test]
    fn test_allow_list_without_origin_omits_credentials() {
        let config = CorsConfig {
            allowed_origins: vec!["https://app.example".into()],
            ..CorsConfig::default()
        };
        let cors = CorsResponder::from_config(&config).unwrap();

        let req = request(Method::GET, None);
        let Decision::PassThroughWithCors(headers) = cors.respond(&GateRequest::from(&req)) else {
            panic!("expected pass-through");
        };
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());

        let listed = request(Method::GET, Some("https://app.example"));
        let Decision::PassThroughWithCors(headers) = cors.respond(&GateRequest::from(&listed))
        else {
            panic!("expected pass-through");
        };
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[test]
    fn test_credentials_can_be_disabled() {
        let config = CorsConfig {
            allow_credentials: false,
            ..CorsConfig::default()
        };
        let cors = CorsResponder::from_config(&config).unwrap();
        let req = request(Method::OPTIONS, None);
        let Decision::Preflight(headers) = cors.respond(&GateRequest::from(&req)) else {
            panic!("expected preflight");
        };
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
    }

    #[test]
    fn test_invalid_header_list_rejected() {
        let config = CorsConfig {
            allowed_methods: vec!["GET\n".into()],
            ..CorsConfig::default()
        };
        let err = CorsResponder::from_config(&config).unwrap_err();
        assert_eq!(err.field, "allowed_methods");
    }
}
