//! Request context extractor.
//!
//! Carries the client IP and user agent of the current request as an
//! explicit value handlers pass to the audit recorder, instead of digging
//! through raw headers at each call site.

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use std::convert::Infallible;
use std::net::SocketAddr;

/// Client request context captured from headers.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Client IP: first entry of `X-Forwarded-For` when present, otherwise
    /// the peer address.
    pub ip_address: Option<String>,
    /// The `User-Agent` header value.
    pub user_agent: Option<String>,
}

impl RequestContext {
    fn from_parts(parts: &Parts) -> Self {
        let forwarded_ip = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty());

        let peer_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip().to_string());

        let user_agent = parts
            .headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        Self {
            ip_address: forwarded_ip.or(peer_ip),
            user_agent,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_for(builder: axum::http::request::Builder) -> Parts {
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_forwarded_for_takes_first_entry() {
        let parts = parts_for(
            Request::builder()
                .uri("/")
                .header("x-forwarded-for", "203.0.113.5, 10.0.0.1"),
        );

        let context = RequestContext::from_parts(&parts);
        assert_eq!(context.ip_address.as_deref(), Some("203.0.113.5"));
    }

    #[test]
    fn test_user_agent_captured() {
        let parts = parts_for(Request::builder().uri("/").header("user-agent", "curl/8.0"));

        let context = RequestContext::from_parts(&parts);
        assert_eq!(context.user_agent.as_deref(), Some("curl/8.0"));
    }

    #[test]
    fn test_missing_headers() {
        let parts = parts_for(Request::builder().uri("/"));

        let context = RequestContext::from_parts(&parts);
        assert_eq!(context.ip_address, None);
        assert_eq!(context.user_agent, None);
    }
}
