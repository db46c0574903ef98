use std::collections::HashMap;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use http::header::AUTHORIZATION;
use tracing::debug;

use crate::server::server::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub subject: String,
}

/// Attached to every request; `None` for anonymous callers.
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Option<CallerIdentity>);

impl Caller {
    pub fn subject(&self) -> &str {
        self.0.as_ref().map(|c| c.subject.as_str()).unwrap_or("anonymous")
    }
}

/// Best-effort identification of the inbound caller. Never an access gate:
/// an unresolved caller is still served.
pub trait CallerResolver: Send + Sync {
    fn resolve_caller(&self, authorization: Option<&str>) -> Option<CallerIdentity>;
}

/// Resolves bearer tokens against a fixed token -> caller table.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenResolver {
    tokens: HashMap<String, String>,
}

impl StaticTokenResolver {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }
}

impl CallerResolver for StaticTokenResolver {
    fn resolve_caller(&self, authorization: Option<&str>) -> Option<CallerIdentity> {
        let token = bearer_token(authorization?)?;
        self.tokens
            .get(token)
            .map(|subject| CallerIdentity { subject: subject.to_owned() })
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

pub async fn resolve_caller(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let caller = Caller(state.callers.resolve_caller(header));
    debug!("{} {} from {}", request.method(), request.uri().path(), caller.subject());

    request.extensions_mut().insert(caller);
    next.run(request).await
}

#[cfg(test)]
mod test {
    use super::*;

    fn resolver() -> StaticTokenResolver {
        StaticTokenResolver::new(HashMap::from([("s3cret".to_owned(), "mobile-app".to_owned())]))
    }

    #[test]
    fn resolves_known_bearer_tokens() {
        assert_eq!(
            resolver().resolve_caller(Some("Bearer s3cret")),
            Some(CallerIdentity { subject: "mobile-app".into() })
        );
        assert_eq!(
            resolver().resolve_caller(Some("bearer   s3cret ")),
            Some(CallerIdentity { subject: "mobile-app".into() })
        );
    }

    #[test]
    fn unknown_malformed_or_missing_headers_resolve_to_nobody() {
        assert_eq!(resolver().resolve_caller(Some("Bearer other")), None);
        assert_eq!(resolver().resolve_caller(Some("Basic s3cret")), None);
        assert_eq!(resolver().resolve_caller(Some("Bearer")), None);
        assert_eq!(resolver().resolve_caller(None), None);
    }
}
