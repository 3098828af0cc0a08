use super::Middleware;
use crate::dispatcher::{HandlerResponse, RequestContext};

/// Rejects requests whose `Authorization` header is not `Bearer <token>`
/// with a `401` response.
///
/// The scheme keyword is matched case-insensitively; the token is compared
/// in constant time.
pub struct AuthMiddleware {
    token: String,
}

impl AuthMiddleware {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl Middleware for AuthMiddleware {
    fn before(&self, ctx: &RequestContext<'_>) -> anyhow::Result<Option<HandlerResponse>> {
        let presented = ctx
            .request
            .get_header("authorization")
            .and_then(bearer_token);

        Ok(match presented {
            Some(token) if constant_time_eq(token.as_bytes(), self.token.as_bytes()) => None,
            _ => Some(HandlerResponse::error(401, "Unauthorized")),
        })
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then_some(token.trim())
}

/// Equal-length inputs take the same time whatever their contents.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
