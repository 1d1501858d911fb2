use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;

use nutricare_auth::jwt;
use nutricare_core::models::SaveContext;

/// JWT middleware.
///
/// Extracts the `Authorization: Bearer <token>` header, decodes the Cognito
/// claims, and inserts [`AuthUser`] into request extensions for handlers.
///
/// The token's signature is not verified here: the gateway in front of the
/// API has already done so.
/// TODO: verify against the Cognito JWKS once the decoding key is carried
/// in AppState.
pub async fn require_auth(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let user = {
        let auth_header = req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(StatusCode::UNAUTHORIZED)?;

        if token.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        let claims = jwt::peek_claims(token).map_err(|_| StatusCode::UNAUTHORIZED)?;
        AuthUser {
            sub: claims.sub,
            email: claims.email,
        }
    };

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Authenticated user extracted from JWT claims.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub sub: String,
    pub email: Option<String>,
}

impl AuthUser {
    /// Ownership/timing metadata for a save performed right now.
    pub fn save_context(&self) -> SaveContext {
        SaveContext {
            owner_id: self.sub.clone(),
            owner_email: self.email.clone(),
            saved_at: jiff::Timestamp::now(),
        }
    }
}
