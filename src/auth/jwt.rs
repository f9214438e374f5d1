use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{config::JwtConfig, state::AppState};

/// Type of JWT: access or refresh. Only access tokens open the trophy routes.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    #[serde(alias = "Access")]
    Access,
    #[serde(alias = "Refresh")]
    Refresh,
}

/// Payload issued by the MealMind auth service.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
    pub iss: String,
    pub aud: String,
    pub kind: TokenKind,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
        } = state.config.jwt.clone();
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
        }
    }
}

impl JwtKeys {
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, kind = ?data.claims.kind, "jwt verified");
        Ok(data.claims)
    }
}

/// Authenticated user id taken from a bearer access token.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Missing Authorization header".to_string(),
            ))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header".to_string(),
            ))?;

        let claims = match keys.verify(token) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "invalid or expired token");
                return Err((
                    StatusCode::UNAUTHORIZED,
                    "Invalid or expired token".to_string(),
                ));
            }
        };

        if claims.kind != TokenKind::Access {
            return Err((
                StatusCode::UNAUTHORIZED,
                "Access token required".to_string(),
            ));
        }

        Ok(AuthUser(claims.sub))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::http::Request;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use time::{Duration, OffsetDateTime};

    /// Signs a token the way the auth service does.
    pub(crate) fn sign_token(cfg: &JwtConfig, user_id: Uuid, kind: TokenKind) -> String {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: (now + Duration::minutes(5)).unix_timestamp() as usize,
            iss: cfg.issuer.clone(),
            aud: cfg.audience.clone(),
            kind,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(cfg.secret.as_bytes()),
        )
        .expect("sign token")
    }

    async fn extract(state: &AppState, auth: Option<String>) -> Result<Uuid, (StatusCode, String)> {
        let mut builder = Request::builder().uri("/trophies");
        if let Some(value) = auth {
            builder = builder.header(axum::http::header::AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, state)
            .await
            .map(|AuthUser(id)| id)
    }

    #[tokio::test]
    async fn access_token_yields_user() {
        let state = AppState::fake();
        let user_id = Uuid::new_v4();
        let token = sign_token(&state.config.jwt, user_id, TokenKind::Access);
        let got = extract(&state, Some(format!("Bearer {token}"))).await.unwrap();
        assert_eq!(got, user_id);
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let state = AppState::fake();
        let (status, _) = extract(&state, None).await.unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let state = AppState::fake();
        let (status, msg) = extract(&state, Some("Basic abc".into())).await.unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(msg, "Invalid Authorization header");
    }

    #[tokio::test]
    async fn refresh_token_is_rejected() {
        let state = AppState::fake();
        let token = sign_token(&state.config.jwt, Uuid::new_v4(), TokenKind::Refresh);
        let (_, msg) = extract(&state, Some(format!("Bearer {token}"))).await.unwrap_err();
        assert_eq!(msg, "Access token required");
    }

    #[tokio::test]
    async fn wrong_audience_is_rejected() {
        let state = AppState::fake();
        let mut other = state.config.jwt.clone();
        other.audience = "someone-else".into();
        let token = sign_token(&other, Uuid::new_v4(), TokenKind::Access);
        let (_, msg) = extract(&state, Some(format!("Bearer {token}"))).await.unwrap_err();
        assert_eq!(msg, "Invalid or expired token");
    }

    #[test]
    fn token_kind_accepts_both_casings() {
        let k: TokenKind = serde_json::from_str("\"access\"").unwrap();
        assert_eq!(k, TokenKind::Access);
        let k: TokenKind = serde_json::from_str("\"Refresh\"").unwrap();
        assert_eq!(k, TokenKind::Refresh);
    }
}
