use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, instrument};

use crate::{auth::AuthUser, state::AppState};

use super::dto::{CheckTrophiesResponse, CountResponse, TrophyResponse};
use super::ledger::{AwardLedger, PgAwardLedger};
use super::services::check_for_user;

pub fn trophy_routes() -> Router<AppState> {
    Router::new()
        .route("/trophies", get(list_trophies))
        .route("/trophies/count", get(count_trophies))
        .route("/trophies/check", post(check_trophies))
}

#[instrument(skip(state))]
pub async fn list_trophies(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<TrophyResponse>>, (StatusCode, String)> {
    let awards = PgAwardLedger::new(state.db.clone(), user_id)
        .list()
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "list trophies failed");
            internal(e)
        })?;
    Ok(Json(awards.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
pub async fn count_trophies(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<CountResponse>, (StatusCode, String)> {
    let count = PgAwardLedger::new(state.db.clone(), user_id)
        .count()
        .await
        .map_err(internal)?;
    Ok(Json(CountResponse { count }))
}

/// POST /trophies/check: evaluate now and return whatever was newly earned.
#[instrument(skip(state))]
pub async fn check_trophies(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<CheckTrophiesResponse>, (StatusCode, String)> {
    let check = check_for_user(&state, user_id, OffsetDateTime::now_utc())
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "trophy check failed");
            internal(e)
        })?;
    Ok(Json(check.into()))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{tests::sign_token, TokenKind};
    use axum::{
        body::Body,
        http::{header, Request},
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app() -> (Router, AppState) {
        let state = AppState::fake();
        (trophy_routes().with_state(state.clone()), state)
    }

    #[tokio::test]
    async fn routes_require_a_token() {
        let (app, _) = app();
        for (method, uri) in [
            ("GET", "/trophies"),
            ("GET", "/trophies/count"),
            ("POST", "/trophies/check"),
        ] {
            let res = app
                .clone()
                .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn refresh_token_is_not_enough() {
        let (app, state) = app();
        let token = sign_token(&state.config.jwt, Uuid::new_v4(), TokenKind::Refresh);
        let res = app
            .oneshot(
                Request::builder()
                    .uri("/trophies/count")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
