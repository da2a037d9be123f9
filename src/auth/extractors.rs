use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::SET_COOKIE, request::Parts, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use tracing::{debug, error, warn};

use super::{repo_types::User, session::SessionKeys};
use crate::{cookies::read_cookie, flash::flash_cookie, state::AppState};

pub const LOGIN_PATH: &str = "/auth/login";
pub const LOGIN_REQUIRED_MESSAGE: &str = "You must be logged in to view that page.";

/// Resolves the session cookie to a stored user.
///
/// `Ok(None)` covers every "not logged in" case: no cookie, bad or expired
/// token, or a token whose user no longer exists. Only storage failures are errors.
async fn load_session_user(parts: &Parts, state: &AppState) -> anyhow::Result<Option<User>> {
    let keys = SessionKeys::from_ref(state);
    let Some(token) = read_cookie(&parts.headers, &keys.cookie_name).filter(|t| !t.is_empty())
    else {
        return Ok(None);
    };

    let claims = match keys.verify(token) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "invalid or expired session token");
            return Ok(None);
        }
    };

    let user = state.users.find_by_id(claims.sub).await?;
    if user.is_none() {
        warn!(user_id = %claims.sub, "session refers to unknown user");
    }
    Ok(user)
}

/// Logged-in user; protected handlers take this.
pub struct AuthUser(pub User);

pub enum AuthRejection {
    /// Redirects to the login page with a flash, remembering where the user was headed.
    LoginRequired { next: String, secure: bool },
    Internal(String),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::LoginRequired { next, secure } => {
                let target = format!("{}?next={}", LOGIN_PATH, urlencoding::encode(&next));
                (
                    AppendHeaders([(SET_COOKIE, flash_cookie(LOGIN_REQUIRED_MESSAGE, secure))]),
                    Redirect::to(&target),
                )
                    .into_response()
            }
            AuthRejection::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match load_session_user(parts, state).await {
            Ok(Some(user)) => Ok(AuthUser(user)),
            Ok(None) => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_else(|| "/".into());
                Err(AuthRejection::LoginRequired {
                    next,
                    secure: state.config.session.cookie_secure,
                })
            }
            Err(e) => {
                error!(error = %e, "user loader failed");
                Err(AuthRejection::Internal(e.to_string()))
            }
        }
    }
}

/// Session user when there is one. Never rejects.
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = load_session_user(parts, state).await.unwrap_or_else(|e| {
            error!(error = %e, "user loader failed; treating request as anonymous");
            None
        });
        Ok(MaybeUser(user))
    }
}
