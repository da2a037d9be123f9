use axum::{
    extract::{FromRef, Query, State},
    http::{header::SET_COOKIE, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{safe_next, LoginForm, LoginQuery, SignupForm},
        extractors::{MaybeUser, LOGIN_PATH},
        password::{hash_password_blocking, verify_password_blocking},
        repo_types::{CreateUserError, NewUser},
        session::SessionKeys,
    },
    flash::{flash_cookie, IncomingFlash},
    state::AppState,
    views::{render, LoginPage, SignupPage},
};

pub const HOME_PATH: &str = "/";
pub const CALENDAR_PATH: &str = "/calendar";

pub const DUPLICATE_EMAIL_MESSAGE: &str = "A user already exists with that email address.";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username/password combination";
pub const LOGGED_OUT_MESSAGE: &str = "You have been logged out.";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", get(signup_page).post(signup))
        .route("/auth/login", get(login_page).post(login))
        .route("/auth/logout", get(logout).post(logout))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Redirect that also sets `cookie`.
fn redirect_with(cookie: String, to: &str) -> Response {
    (AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to(to)).into_response()
}

#[instrument(skip_all)]
pub async fn signup_page(flash: IncomingFlash) -> Result<Response, (StatusCode, String)> {
    render(&SignupPage::new(flash.messages()), &flash)
}

#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    flash: IncomingFlash,
    Form(form): Form<SignupForm>,
) -> Result<Response, (StatusCode, String)> {
    let form = form.normalized();

    let rerender = |messages: Vec<String>, errors: Vec<String>| {
        let mut page = SignupPage::new(flash.with(messages));
        page.errors = errors;
        page.fullname = form.fullname.clone();
        page.username = form.username.clone();
        page.email = form.email.clone();
        page.phone = form.phone.clone();
        render(&page, &flash)
    };

    if let Err(e) = form.validate() {
        warn!(email = %form.email, error = %e, "signup form rejected");
        return rerender(Vec::new(), e.messages());
    }

    let password_hash = hash_password_blocking(form.password.clone())
        .await
        .map_err(|e| {
            error!(error = %e, "hash_password failed");
            internal(e)
        })?;

    let new_user = NewUser {
        fullname: form.fullname.clone(),
        username: form.username.clone(),
        email: form.email.clone(),
        phone: form.phone.clone(),
        password_hash,
    };

    let user = match state.users.create(&new_user).await {
        Ok(u) => u,
        Err(CreateUserError::DuplicateEmail(email)) => {
            warn!(email = %email, "email already registered");
            return rerender(vec![DUPLICATE_EMAIL_MESSAGE.to_string()], Vec::new());
        }
        Err(CreateUserError::Other(e)) => {
            error!(error = %e, "create user failed");
            return Err(internal(e));
        }
    };

    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(&user).map_err(|e| {
        error!(error = %e, "session sign failed");
        internal(e)
    })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(redirect_with(keys.session_cookie(&token), HOME_PATH))
}

#[instrument(skip_all)]
pub async fn login_page(
    MaybeUser(current): MaybeUser,
    flash: IncomingFlash,
    Query(query): Query<LoginQuery>,
) -> Result<Response, (StatusCode, String)> {
    if current.is_some() {
        return Ok(Redirect::to(CALENDAR_PATH).into_response());
    }
    let next = safe_next(query.next.as_deref());
    render(&LoginPage::new(flash.messages(), next), &flash)
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    MaybeUser(current): MaybeUser,
    flash: IncomingFlash,
    Query(query): Query<LoginQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response, (StatusCode, String)> {
    if current.is_some() {
        return Ok(Redirect::to(CALENDAR_PATH).into_response());
    }

    let form = form.normalized();
    let next = safe_next(query.next.as_deref());
    let secure = state.config.session.cookie_secure;

    if let Err(e) = form.validate() {
        warn!(email = %form.email, error = %e, "login form rejected");
        let mut page = LoginPage::new(flash.messages(), next);
        page.errors = e.messages();
        page.email = form.email.clone();
        return render(&page, &flash);
    }

    let user = state.users.find_by_email(&form.email).await.map_err(|e| {
        error!(error = %e, "find_by_email failed");
        internal(e)
    })?;

    let user = match user {
        Some(u) => u,
        None => {
            warn!(email = %form.email, "login unknown email");
            let notice = flash_cookie(INVALID_CREDENTIALS_MESSAGE, secure);
            return Ok(redirect_with(notice, LOGIN_PATH));
        }
    };

    let ok = verify_password_blocking(form.password.clone(), user.password_hash.clone())
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %user.id, "verify_password failed");
            internal(e)
        })?;

    if !ok {
        warn!(email = %form.email, user_id = %user.id, "login invalid password");
        let notice = flash_cookie(INVALID_CREDENTIALS_MESSAGE, secure);
        return Ok(redirect_with(notice, LOGIN_PATH));
    }

    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(&user).map_err(|e| {
        error!(error = %e, "session sign failed");
        internal(e)
    })?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(redirect_with(
        keys.session_cookie(&token),
        next.unwrap_or(CALENDAR_PATH),
    ))
}

#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, MaybeUser(current): MaybeUser) -> Response {
    if let Some(user) = &current {
        info!(user_id = %user.id, "user logged out");
    }
    let keys = SessionKeys::from_ref(&state);
    (
        AppendHeaders([
            (SET_COOKIE, keys.clear_session_cookie()),
            (SET_COOKIE, flash_cookie(LOGGED_OUT_MESSAGE, keys.cookie_secure)),
        ]),
        Redirect::to(LOGIN_PATH),
    )
        .into_response()
}
