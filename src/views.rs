use askama::Template;
use axum::{
    http::{header::SET_COOKIE, StatusCode},
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use tracing::error;

use crate::flash::IncomingFlash;

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupPage {
    pub title: &'static str,
    pub template: &'static str,
    pub body: &'static str,
    pub messages: Vec<String>,
    pub errors: Vec<String>,
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub phone: String,
}

impl SignupPage {
    pub fn new(messages: Vec<String>) -> Self {
        Self {
            title: "Create an Account.",
            template: "signup-page",
            body: "Sign up for a user account.",
            messages,
            errors: Vec::new(),
            fullname: String::new(),
            username: String::new(),
            email: String::new(),
            phone: String::new(),
        }
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub title: &'static str,
    pub template: &'static str,
    pub body: &'static str,
    pub messages: Vec<String>,
    pub errors: Vec<String>,
    pub email: String,
    pub next: String,
}

impl LoginPage {
    pub fn new(messages: Vec<String>, next: Option<&str>) -> Self {
        Self {
            title: "Log in.",
            template: "login-page",
            body: "Log in with your User account.",
            messages,
            errors: Vec::new(),
            email: String::new(),
            next: next.unwrap_or_default().to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage {
    pub title: &'static str,
    pub template: &'static str,
    pub body: String,
    pub messages: Vec<String>,
    pub fullname: String,
    pub username: String,
}

#[derive(Template)]
#[template(path = "calendar.html")]
pub struct CalendarPage {
    pub title: &'static str,
    pub template: &'static str,
    pub body: String,
    pub messages: Vec<String>,
    pub weekdays: [&'static str; 7],
    /// Day numbers as text, blank for padding cells.
    pub weeks: Vec<Vec<String>>,
    pub today: String,
}

/// Renders `page` and, if a flash was shown, expires the flash cookie.
pub fn render<T: Template>(
    page: &T,
    flash: &IncomingFlash,
) -> Result<Response, (StatusCode, String)> {
    let html = page.render().map_err(|e| {
        error!(error = %e, "template render failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    if flash.is_present() {
        Ok((AppendHeaders([(SET_COOKIE, flash.clear_cookie())]), Html(html)).into_response())
    } else {
        Ok(Html(html).into_response())
    }
}
