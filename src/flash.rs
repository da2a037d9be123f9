//! One-shot notices carried across a redirect in a cookie.
//!
//! A handler that redirects attaches [`flash_cookie`]; the next page that
//! renders reads it through [`IncomingFlash`] and clears it in the same response.

use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{
    cookies::{expired_cookie, read_cookie, secure_suffix},
    state::AppState,
};

pub const FLASH_COOKIE_NAME: &str = "flash";

/// `Secure` follows the session cookie setting so both travel the same way.
pub fn flash_cookie(message: &str, secure: bool) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax{}",
        FLASH_COOKIE_NAME,
        urlencoding::encode(message),
        secure_suffix(secure)
    )
}

pub fn clear_flash_cookie(secure: bool) -> String {
    expired_cookie(FLASH_COOKIE_NAME, secure)
}

/// Flash message sent back by the browser, if any.
#[derive(Debug, Default, Clone)]
pub struct IncomingFlash {
    pub message: Option<String>,
    secure: bool,
}

impl IncomingFlash {
    pub fn new(message: Option<String>, secure: bool) -> Self {
        Self { message, secure }
    }

    pub fn is_present(&self) -> bool {
        self.message.is_some()
    }

    pub fn messages(&self) -> Vec<String> {
        self.message.iter().cloned().collect()
    }

    /// Incoming message first, then anything raised while handling this request.
    pub fn with(&self, extra: impl IntoIterator<Item = String>) -> Vec<String> {
        self.message.iter().cloned().chain(extra).collect()
    }

    pub fn clear_cookie(&self) -> String {
        clear_flash_cookie(self.secure)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for IncomingFlash {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let message = read_cookie(&parts.headers, FLASH_COOKIE_NAME)
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| urlencoding::decode(raw).ok())
            .map(|decoded| decoded.into_owned());
        Ok(IncomingFlash::new(message, state.config.session.cookie_secure))
    }
}
