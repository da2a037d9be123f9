use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

pub const MIN_PASSWORD_LEN: usize = 8;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^[0-9+\-() ]{7,20}$").unwrap();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Sign-up form body.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// Login form body.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{} invalid field(s)", .0.len())]
pub struct FormError(pub Vec<FieldError>);

impl FormError {
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(|e| e.to_string()).collect()
    }
}

fn required(errors: &mut Vec<FieldError>, field: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "This field is required."));
        false
    } else {
        true
    }
}

impl SignupForm {
    /// Trims text fields and lowercases the email. The password is left untouched.
    pub fn normalized(mut self) -> Self {
        self.fullname = self.fullname.trim().to_string();
        self.username = self.username.trim().to_string();
        self.email = normalize_email(&self.email);
        self.phone = self.phone.trim().to_string();
        self
    }

    pub fn validate(&self) -> Result<(), FormError> {
        let mut errors = Vec::new();

        required(&mut errors, "fullname", &self.fullname);

        if required(&mut errors, "username", &self.username) {
            let len = self.username.chars().count();
            if !(3..=64).contains(&len) {
                errors.push(FieldError::new(
                    "username",
                    "Must be between 3 and 64 characters.",
                ));
            }
        }

        if required(&mut errors, "email", &self.email) && !is_valid_email(&self.email) {
            errors.push(FieldError::new("email", "Enter a valid email address."));
        }

        if required(&mut errors, "phone", &self.phone) && !PHONE_RE.is_match(&self.phone) {
            errors.push(FieldError::new("phone", "Enter a valid phone number."));
        }

        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError::new(
                "password",
                format!("Must be at least {MIN_PASSWORD_LEN} characters."),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(FormError(errors))
        }
    }
}

impl LoginForm {
    pub fn normalized(mut self) -> Self {
        self.email = normalize_email(&self.email);
        self
    }

    pub fn validate(&self) -> Result<(), FormError> {
        let mut errors = Vec::new();
        if required(&mut errors, "email", &self.email) && !is_valid_email(&self.email) {
            errors.push(FieldError::new("email", "Enter a valid email address."));
        }
        required(&mut errors, "password", &self.password);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(FormError(errors))
        }
    }
}

/// Only same-site absolute paths are accepted as post-login targets.
///
/// The value ends up in `Location`, so it must be printable ASCII with no
/// whitespace or backslash: browsers drop tabs and newlines, which would turn
/// `/\t/host` into `//host`, and anything else non-visible is not a valid header.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    let next = next?.trim();
    if !next.chars().all(|c| c.is_ascii_graphic() && c != '\\') {
        return None;
    }
    let local = next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains("://");
    local.then_some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_signup() -> SignupForm {
        SignupForm {
            fullname: "Ada Lovelace".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            phone: "+1 (555) 010-0000".into(),
            password: "analytical-engine".into(),
        }
    }

    #[test]
    fn signup_accepts_valid_form() {
        assert!(valid_signup().validate().is_ok());
    }

    #[test]
    fn signup_reports_every_bad_field() {
        let form = SignupForm {
            fullname: "  ".into(),
            username: "ab".into(),
            email: "not-an-email".into(),
            phone: "call me".into(),
            password: "short".into(),
        };
        let err = form.validate().unwrap_err();
        let fields: Vec<_> = err.0.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["fullname", "username", "email", "phone", "password"]);
    }

    #[test]
    fn missing_field_reports_required_once() {
        let form = SignupForm {
            email: String::new(),
            ..valid_signup()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(
            err.0,
            vec![FieldError::new("email", "This field is required.")]
        );
    }

    #[test]
    fn normalized_lowercases_email_and_keeps_password() {
        let form = SignupForm {
            email: "  Ada@Example.COM ".into(),
            password: " spaced pass ".into(),
            ..valid_signup()
        }
        .normalized();
        assert_eq!(form.email, "ada@example.com");
        assert_eq!(form.password, " spaced pass ");
    }

    #[test]
    fn login_requires_password() {
        let form = LoginForm {
            email: "ada@example.com".into(),
            password: String::new(),
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.messages(), vec!["password: This field is required."]);
    }

    #[test]
    fn safe_next_only_allows_local_paths() {
        assert_eq!(safe_next(Some("/calendar?month=5")), Some("/calendar?month=5"));
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(Some("/\\evil.example")), None);
        assert_eq!(safe_next(Some("https://evil.example/")), None);
        assert_eq!(safe_next(Some("/redirect?to=https://x")), None);
        assert_eq!(safe_next(Some("calendar")), None);
        assert_eq!(safe_next(None), None);
    }

    #[test]
    fn safe_next_rejects_control_and_non_header_characters() {
        assert_eq!(safe_next(Some("/\t/evil.example")), None);
        assert_eq!(safe_next(Some("/foo\nbar")), None);
        assert_eq!(safe_next(Some("/foo\r\nSet-Cookie: x=1")), None);
        assert_eq!(safe_next(Some("/\x00")), None);
        assert_eq!(safe_next(Some("/\x7f")), None);
        assert_eq!(safe_next(Some("/a\\b")), None);
        assert_eq!(safe_next(Some("/caf\u{e9}")), None);
        assert_eq!(safe_next(Some("/with space")), None);
        // surrounding whitespace is still trimmed
        assert_eq!(safe_next(Some(" /calendar ")), Some("/calendar"));
    }
}
