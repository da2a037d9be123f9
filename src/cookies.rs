use axum::http::{header, HeaderMap};

/// Returns the value of the first cookie called `name` across all `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

pub fn secure_suffix(secure: bool) -> &'static str {
    if secure {
        "; Secure"
    } else {
        ""
    }
}

/// Builds a `Set-Cookie` value that expires `name` immediately.
pub fn expired_cookie(name: &str, secure: bool) -> String {
    format!(
        "{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
        secure_suffix(secure)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn finds_cookie_among_several() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc.def.ghi; flash=hi"),
        );
        assert_eq!(read_cookie(&headers, "session"), Some("abc.def.ghi"));
        assert_eq!(read_cookie(&headers, "flash"), Some("hi"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn expired_cookie_carries_secure_when_asked() {
        assert_eq!(
            expired_cookie("flash", false),
            "flash=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
        );
        assert_eq!(
            expired_cookie("flash", true),
            "flash=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Secure"
        );
    }

    #[test]
    fn does_not_match_on_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session_old=1"));
        assert_eq!(read_cookie(&headers, "session"), None);
    }

    #[test]
    fn reads_across_multiple_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("b=2"));
        assert_eq!(read_cookie(&headers, "b"), Some("2"));
    }
}
