use http::header::COOKIE;
use http::HeaderMap;

/// Cookie names used for the two token cookies.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Access token cookie lifetime (1 hour).
pub const ACCESS_TOKEN_MAX_AGE_SECS: u64 = 3600;
/// Refresh token cookie lifetime (30 days).
pub const REFRESH_TOKEN_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;

/// SameSite cookie policy.
#[derive(Clone, Copy, Debug, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    /// Convert to cookie attribute string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        }
    }
}

/// Extract the value of a named cookie from the request headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie_header = headers.get(COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((cookie_name, value)) = cookie.split_once('=') {
            if cookie_name.trim() == name {
                return Some(value.trim().to_string());
            }
        }
    }

    None
}

/// Format a Set-Cookie value for a token cookie. Token cookies are
/// host-wide, HTTP-only, HTTPS-only and SameSite=Lax.
pub fn auth_cookie(name: &str, value: &str, max_age_secs: u64) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; SameSite={}; HttpOnly; Secure",
        name,
        value,
        max_age_secs,
        SameSite::Lax.as_str()
    )
}
