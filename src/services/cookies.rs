use crate::error::{Error, Result};

/// Cookie name for the session token
pub const SESSION_COOKIE: &str = "session_token";

/// Cookie security configuration
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct CookieConfig {
    pub name: String,
    /// HttpOnly flag prevents JavaScript access
    pub http_only: bool,
    /// Secure flag ensures HTTPS-only transmission (should be true in production)
    pub secure: bool,
    pub same_site: SameSite,
    pub path: String,
}

/// SameSite cookie attribute for CSRF protection
#[derive(Debug, Clone, Copy, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: SESSION_COOKIE.to_string(),
            http_only: true,
            secure: false,
            same_site: SameSite::Lax,
            path: "/".to_string(),
        }
    }
}

/// Extracts the session token from the Authorization header or the cookie.
///
/// The header wins when both are present.
///
/// ```
/// use reva::services::cookies::extract_session_token;
///
/// let token = extract_session_token(Some("Bearer abc"), Some("cookie")).unwrap();
/// assert_eq!(token, "abc");
/// ```
pub fn extract_session_token(auth_header: Option<&str>, cookie_value: Option<&str>) -> Result<String> {
    if let Some(token) = auth_header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Ok(token.to_string());
    }

    if let Some(cookie) = cookie_value.filter(|c| !c.is_empty()) {
        return Ok(cookie.to_string());
    }

    Err(Error::Authentication(
        "No session token found in Authorization header or cookie".to_string(),
    ))
}

/// Extract a named cookie's value from a `Cookie` header.
pub fn extract_cookie_value(cookie_header: &str, cookie_name: &str) -> Option<String> {
    cookie_header
        .split(';')
        .map(str::trim)
        .find_map(|cookie| {
            cookie
                .split_once('=')
                .filter(|(name, _)| *name == cookie_name)
                .map(|(_, value)| value.to_string())
        })
}

/// Set-Cookie header value carrying the session token.
pub fn build_session_cookie(token: &str, max_age_seconds: u64, config: &CookieConfig) -> String {
    format!(
        "{}={}{}{}; SameSite={}; Path={}; Max-Age={}",
        config.name,
        token,
        if config.http_only { "; HttpOnly" } else { "" },
        if config.secure { "; Secure" } else { "" },
        config.same_site.as_str(),
        config.path,
        max_age_seconds
    )
}

/// Set-Cookie header value that clears the session cookie.
pub fn build_clear_session_cookie(config: &CookieConfig) -> String {
    format!("{}=; HttpOnly; SameSite=Strict; Path={}; Max-Age=0", config.name, config.path)
}
