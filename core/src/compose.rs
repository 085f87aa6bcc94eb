//! URL and header composition.
//!
//! Pure functions: a `RequestDescriptor`, the `ClientConfig` and the current
//! personal user go in, a ready-to-send `HttpRequest` comes out.

use url::form_urlencoded;

use crate::config::ClientConfig;
use crate::http::{find_header, HttpRequest, RequestDescriptor};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
pub const USER_AGENT: &str = "User-Agent";

/// Path prefixes whose resources are scoped to the personal user.
///
/// Matching is a plain string prefix test, so `/users/me` and `/usersXYZ`
/// both count.
pub const PERSONAL_PREFIXES: &[&str] = &["/overview", "/timer", "/time_entries", "/absences", "/users"];

pub fn is_personal_path(path: &str) -> bool {
    PERSONAL_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// Builds the full URL for `path`, adding `user_id` for personal paths while
/// a personal user is set. An empty user id counts as unset.
pub fn compose_url(config: &ClientConfig, path: &str, personal_user: Option<&str>) -> String {
    let mut url = format!("{}{path}", config.base_url());
    if let Some(user_id) = personal_user.filter(|u| !u.is_empty() && is_personal_path(path)) {
        let pair = form_urlencoded::Serializer::new(String::new())
            .append_pair("user_id", user_id)
            .finish();
        url.push(if path.contains('?') { '&' } else { '?' });
        url.push_str(&pair);
    }
    url
}

/// Applies the default headers on top of the caller's.
pub fn compose_headers(config: &ClientConfig, mut headers: Vec<(String, String)>) -> Vec<(String, String)> {
    if find_header(&headers, CONTENT_TYPE).is_none() {
        headers.push((CONTENT_TYPE.to_string(), "application/json".to_string()));
    }
    if find_header(&headers, AUTH_TOKEN_HEADER).is_none() {
        headers.push((AUTH_TOKEN_HEADER.to_string(), config.auth_token().to_string()));
    }
    if let Some(user_agent) = config.user_agent() {
        headers.retain(|(k, _)| !k.eq_ignore_ascii_case(USER_AGENT));
        headers.push((USER_AGENT.to_string(), user_agent.to_string()));
    }
    headers
}

pub fn compose(config: &ClientConfig, descriptor: RequestDescriptor, personal_user: Option<&str>) -> HttpRequest {
    HttpRequest {
        url: compose_url(config, &descriptor.path, personal_user),
        method: descriptor.method,
        headers: compose_headers(config, descriptor.headers),
        body: descriptor.body,
    }
}
