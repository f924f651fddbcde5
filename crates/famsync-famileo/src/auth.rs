// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Form login against `/login`.
//!
//! The login page is fetched first to pick up the pre-session cookie and the
//! hidden `_csrf_token` field, then the form is posted with the collected
//! cookies. The cookies set along the way become the [`Session`].

use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::{ACCEPT, COOKIE, HeaderMap, LOCATION, SET_COOKIE};
use tracing::{debug, warn};

use famsync_core::{Credentials, FamsyncError, Session};

use crate::client::FamileoClient;

const LOGIN_PATH: &str = "/login";

static CSRF_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<input[^>]*name=["']_csrf_token["'][^>]*>"#).expect("valid regex")
});

static INPUT_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"value=["']([^"']*)["']"#).expect("valid regex"));

fn auth_error(message: impl Into<String>, source: Option<reqwest::Error>) -> FamsyncError {
    FamsyncError::Auth {
        message: message.into(),
        source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
    }
}

/// Cookies collected across the login exchange, in first-seen order.
#[derive(Debug, Default)]
pub(crate) struct CookieJar {
    cookies: Vec<(String, String)>,
}

impl CookieJar {
    /// Record every `Set-Cookie` in `headers`. Later values replace earlier
    /// ones of the same name; an empty or `deleted` value removes the cookie.
    pub(crate) fn absorb(&mut self, headers: &HeaderMap) {
        for value in headers.get_all(SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            let pair = raw.split(';').next().unwrap_or_default();
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let (name, value) = (name.trim(), value.trim());
            if name.is_empty() {
                continue;
            }
            self.cookies.retain(|(existing, _)| existing != name);
            if !value.is_empty() && value != "deleted" {
                self.cookies.push((name.to_string(), value.to_string()));
            }
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub(crate) fn header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Extract the hidden `_csrf_token` value from a login page, if any.
pub(crate) fn csrf_token(html: &str) -> Option<String> {
    let input = CSRF_INPUT.find(html)?;
    INPUT_VALUE
        .captures(input.as_str())
        .map(|caps| caps[1].to_string())
}

/// True when `html` still shows the login form.
fn shows_login_form(html: &str) -> bool {
    html.contains(r#"name="_password""#) || html.contains("name='_password'")
}

/// True when a redirect `location`, absolute or relative to `base`, targets the login page.
fn redirects_to_login(base: &str, location: &str) -> bool {
    reqwest::Url::parse(base)
        .and_then(|base| base.join(location))
        .is_ok_and(|target| target.path().trim_end_matches('/') == LOGIN_PATH)
}

impl FamileoClient {
    /// Log in with `credentials` and return the resulting session.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, FamsyncError> {
        let mut jar = CookieJar::default();

        let page = self
            .http
            .get(self.url(LOGIN_PATH))
            .header(ACCEPT, "text/html")
            .send()
            .await
            .map_err(|e| auth_error(format!("login page unreachable: {e}"), Some(e)))?;
        if !page.status().is_success() {
            return Err(auth_error(
                format!("login page returned HTTP {}", page.status()),
                None,
            ));
        }
        jar.absorb(page.headers());
        let html = page
            .text()
            .await
            .map_err(|e| auth_error(format!("failed to read login page: {e}"), Some(e)))?;
        let token = csrf_token(&html);
        debug!(csrf = token.is_some(), "login page fetched");

        let mut form = vec![
            ("_username", credentials.login.as_str()),
            ("_password", credentials.password()),
        ];
        if let Some(token) = token.as_deref() {
            form.push(("_csrf_token", token));
        }

        let mut request = self
            .http
            .post(self.url(LOGIN_PATH))
            .header(ACCEPT, "text/html")
            .form(&form);
        if !jar.is_empty() {
            request = request.header(COOKIE, jar.header());
        }
        let response = request
            .send()
            .await
            .map_err(|e| auth_error(format!("login request failed: {e}"), Some(e)))?;
        let status = response.status();
        jar.absorb(response.headers());

        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            if redirects_to_login(self.base_url(), location) {
                warn!(login = %credentials.login, "credentials rejected");
                return Err(auth_error("credentials rejected", None));
            }
        } else if status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if shows_login_form(&body) {
                warn!(login = %credentials.login, "credentials rejected");
                return Err(auth_error("credentials rejected", None));
            }
        } else {
            return Err(auth_error(format!("login returned HTTP {status}"), None));
        }

        if jar.is_empty() {
            return Err(auth_error("no session cookie was set", None));
        }
        Ok(Session::new(jar.header()))
    }
}

#[cfg(test)]
mod tests {
    use famsync_config::model::RemoteConfig;
    use reqwest::header::HeaderValue;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const LOGIN_PAGE: &str = r#"<form method="post" action="/login">
        <input type="email" name="_username">
        <input type="password" name="_password">
        <input type="hidden" name="_csrf_token" value="tok-123">
    </form>"#;

    fn client(server: &MockServer) -> FamileoClient {
        FamileoClient::new(&RemoteConfig {
            base_url: server.uri(),
            ..RemoteConfig::default()
        })
        .unwrap()
    }

    async fn mount_login_page(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "PHPSESSID=pre; path=/; HttpOnly")
                    .set_body_string(LOGIN_PAGE),
            )
            .mount(server)
            .await;
    }

    #[test]
    fn csrf_token_is_found_in_either_attribute_order() {
        assert_eq!(csrf_token(LOGIN_PAGE).as_deref(), Some("tok-123"));
        assert_eq!(
            csrf_token(r#"<input value='abc' type="hidden" name="_csrf_token" />"#).as_deref(),
            Some("abc")
        );
        assert_eq!(csrf_token("<form></form>"), None);
    }

    #[test]
    fn jar_replaces_and_deletes_cookies() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1; path=/"));
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2"));
        headers.append(SET_COOKIE, HeaderValue::from_static("a=3"));
        let mut jar = CookieJar::default();
        jar.absorb(&headers);
        assert_eq!(jar.header(), "b=2; a=3");

        let mut cleared = HeaderMap::new();
        cleared.append(SET_COOKIE, HeaderValue::from_static("b=deleted; expires=Thu, 01 Jan 1970 00:00:00 GMT"));
        jar.absorb(&cleared);
        assert_eq!(jar.header(), "a=3");
    }

    #[test]
    fn only_the_login_path_counts_as_a_bounce() {
        let base = "https://www.famileo.com";
        assert!(redirects_to_login(base, "/login"));
        assert!(redirects_to_login(base, "/login?error=1"));
        assert!(redirects_to_login(base, "https://www.famileo.com/login/"));
        assert!(!redirects_to_login(base, "/login_check"));
        assert!(!redirects_to_login(base, "/home?from=/login"));
        assert!(!redirects_to_login(base, "/"));
    }

    #[tokio::test]
    async fn redirect_to_a_login_like_path_is_accepted() {
        let server = MockServer::start().await;
        mount_login_page(&server).await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", "/home?from=/login")
                    .insert_header("set-cookie", "PHPSESSID=live; path=/"),
            )
            .mount(&server)
            .await;

        let session = client(&server)
            .login(&Credentials::new("jane@example.com", "hunter2"))
            .await
            .unwrap();
        assert_eq!(session.cookie_header(), "PHPSESSID=live");
    }

    #[tokio::test]
    async fn successful_login_returns_session_cookie() {
        let server = MockServer::start().await;
        mount_login_page(&server).await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(header("cookie", "PHPSESSID=pre"))
            .and(body_string_contains("_username=jane%40example.com"))
            .and(body_string_contains("_password=hunter2"))
            .and(body_string_contains("_csrf_token=tok-123"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", "/home")
                    .insert_header("set-cookie", "PHPSESSID=live; path=/"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = client(&server)
            .login(&Credentials::new("jane@example.com", "hunter2"))
            .await
            .unwrap();
        assert_eq!(session.cookie_header(), "PHPSESSID=live");
    }

    #[tokio::test]
    async fn redirect_back_to_login_is_rejected() {
        let server = MockServer::start().await;
        mount_login_page(&server).await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/login"))
            .mount(&server)
            .await;

        let err = client(&server)
            .login(&Credentials::new("jane@example.com", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, FamsyncError::Auth { .. }));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn login_form_in_response_is_rejected() {
        let server = MockServer::start().await;
        mount_login_page(&server).await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
            .mount(&server)
            .await;

        let err = client(&server)
            .login(&Credentials::new("jane@example.com", "wrong"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("credentials rejected"));
    }

    #[tokio::test]
    async fn missing_cookie_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<form></form>"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/home"))
            .mount(&server)
            .await;

        let err = client(&server)
            .login(&Credentials::new("jane@example.com", "hunter2"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no session cookie"));
    }
}
