//! Credential exchange
//!
//! The control plane hands out a bearer token in exchange for an email and a
//! password. The exchange happens exactly once per [`Client`](crate::Client);
//! there is no refresh and no retry.

use std::env;
use std::fmt;

use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::Profile;
use crate::error::{FireboltError, Result};

/// Environment variable consulted when no email is given explicitly
pub const ENV_FIREBOLT_EMAIL: &str = "FIREBOLT_EMAIL";
/// Environment variable consulted when no password is given explicitly
pub const ENV_FIREBOLT_PASSWORD: &str = "FIREBOLT_PASSWORD";

/// Login credentials. The password never appears in `Debug` output.
#[derive(Clone, Default)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Resolve credentials from the available sources.
    ///
    /// Resolution order for each field:
    /// 1. The explicit value, if given
    /// 2. `FIREBOLT_EMAIL` / `FIREBOLT_PASSWORD`
    /// 3. The selected config profile
    ///
    /// A field found nowhere resolves to an empty string, which the login
    /// step rejects as an authentication failure.
    pub fn resolve(
        email: Option<String>,
        password: Option<String>,
        profile: Option<&Profile>,
    ) -> Self {
        let email = email
            .or_else(|| non_empty_env(ENV_FIREBOLT_EMAIL))
            .or_else(|| profile.and_then(|p| p.email.clone()))
            .unwrap_or_default();
        let password = password
            .or_else(|| non_empty_env(ENV_FIREBOLT_PASSWORD))
            .or_else(|| profile.and_then(|p| p.password.clone()))
            .unwrap_or_default();

        Self { email, password }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.is_empty())
}

/// Opaque bearer token
#[derive(Clone)]
pub struct Token(String);

impl Token {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token value, for building the authorization header
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: Option<String>,
}

/// Exchange credentials for a bearer token.
///
/// `http` must be a client without an authorization header. Every failure,
/// including missing credentials, is reported as
/// [`FireboltError::Authentication`] carrying the email.
pub async fn authenticate(
    http: &reqwest::Client,
    login_url: Url,
    credentials: &Credentials,
) -> Result<Token> {
    let email = credentials.email();
    let fail = |reason: String| FireboltError::Authentication {
        email: email.to_string(),
        reason,
    };

    if email.is_empty() || credentials.password().is_empty() {
        return Err(fail("email and password are both required".to_string()));
    }

    debug!("Requesting access token for {}", email);

    let response = http
        .post(login_url)
        .json(&LoginRequest {
            username: email,
            password: credentials.password(),
        })
        .send()
        .await
        .map_err(|e| fail(format!("login request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(fail(format!("login returned {}", status)));
    }

    let body: LoginResponse = response
        .json()
        .await
        .map_err(|e| fail(format!("malformed login response: {}", e)))?;

    match body.access_token {
        Some(token) if !token.is_empty() => {
            // The token travels in the Authorization header of every later call
            if HeaderValue::from_str(&format!("Bearer {}", token)).is_err() {
                return Err(fail("login response has an unusable access_token".to_string()));
            }
            debug!("Access token issued for {}", email);
            Ok(Token::new(token))
        }
        _ => Err(fail("login response has no access_token".to_string())),
    }
}
