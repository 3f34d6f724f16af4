//! The Firebolt client
//!
//! Construction performs the credential exchange; everything after that runs
//! on the resulting authenticated [`Session`]. The engine, poller and query
//! operations are implemented in their own modules as `impl Client` blocks.

use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use crate::auth::{self, Credentials};
use crate::error::{FireboltError, Result};
use crate::poller::{PollPolicy, Sleeper, TokioSleeper};
use crate::transport::{Session, parse_url};

/// API origin used when no override is configured
pub const DEFAULT_API_URL: &str = "https://api.app.firebolt.io";

/// User agent string for fireboltctl HTTP requests
pub const FIREBOLTCTL_USER_AGENT: &str = concat!("fireboltctl/", env!("CARGO_PKG_VERSION"));

/// Everything [`Client::connect`] needs, resolved up front by the caller
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// API origin, e.g. `https://api.app.firebolt.io`
    pub api_url: String,
    pub credentials: Credentials,
    /// Attempt budget and interval for [`Client::wait_engine_status`]
    pub poll: PollPolicy,
    pub user_agent: String,
}

impl ClientSettings {
    /// Settings for the public API origin with the default poll policy
    pub fn new(credentials: Credentials) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            credentials,
            poll: PollPolicy::default(),
            user_agent: FIREBOLTCTL_USER_AGENT.to_string(),
        }
    }

    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    #[must_use]
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Authenticated client for the control plane and engine endpoints.
///
/// Holds exactly one bearer token for its whole lifetime. If the token
/// expires, build a new client.
pub struct Client {
    session: Session,
    api_url: Url,
    poll: PollPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl Client {
    /// Authenticate and open the session.
    ///
    /// # Errors
    ///
    /// [`FireboltError::Authentication`](crate::FireboltError::Authentication)
    /// if the credential exchange fails for any reason.
    pub async fn connect(settings: ClientSettings) -> Result<Self> {
        let api_url = parse_url(settings.api_url.trim_end_matches('/'))?;
        debug!("Connecting to {}", api_url);

        let login_http = reqwest::Client::builder()
            .user_agent(&settings.user_agent)
            .build()?;
        let login_url = parse_url(&join(&api_url, "/auth/v1/login"))?;
        let token = auth::authenticate(&login_http, login_url, &settings.credentials).await?;

        let session = Session::new(&token, &settings.user_agent)?;
        info!("Authenticated as {}", settings.credentials.email());

        Ok(Self {
            session,
            api_url,
            poll: settings.poll,
            sleeper: Arc::new(TokioSleeper),
        })
    }

    /// Replace the sleeper used between status observations
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// The authenticated session, for callers that need a raw request
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll
    }

    pub(crate) fn sleeper(&self) -> &dyn Sleeper {
        self.sleeper.as_ref()
    }

    /// URL under the `/core/v1` prefix of the API origin
    pub(crate) fn core_url(&self, path: &str) -> Result<Url> {
        parse_url(&join(&self.api_url, &format!("/core/v1{}", path)))
    }

    /// URL of a single resource under a `/core/v1` collection. `segment` is
    /// percent-encoded as one path segment, so it always names a resource
    /// inside `collection`.
    pub(crate) fn core_resource_url(&self, collection: &str, segment: &str) -> Result<Url> {
        let mut url = self.core_url(collection)?;
        url.path_segments_mut()
            .map_err(|_| FireboltError::unknown(format!("API URL {} has no path", self.api_url)))?
            .push(segment);
        Ok(url)
    }
}

fn join(base: &Url, path: &str) -> String {
    format!("{}{}", base.as_str().trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::{DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL};

    #[test]
    fn test_settings_defaults() {
        let settings = ClientSettings::new(Credentials::new("a@b.c", "pw"));
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.poll.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(settings.poll.interval, DEFAULT_POLL_INTERVAL);
        assert!(settings.user_agent.starts_with("fireboltctl/"));
    }

    #[test]
    fn test_join_handles_trailing_slash() {
        let with_slash = Url::parse("https://api.app.firebolt.io/").unwrap();
        assert_eq!(
            join(&with_slash, "/auth/v1/login"),
            "https://api.app.firebolt.io/auth/v1/login"
        );

        let prefixed = Url::parse("http://127.0.0.1:8080/proxy").unwrap();
        assert_eq!(
            join(&prefixed, "/core/v1/account/engines/e1:start"),
            "http://127.0.0.1:8080/proxy/core/v1/account/engines/e1:start"
        );
    }
}
