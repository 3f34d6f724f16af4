//! Authenticated HTTP session
//!
//! Every call the client makes after login goes through a [`Session`]: build
//! the request with [`Session::request`], then hand it to [`Session::send`].
//! The bearer header is a default header of the underlying HTTP client, so no
//! caller can forget it.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::Token;
use crate::error::{FireboltError, RequestError, Result, UnknownError};

/// Long-lived HTTP client carrying the bearer token.
///
/// Built once per [`Client`](crate::Client) and never mutated afterwards.
/// Connections are released when the session is dropped.
#[derive(Debug, Clone)]
pub struct Session {
    http: reqwest::Client,
}

impl Session {
    /// Create a session that attaches `Authorization: Bearer <token>` to every
    /// request it sends
    pub fn new(token: &Token, user_agent: &str) -> Result<Self> {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
            .map_err(|e| FireboltError::unknown(format!("access token is not a valid header: {}", e)))?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self { http })
    }

    /// Start a request through this session
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Send a request built by [`Session::request`].
    ///
    /// Any response with a status of 400 or above becomes a [`RequestError`]
    /// carrying the request line and the response body.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();

        debug!("{} {}", method, url);
        let response = self.http.execute(request).await?;
        let status = response.status();
        trace!("{} {} -> {}", method, url, status);

        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            debug!("{} {} failed with {}: {}", method, url, status, body);
            return Err(RequestError::new(method, url, status, body).into());
        }

        Ok(response)
    }
}

/// Read a response body and decode it as JSON.
///
/// Bodies that do not match `T` are reported as
/// [`UnknownError::Malformed`] naming `context`.
pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response, context: &str) -> Result<T> {
    let body = response.text().await?;
    trace!("{} response body: {}", context, body);

    serde_json::from_str(&body).map_err(|source| {
        UnknownError::Malformed {
            context: context.to_string(),
            source,
        }
        .into()
    })
}

/// Parse a URL, reporting failures as [`UnknownError::InvalidUrl`]
pub(crate) fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|source| {
        UnknownError::InvalidUrl {
            url: raw.to_string(),
            source,
        }
        .into()
    })
}
