//! Query submission against an engine endpoint
//!
//! Query text is opaque to the client: it is posted as an octet-stream body
//! with the target database as a query parameter. Both access modes share the
//! same request and failure path and differ only in what they hand back.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};
use url::Url;

use crate::client::Client;
use crate::error::Result;
use crate::transport::{decode_json, parse_url};

/// Column description from the `meta` section of a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
}

/// Decoded result set: `{"meta": [{name, type}], "data": [{col: val}], ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub meta: Vec<ColumnMeta>,
    pub data: Vec<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Value>,
}

impl QueryResult {
    /// Column names in the order the server declared them
    pub fn column_names(&self) -> Vec<&str> {
        self.meta.iter().map(|c| c.name.as_str()).collect()
    }
}

impl Client {
    /// Run a query and return the raw response.
    ///
    /// The body has not been read, so it can be streamed or taken as text.
    pub async fn execute(&self, endpoint: &str, database: &str, query: &str) -> Result<Response> {
        self.submit_query(endpoint, database, query).await
    }

    /// Run a query and decode the response as a [`QueryResult`]
    pub async fn query(&self, endpoint: &str, database: &str, query: &str) -> Result<QueryResult> {
        let response = self.submit_query(endpoint, database, query).await?;
        let result: QueryResult = decode_json(response, "query").await?;
        debug!(
            "Query returned {} column(s), {} row(s)",
            result.meta.len(),
            result.data.len()
        );
        Ok(result)
    }

    async fn submit_query(&self, endpoint: &str, database: &str, query: &str) -> Result<Response> {
        let url = endpoint_url(endpoint, database)?;
        info!("Submitting query to {} (database {})", endpoint, database);

        let builder = self
            .session()
            .request(Method::POST, url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(query.to_string());

        self.session().send(builder).await
    }
}

/// `https://<endpoint>/?database=<db>`.
///
/// An endpoint that already names its scheme is used as the base unchanged.
pub(crate) fn endpoint_url(endpoint: &str, database: &str) -> Result<Url> {
    let endpoint = endpoint.trim_end_matches('/');
    let base = if endpoint.contains("://") {
        format!("{}/", endpoint)
    } else {
        format!("https://{}/", endpoint)
    };

    let mut url = parse_url(&base)?;
    url.query_pairs_mut().append_pair("database", database);
    Ok(url)
}
