//! Engine descriptors and the directory/lifecycle calls
//!
//! Engines are never cached: every call here goes back to the control plane,
//! and the poller relies on that to observe fresh status values.

use std::fmt;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::client::Client;
use crate::error::{FireboltError, Result};
use crate::transport::decode_json;

/// Wire value reported while a new engine revision is booting
pub const ENGINE_STATUS_STARTING: &str = "ENGINE_STATUS_RUNNING_REVISION_STARTING";
/// Wire value reported once the engine serves queries
pub const ENGINE_STATUS_RUNNING: &str = "ENGINE_STATUS_RUNNING_REVISION_SERVING";
/// Wire value reported for an engine with no running revision
pub const ENGINE_STATUS_IDLE: &str = "ENGINE_STATUS_RUNNING_IDLE";

/// Current status of an engine as reported by the control plane.
///
/// Statuses other than the three the client knows about are kept verbatim in
/// [`EngineStatus::Other`], so equality is always equality of the raw string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EngineStatus {
    Starting,
    Running,
    Idle,
    Other(String),
}

impl EngineStatus {
    /// Map a raw status string onto a known variant, or keep it as-is
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            ENGINE_STATUS_STARTING => EngineStatus::Starting,
            ENGINE_STATUS_RUNNING => EngineStatus::Running,
            ENGINE_STATUS_IDLE => EngineStatus::Idle,
            other => EngineStatus::Other(other.to_string()),
        }
    }

    /// The raw status string as it appears on the wire
    pub fn as_str(&self) -> &str {
        match self {
            EngineStatus::Starting => ENGINE_STATUS_STARTING,
            EngineStatus::Running => ENGINE_STATUS_RUNNING,
            EngineStatus::Idle => ENGINE_STATUS_IDLE,
            EngineStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for EngineStatus {
    fn from(raw: String) -> Self {
        EngineStatus::from_raw(&raw)
    }
}

impl From<&str> for EngineStatus {
    fn from(raw: &str) -> Self {
        EngineStatus::from_raw(raw)
    }
}

impl From<EngineStatus> for String {
    fn from(status: EngineStatus) -> Self {
        match status {
            EngineStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-assigned engine identity.
///
/// The control plane reports ids either as a bare string or scoped to an
/// account as `{"account_id": ..., "engine_id": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EngineKey {
    Plain(String),
    Scoped {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        account_id: Option<String>,
        engine_id: String,
    },
}

impl EngineKey {
    pub fn engine_id(&self) -> &str {
        match self {
            EngineKey::Plain(id) => id,
            EngineKey::Scoped { engine_id, .. } => engine_id,
        }
    }
}

/// Engine descriptor returned by describe and lifecycle calls.
///
/// Fields the client does not interpret are kept in `extra` and serialized
/// back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EngineKey>,
    #[serde(default)]
    pub name: String,
    pub current_status: EngineStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Engine {
    /// Minimal descriptor with only a name and a status
    pub fn with_status(name: impl Into<String>, status: EngineStatus) -> Self {
        Self {
            id: None,
            name: name.into(),
            current_status: status,
            endpoint: None,
            extra: Map::new(),
        }
    }

    /// The engine id, if the server reported one
    pub fn engine_id(&self) -> Option<&str> {
        self.id.as_ref().map(EngineKey::engine_id)
    }

    /// The query endpoint, treating an empty string as absent
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref().filter(|e| !e.is_empty())
    }
}

/// Lifecycle transitions that can be requested for an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineAction {
    Start,
    Stop,
    Restart,
}

impl EngineAction {
    /// Custom-method suffix used in the lifecycle URL (`engines/{id}:start`)
    pub fn verb(&self) -> &'static str {
        match self {
            EngineAction::Start => "start",
            EngineAction::Stop => "stop",
            EngineAction::Restart => "restart",
        }
    }
}

impl fmt::Display for EngineAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

#[derive(Debug, Deserialize)]
struct EngineEnvelope {
    engine: Engine,
}

#[derive(Debug, Deserialize)]
struct EngineIdEnvelope {
    engine_id: EngineKey,
}

impl Client {
    /// Resolve an engine name to its id.
    ///
    /// A name the server does not know comes back as a 404 and is returned as
    /// a client-side [`RequestError`](crate::RequestError).
    pub async fn get_engine_id(&self, engine_name: &str) -> Result<String> {
        debug!("Resolving engine id for '{}'", engine_name);

        let mut url = self.core_url("/account/engines:getIdByName")?;
        url.query_pairs_mut().append_pair("engine_name", engine_name);

        let response = self
            .session()
            .send(self.session().request(Method::GET, url))
            .await?;
        let envelope: EngineIdEnvelope = decode_json(response, "engines:getIdByName").await?;

        let engine_id = envelope.engine_id.engine_id().to_string();
        debug!("Engine '{}' has id {}", engine_name, engine_id);
        Ok(engine_id)
    }

    /// Fetch the current descriptor for an engine
    pub async fn describe_engine(&self, engine_id: &str) -> Result<Engine> {
        check_engine_id(engine_id)?;
        let url = self.core_resource_url("/account/engines", engine_id)?;

        let response = self
            .session()
            .send(self.session().request(Method::GET, url))
            .await?;
        let envelope: EngineEnvelope = decode_json(response, "engines describe").await?;

        debug!(
            "Engine {} is {}",
            engine_id, envelope.engine.current_status
        );
        Ok(envelope.engine)
    }

    /// Ask the control plane to start an engine
    pub async fn start_engine(&self, engine_id: &str) -> Result<Engine> {
        self.engine_lifecycle(engine_id, EngineAction::Start).await
    }

    /// Ask the control plane to stop an engine
    pub async fn stop_engine(&self, engine_id: &str) -> Result<Engine> {
        self.engine_lifecycle(engine_id, EngineAction::Stop).await
    }

    /// Ask the control plane to restart an engine
    pub async fn restart_engine(&self, engine_id: &str) -> Result<Engine> {
        self.engine_lifecycle(engine_id, EngineAction::Restart).await
    }

    /// Issue a lifecycle command and return the descriptor the server reports
    /// right after accepting it. The transition itself is asynchronous.
    pub async fn engine_lifecycle(&self, engine_id: &str, action: EngineAction) -> Result<Engine> {
        info!("Requesting {} for engine {}", action, engine_id);

        check_engine_id(engine_id)?;
        let url = self.core_resource_url(
            "/account/engines",
            &format!("{}:{}", engine_id, action.verb()),
        )?;

        let response = self
            .session()
            .send(self.session().request(Method::POST, url))
            .await?;
        let envelope: EngineEnvelope = decode_json(response, "engines lifecycle").await?;

        debug!(
            "Engine {} reported {} after {}",
            engine_id, envelope.engine.current_status, action
        );
        Ok(envelope.engine)
    }
}

/// Reject ids that cannot name a single engine resource. Anything else is
/// percent-encoded into the path.
fn check_engine_id(engine_id: &str) -> Result<()> {
    if engine_id.is_empty() || engine_id == "." || engine_id == ".." {
        return Err(FireboltError::unknown(format!(
            "invalid engine id '{}'",
            engine_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_known_statuses_round_trip_through_wire_values() {
        assert_eq!(EngineStatus::from_raw(ENGINE_STATUS_STARTING), EngineStatus::Starting);
        assert_eq!(EngineStatus::from_raw(ENGINE_STATUS_RUNNING), EngineStatus::Running);
        assert_eq!(EngineStatus::from_raw(ENGINE_STATUS_IDLE), EngineStatus::Idle);
        assert_eq!(EngineStatus::Running.as_str(), ENGINE_STATUS_RUNNING);
    }

    #[test]
    fn test_unknown_status_is_kept_verbatim() {
        let status = EngineStatus::from_raw("ENGINE_STATUS_FAILED");
        assert_eq!(status, EngineStatus::Other("ENGINE_STATUS_FAILED".to_string()));
        assert_eq!(status.to_string(), "ENGINE_STATUS_FAILED");
        assert_ne!(status, EngineStatus::Running);
    }

    #[test]
    fn test_engine_deserializes_scoped_id_and_keeps_extra_fields() {
        let engine: Engine = serde_json::from_value(json!({
            "id": {"account_id": "acc-1", "engine_id": "eng-1"},
            "name": "analytics",
            "current_status": ENGINE_STATUS_RUNNING,
            "endpoint": "analytics.acc.us-east-1.app.firebolt.io",
            "description": "nightly ETL",
            "settings": {"preset": "ENGINE_SETTINGS_PRESET_GENERAL_PURPOSE"}
        }))
        .unwrap();

        assert_eq!(engine.engine_id(), Some("eng-1"));
        assert_eq!(engine.current_status, EngineStatus::Running);
        assert_eq!(
            engine.endpoint(),
            Some("analytics.acc.us-east-1.app.firebolt.io")
        );
        assert_eq!(engine.extra["description"], json!("nightly ETL"));

        let back = serde_json::to_value(&engine).unwrap();
        assert_eq!(back["current_status"], json!(ENGINE_STATUS_RUNNING));
        assert_eq!(back["settings"]["preset"], json!("ENGINE_SETTINGS_PRESET_GENERAL_PURPOSE"));
    }

    #[test]
    fn test_engine_accepts_plain_id_and_empty_endpoint() {
        let engine: Engine = serde_json::from_value(json!({
            "id": "eng-2",
            "name": "reporting",
            "current_status": ENGINE_STATUS_IDLE,
            "endpoint": ""
        }))
        .unwrap();

        assert_eq!(engine.engine_id(), Some("eng-2"));
        assert_eq!(engine.endpoint(), None);
    }

    #[test]
    fn test_engine_without_status_is_rejected() {
        let result = serde_json::from_value::<Engine>(json!({"name": "broken"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_dot_and_empty_engine_ids_are_rejected() {
        for id in ["", ".", ".."] {
            let err = check_engine_id(id).unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::Unknown);
        }
        assert!(check_engine_id("eng-1").is_ok());
        assert!(check_engine_id("a/b").is_ok());
    }

    #[test]
    fn test_action_verbs() {
        assert_eq!(EngineAction::Start.verb(), "start");
        assert_eq!(EngineAction::Stop.verb(), "stop");
        assert_eq!(EngineAction::Restart.to_string(), "restart");
    }
}
