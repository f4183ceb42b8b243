//! Request plumbing shared by the sub-clients.

use crate::error::{ClientError, Result, Stage};
use crate::types::{ClientConfig, Credentials};
use reqwest::RequestBuilder;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Build the JSON body of an authenticated command.
///
/// Every command carries the same envelope; `extra` adds the
/// command-specific fields on top.
pub(crate) fn command(
    config: &ClientConfig,
    credentials: &Credentials,
    mode: &str,
    extra: Map<String, Value>,
) -> Value {
    let mut body = Map::new();
    body.insert("mode".into(), Value::from(mode));
    body.insert("user_id".into(), Value::from(credentials.user_id.as_str()));
    body.insert("token".into(), Value::from(credentials.token.as_str()));
    body.insert("device_name".into(), Value::from(config.device_name.as_str()));
    body.insert("version".into(), Value::from(config.version.as_str()));
    body.insert("client".into(), Value::from(config.client_name.as_str()));
    body.extend(extra);
    Value::Object(body)
}

/// Send a request and return the body of a successful response.
///
/// 401/403 become `AuthRequired`, other non-success statuses `ServerError`.
pub(crate) async fn send(request: RequestBuilder, stage: Stage) -> Result<String> {
    let response = request.send().await.map_err(|e| {
        if e.is_connect() || e.is_timeout() {
            ClientError::ServerUnreachable {
                stage,
                message: e.to_string(),
            }
        } else {
            ClientError::Network { stage, source: e }
        }
    })?;

    let status = response.status();

    if status.is_success() {
        response
            .text()
            .await
            .map_err(|e| ClientError::Network { stage, source: e })
    } else if status.as_u16() == 401 || status.as_u16() == 403 {
        warn!(stage = %stage, status = %status, "Request rejected as unauthenticated");
        Err(ClientError::AuthRequired { stage })
    } else {
        let error_text = response.text().await.unwrap_or_default();
        Err(ClientError::ServerError {
            stage,
            status: status.as_u16(),
            message: error_text,
        })
    }
}

/// Parse a response body as JSON.
pub(crate) fn parse(body: &str, stage: Stage) -> Result<Value> {
    serde_json::from_str(body)
        .map_err(|e| ClientError::unexpected(stage, format!("invalid JSON: {}", e)))
}

/// The service answers an expired or invalid token with
/// `"authenticated": false` and a 200 status.
pub(crate) fn ensure_authenticated(response: &Value, stage: Stage) -> Result<()> {
    if response.get("authenticated") == Some(&Value::Bool(false)) {
        debug!(stage = %stage, "Service reports session as unauthenticated");
        return Err(ClientError::AuthRequired { stage });
    }
    Ok(())
}

/// Turn `"result": false` into `RemoteRejected`, keeping the service's message.
pub(crate) fn ensure_accepted(response: &Value, stage: Stage) -> Result<()> {
    match response.get("result") {
        Some(Value::Bool(false)) => Err(ClientError::RemoteRejected {
            stage,
            message: message(response),
        }),
        _ => Ok(()),
    }
}

/// Read a string or numeric scalar as text.
pub(crate) fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn message(response: &Value) -> String {
    response
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or("no message given")
        .to_string()
}

/// Refuse undocumented endpoints unless the caller opted in.
pub(crate) fn ensure_undocumented_allowed(
    config: &ClientConfig,
    stage: Stage,
    operation: &'static str,
) -> Result<()> {
    if config.allow_undocumented {
        Ok(())
    } else {
        Err(ClientError::UndocumentedApiDisabled { stage, operation })
    }
}
