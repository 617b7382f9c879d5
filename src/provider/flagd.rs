use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use super::FlagProvider;
use crate::config::Config;
use crate::error::ResolutionError;
use crate::evaluation::{EvaluationContext, FlagKind, ResolutionDetails};

const SERVICE: &str = "flagd.evaluation.v1.Service";
const CONNECT_PROTOCOL_VERSION: &str = "1";

#[derive(Debug, Deserialize)]
struct ResolveResponse {
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    variant: Option<String>,
}

// Connect error body
#[derive(Debug, Deserialize)]
struct ConnectError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Provider backed by a flagd daemon, spoken to over the Connect protocol
/// with JSON bodies. Cheap to share: the inner HTTP client pools connections.
#[derive(Debug, Clone)]
pub struct FlagdProvider {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl FlagdProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(config.flagd_base_url(), config.flagd_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_error(&self, err: reqwest::Error) -> ResolutionError {
        if err.is_timeout() {
            ResolutionError::Timeout(self.timeout)
        } else {
            err.into()
        }
    }

    fn method(kind: FlagKind) -> &'static str {
        match kind {
            FlagKind::Boolean => "ResolveBoolean",
            FlagKind::String => "ResolveString",
            FlagKind::Integer => "ResolveInt",
            FlagKind::Float => "ResolveFloat",
        }
    }

    async fn error_from_response(flag_key: &str, resp: reqwest::Response) -> ResolutionError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();

        match serde_json::from_str::<ConnectError>(&body) {
            Ok(err) if !err.code.is_empty() => map_connect_error(flag_key, err),
            _ => map_status(flag_key, status, body),
        }
    }
}

fn map_connect_error(flag_key: &str, err: ConnectError) -> ResolutionError {
    let detail = format!("{flag_key}: {}", err.message);
    match err.code.as_str() {
        "not_found" => ResolutionError::FlagNotFound(detail),
        "invalid_argument" if err.message.contains("TYPE_MISMATCH") => {
            ResolutionError::TypeMismatch(detail)
        }
        "invalid_argument" => ResolutionError::InvalidContext(detail),
        "unavailable" => ResolutionError::ProviderNotReady(detail),
        other => ResolutionError::General(format!("{detail} (code {other})")),
    }
}

fn map_status(flag_key: &str, status: StatusCode, body: String) -> ResolutionError {
    match status {
        StatusCode::NOT_FOUND => ResolutionError::FlagNotFound(flag_key.to_string()),
        StatusCode::SERVICE_UNAVAILABLE => {
            ResolutionError::ProviderNotReady(format!("flagd returned {status}"))
        }
        _ => ResolutionError::General(format!("flagd returned {status}: {body}")),
    }
}

#[async_trait]
impl FlagProvider for FlagdProvider {
    fn name(&self) -> &str {
        "flagd"
    }

    async fn resolve(
        &self,
        kind: FlagKind,
        flag_key: &str,
        context: &EvaluationContext,
    ) -> Result<ResolutionDetails<Value>, ResolutionError> {
        let url = format!("{}/{}/{}", self.base_url, SERVICE, Self::method(kind));
        let body = json!({
            "flagKey": flag_key,
            "context": Value::Object(context.to_flagd_struct()),
        });

        let resp = self
            .http
            .post(&url)
            .header("Connect-Protocol-Version", CONNECT_PROTOCOL_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if !resp.status().is_success() {
            return Err(Self::error_from_response(flag_key, resp).await);
        }

        let payload: ResolveResponse = resp.json().await.map_err(|e| self.request_error(e))?;
        let value = payload.value.ok_or_else(|| {
            ResolutionError::Parse(format!("{flag_key}: response has no value"))
        })?;

        Ok(ResolutionDetails {
            value,
            variant: payload.variant,
            reason: payload.reason,
        })
    }
}
