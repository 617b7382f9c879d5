//! Typed flag resolution with fallback to caller defaults.
//!
//! Every resolve call makes one attempt against the provider, bounded by the
//! client's timeout. Errors, timeouts, unknown flags and values of the wrong
//! type all resolve to the default the caller passed in; they are logged and
//! reported in [`EvaluationDetails`] but never returned as errors.

use std::sync::Arc;
use std::time::Duration;

use crate::error::ResolutionError;
use crate::evaluation::{
    EvaluationContext, EvaluationDetails, FlagType, ResolutionDetails, REASON_ERROR,
};
use crate::provider::FlagProvider;

/// Shared handle to a flag provider. Clones share the same provider.
#[derive(Clone)]
pub struct FlagClient {
    inner: Arc<Inner>,
}

struct Inner {
    name: String,
    provider: Arc<dyn FlagProvider>,
    timeout: Duration,
}

impl FlagClient {
    pub fn new<P>(name: impl Into<String>, provider: P, timeout: Duration) -> Self
    where
        P: FlagProvider + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                provider: Arc::new(provider),
                timeout,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn provider_name(&self) -> &str {
        self.inner.provider.name()
    }

    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    pub async fn resolve_boolean(
        &self,
        flag_key: &str,
        default: bool,
        context: &EvaluationContext,
    ) -> bool {
        self.resolve_boolean_details(flag_key, default, context)
            .await
            .value
    }

    pub async fn resolve_string(
        &self,
        flag_key: &str,
        default: impl Into<String>,
        context: &EvaluationContext,
    ) -> String {
        self.resolve_string_details(flag_key, default, context)
            .await
            .value
    }

    pub async fn resolve_integer(
        &self,
        flag_key: &str,
        default: i64,
        context: &EvaluationContext,
    ) -> i64 {
        self.resolve_integer_details(flag_key, default, context)
            .await
            .value
    }

    pub async fn resolve_float(
        &self,
        flag_key: &str,
        default: f64,
        context: &EvaluationContext,
    ) -> f64 {
        self.resolve_float_details(flag_key, default, context)
            .await
            .value
    }

    pub async fn resolve_boolean_details(
        &self,
        flag_key: &str,
        default: bool,
        context: &EvaluationContext,
    ) -> EvaluationDetails<bool> {
        self.resolve_details(flag_key, default, context).await
    }

    pub async fn resolve_string_details(
        &self,
        flag_key: &str,
        default: impl Into<String>,
        context: &EvaluationContext,
    ) -> EvaluationDetails<String> {
        self.resolve_details(flag_key, default.into(), context).await
    }

    pub async fn resolve_integer_details(
        &self,
        flag_key: &str,
        default: i64,
        context: &EvaluationContext,
    ) -> EvaluationDetails<i64> {
        self.resolve_details(flag_key, default, context).await
    }

    pub async fn resolve_float_details(
        &self,
        flag_key: &str,
        default: f64,
        context: &EvaluationContext,
    ) -> EvaluationDetails<f64> {
        self.resolve_details(flag_key, default, context).await
    }

    async fn resolve_details<T: FlagType>(
        &self,
        flag_key: &str,
        default: T,
        context: &EvaluationContext,
    ) -> EvaluationDetails<T> {
        match self.try_resolve::<T>(flag_key, context).await {
            Ok(resolved) => {
                tracing::debug!(
                    client = %self.inner.name,
                    flag_key,
                    targeting_key = context.targeting_key(),
                    variant = resolved.variant.as_deref(),
                    reason = resolved.reason.as_deref(),
                    "flag resolved"
                );
                EvaluationDetails {
                    flag_key: flag_key.to_string(),
                    value: resolved.value,
                    variant: resolved.variant,
                    reason: resolved.reason,
                    error_code: None,
                    error_message: None,
                }
            }
            Err(err) => {
                tracing::warn!(
                    client = %self.inner.name,
                    provider = self.inner.provider.name(),
                    flag_key,
                    error_code = %err.code(),
                    "flag resolution failed, using default: {}",
                    err
                );
                EvaluationDetails {
                    flag_key: flag_key.to_string(),
                    value: default,
                    variant: None,
                    reason: Some(REASON_ERROR.to_string()),
                    error_code: Some(err.code()),
                    error_message: Some(err.to_string()),
                }
            }
        }
    }

    async fn try_resolve<T: FlagType>(
        &self,
        flag_key: &str,
        context: &EvaluationContext,
    ) -> Result<ResolutionDetails<T>, ResolutionError> {
        let timeout = self.inner.timeout;
        let resolved = tokio::time::timeout(
            timeout,
            self.inner.provider.resolve(T::KIND, flag_key, context),
        )
        .await
        .map_err(|_| ResolutionError::Timeout(timeout))??;

        let value = T::from_json(&resolved.value).ok_or_else(|| {
            ResolutionError::TypeMismatch(format!(
                "{flag_key}: expected {}, got {}",
                T::KIND.as_str(),
                resolved.value
            ))
        })?;

        Ok(ResolutionDetails {
            value,
            variant: resolved.variant,
            reason: resolved.reason,
        })
    }
}
