use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use super::FlagProvider;
use crate::error::ResolutionError;
use crate::evaluation::{EvaluationContext, FlagKind, ResolutionDetails, REASON_STATIC};

/// Fixed flag values held in memory. Ignores the context.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    flags: HashMap<String, Value>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flag(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.flags.insert(key.into(), value.into());
        self
    }
}

#[async_trait]
impl FlagProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn resolve(
        &self,
        _kind: FlagKind,
        flag_key: &str,
        _context: &EvaluationContext,
    ) -> Result<ResolutionDetails<Value>, ResolutionError> {
        let value = self
            .flags
            .get(flag_key)
            .cloned()
            .ok_or_else(|| ResolutionError::FlagNotFound(flag_key.to_string()))?;

        Ok(ResolutionDetails {
            value,
            variant: None,
            reason: Some(REASON_STATIC.to_string()),
        })
    }
}
