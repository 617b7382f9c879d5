//! Backends that turn a flag key and context into a value.

mod flagd;
mod in_memory;

pub use flagd::FlagdProvider;
pub use in_memory::InMemoryProvider;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ResolutionError;
use crate::evaluation::{EvaluationContext, FlagKind, ResolutionDetails};

/// Seam between the flag client and an external evaluation backend.
///
/// Implementations return the backend's raw JSON value; checking it against
/// the requested type and falling back to defaults is the client's job.
#[async_trait]
pub trait FlagProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn resolve(
        &self,
        kind: FlagKind,
        flag_key: &str,
        context: &EvaluationContext,
    ) -> Result<ResolutionDetails<Value>, ResolutionError>;
}
