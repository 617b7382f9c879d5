use crate::client::FlagClient;
use crate::error::ApiError;
use crate::evaluation::EvaluationContext;

/// Treat a boolean flag as an authorization decision for this request.
///
/// Resolution failures fall back to `default`, so passing `false` makes the
/// gate deny whenever the backend cannot answer.
pub async fn require_flag(
    client: &FlagClient,
    flag_key: &str,
    default: bool,
    context: &EvaluationContext,
    detail: &str,
) -> Result<(), ApiError> {
    let allowed = client.resolve_boolean(flag_key, default, context).await;

    if !allowed {
        tracing::info!(
            flag_key,
            targeting_key = context.targeting_key(),
            "request denied by flag gate"
        );
        return Err(ApiError::Forbidden(detail.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::build_context;
    use crate::provider::InMemoryProvider;
    use std::time::Duration;

    fn client(provider: InMemoryProvider) -> FlagClient {
        FlagClient::new("backend", provider, Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_gate_open_when_flag_true() {
        let flags = client(InMemoryProvider::new().with_flag("gate", true));
        let result = require_flag(&flags, "gate", false, &build_context(None), "nope").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_gate_closed_when_flag_false() {
        let flags = client(InMemoryProvider::new().with_flag("gate", false));
        let err = require_flag(&flags, "gate", false, &build_context(None), "nope")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }

    #[tokio::test]
    async fn test_gate_closed_when_flag_unresolvable() {
        let flags = client(InMemoryProvider::new().with_flag("gate", "yes"));
        let ctx = build_context(Some("dave"));
        assert!(require_flag(&flags, "gate", false, &ctx, "nope").await.is_err());
        assert!(require_flag(&flags, "missing", false, &ctx, "nope").await.is_err());
    }
}
