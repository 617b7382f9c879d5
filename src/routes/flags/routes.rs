use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::ApiError;
use crate::routes::gate::require_flag;
use crate::state::AppState;
use super::{
    FlagsResponse, HelloResponse, SecretResponse, UserQuery, API_NEW_ENDPOINT_ENABLED,
    API_NEW_ENDPOINT_ENABLED_DEFAULT, CTA_COLOR, CTA_COLOR_DEFAULT, FEATURE_DISABLED, HELLO_OFF,
    HELLO_ON, NEW_BADGE, NEW_BADGE_DEFAULT, SECRET,
};

/// Resolve every flag the frontend cares about for one user
pub async fn flags(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Json<FlagsResponse> {
    let ctx = query.context();

    let (new_badge, cta_color, api_new_endpoint_enabled) = tokio::join!(
        state.flags.resolve_boolean(NEW_BADGE, NEW_BADGE_DEFAULT, &ctx),
        state.flags.resolve_string(CTA_COLOR, CTA_COLOR_DEFAULT, &ctx),
        state.flags.resolve_boolean(
            API_NEW_ENDPOINT_ENABLED,
            API_NEW_ENDPOINT_ENABLED_DEFAULT,
            &ctx
        ),
    );

    Json(FlagsResponse {
        new_badge,
        cta_color,
        api_new_endpoint_enabled,
    })
}

pub async fn hello(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Json<HelloResponse> {
    let ctx = query.context();
    let on = state
        .flags
        .resolve_boolean(NEW_BADGE, NEW_BADGE_DEFAULT, &ctx)
        .await;

    let message = if on { HELLO_ON } else { HELLO_OFF };
    Json(HelloResponse {
        message: message.to_string(),
    })
}

/// Only served to users for whom the new endpoint flag is on
pub async fn secret(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<SecretResponse>, ApiError> {
    let ctx = query.context();
    require_flag(
        &state.flags,
        API_NEW_ENDPOINT_ENABLED,
        API_NEW_ENDPOINT_ENABLED_DEFAULT,
        &ctx,
        FEATURE_DISABLED,
    )
    .await?;

    Ok(Json(SecretResponse {
        secret: SECRET.to_string(),
    }))
}
