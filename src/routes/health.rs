use axum::Json;
use serde::{Deserialize, Serialize};

pub const MODE: &str = "openfeature+flagd-provider";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthData {
    pub status: String,
    pub mode: String,
}

/// Liveness of the facade itself; never consults the flag backend.
pub async fn healthz() -> Json<HealthData> {
    let health_data = HealthData {
        status: "ok".to_string(),
        mode: MODE.to_string(),
    };
    Json(health_data)
}
