pub mod routes;

use serde::{Deserialize, Serialize};

use crate::evaluation::{build_context, EvaluationContext};

// FLAG KEYS (names are part of the contract with flagd)

pub const NEW_BADGE: &str = "new-badge";
pub const CTA_COLOR: &str = "cta-color";
pub const API_NEW_ENDPOINT_ENABLED: &str = "api-new-endpoint-enabled";

pub const NEW_BADGE_DEFAULT: bool = false;
pub const CTA_COLOR_DEFAULT: &str = "blue";
// Gate flag: must stay false so a failed resolution denies access
pub const API_NEW_ENDPOINT_ENABLED_DEFAULT: bool = false;

pub const HELLO_ON: &str = "New feature is ON 🎉 (from backend)";
pub const HELLO_OFF: &str = "New feature is OFF (from backend)";
pub const SECRET: &str = "🍪 super secret data";
pub const FEATURE_DISABLED: &str = "Feature disabled by flag";

// MODELS

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

impl UserQuery {
    pub fn context(&self) -> EvaluationContext {
        build_context(self.user_id.as_deref())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagsResponse {
    pub new_badge: bool,
    pub cta_color: String,
    pub api_new_endpoint_enabled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HelloResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SecretResponse {
    pub secret: String,
}
