use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::ErrorCode;

/// Identity used when a request carries no user id.
pub const ANONYMOUS: &str = "anonymous";

/// Attribute that mirrors the targeting key.
pub const USER_ID_ATTRIBUTE: &str = "userId";

/// Field name flagd reads the targeting key from.
const FLAGD_TARGETING_KEY: &str = "targetingKey";

pub const REASON_ERROR: &str = "ERROR";
pub const REASON_STATIC: &str = "STATIC";

// Identity and attributes sent with every resolution
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationContext {
    targeting_key: String,
    attributes: BTreeMap<String, Value>,
}

impl EvaluationContext {
    /// An empty targeting key is replaced with [`ANONYMOUS`].
    pub fn new(targeting_key: impl Into<String>) -> Self {
        let targeting_key = targeting_key.into();
        let targeting_key = if targeting_key.is_empty() {
            ANONYMOUS.to_string()
        } else {
            targeting_key
        };
        Self {
            targeting_key,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn targeting_key(&self) -> &str {
        &self.targeting_key
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Wire form understood by flagd: the attributes plus `targetingKey`.
    pub fn to_flagd_struct(&self) -> Map<String, Value> {
        let mut fields: Map<String, Value> = self
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        fields.insert(
            FLAGD_TARGETING_KEY.to_string(),
            Value::String(self.targeting_key.clone()),
        );
        fields
    }
}

/// Build the evaluation context for a request's user id.
///
/// Absent or empty ids resolve to `"anonymous"`, which is then a regular
/// identity for bucketing. The id is set both as targeting key and as the
/// `userId` attribute since targeting rules may key off either.
pub fn build_context(user_id: Option<&str>) -> EvaluationContext {
    let uid = user_id.filter(|u| !u.is_empty()).unwrap_or(ANONYMOUS);
    EvaluationContext::new(uid).with_attribute(USER_ID_ATTRIBUTE, uid)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Boolean,
    String,
    Integer,
    Float,
}

impl FlagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagKind::Boolean => "boolean",
            FlagKind::String => "string",
            FlagKind::Integer => "integer",
            FlagKind::Float => "float",
        }
    }
}

/// Rust types a flag can resolve to.
pub trait FlagType: Sized + Clone + Send + 'static {
    const KIND: FlagKind;

    /// `None` when the JSON value does not have this type.
    fn from_json(value: &Value) -> Option<Self>;
}

impl FlagType for bool {
    const KIND: FlagKind = FlagKind::Boolean;

    fn from_json(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FlagType for String {
    const KIND: FlagKind = FlagKind::String;

    fn from_json(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FlagType for i64 {
    const KIND: FlagKind = FlagKind::Integer;

    // int64 travels as a decimal string in Connect JSON
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl FlagType for f64 {
    const KIND: FlagKind = FlagKind::Float;

    fn from_json(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

/// A provider's answer for one flag.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionDetails<T> {
    pub value: T,
    pub variant: Option<String>,
    pub reason: Option<String>,
}

impl<T> ResolutionDetails<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            variant: None,
            reason: None,
        }
    }
}

/// Outcome of a resolve call as seen by the caller. `value` is always set;
/// on failure it is the caller's default and `error_code` says why.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationDetails<T> {
    pub flag_key: String,
    pub value: T,
    pub variant: Option<String>,
    pub reason: Option<String>,
    pub error_code: Option<ErrorCode>,
    pub error_message: Option<String>,
}

impl<T> EvaluationDetails<T> {
    pub fn is_fallback(&self) -> bool {
        self.error_code.is_some()
    }
}
