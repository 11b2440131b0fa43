use serde::Serialize;
use serde_json::Value;

/// Envelope shared by every `/api/hustle` response.
#[derive(Debug, Serialize)]
pub struct HustleResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HustleResponse {
    pub fn message(message: impl ToString) -> Self {
        Self {
            message: message.to_string(),
            data: None,
            error: None,
        }
    }

    pub fn with_data(message: impl ToString, data: &impl Serialize) -> Self {
        Self {
            message: message.to_string(),
            data: Some(serde_json::json!(data)),
            error: None,
        }
    }

    pub fn error(message: impl ToString, error: impl ToString) -> Self {
        Self {
            message: message.to_string(),
            data: None,
            error: Some(error.to_string()),
        }
    }
}
