use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Body of `POST /edit/{sheet_name}/append`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TransactionPayload {
    pub date: Option<String>,
    /// What the money was spent on / came from.
    pub reason: Option<String>,
    /// Signed amount: negative is an expense, positive an income.
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Number>,
    pub currency: Option<String>,
    /// Bank account charged.
    pub account: Option<String>,
    /// When the entry was recorded, `dd.mm.YYYY, HH:MM`. Defaults to now.
    #[serde(rename = "recordedOn")]
    pub recorded_on: Option<String>,
}

/// Envelope returned by the `/edit` routes.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EditResponse {
    pub response_success: bool,
    pub response_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub response_content: Option<serde_json::Value>,
}

impl EditResponse {
    pub fn ok(message: impl Into<String>, content: serde_json::Value) -> Self {
        Self {
            response_success: true,
            response_message: message.into(),
            response_content: Some(content),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            response_success: false,
            response_message: message.into(),
            response_content: None,
        }
    }
}
