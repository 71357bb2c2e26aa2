use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

/// Envelope some backend routes wrap their payload in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub message: Option<String>,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiErrorBody {
    pub message: Option<String>,
    pub code: Option<String>,
    pub details: Option<Value>,
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("{0}")]
    Rejected(String),

    #[error("failed to decode response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decodes a response body that is either wrapped in [`ApiResponse`] or bare.
pub fn decode_api_payload<T: DeserializeOwned>(body: Value) -> Result<T, PayloadError> {
    let is_wrapped = body
        .as_object()
        .is_some_and(|object| object.contains_key("success"));

    if !is_wrapped {
        return Ok(serde_json::from_value(body)?);
    }

    let envelope: ApiResponse<Value> = serde_json::from_value(body)?;

    if !envelope.success {
        return Err(PayloadError::Rejected(
            envelope
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Request was not successful".to_string()),
        ));
    }

    Ok(serde_json::from_value(
        envelope.data.unwrap_or(Value::Null),
    )?)
}
