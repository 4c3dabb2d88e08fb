use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::error::AppError;

/// How the caller wants `content` stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileContent {
    Json(Value),
    Text(String),
}

impl FileContent {
    pub fn from_request(format: ContentFormat, content: Value) -> Result<Self, AppError> {
        match (format, content) {
            (ContentFormat::Json, value) => Ok(Self::Json(value)),
            (ContentFormat::Text, Value::String(text)) => Ok(Self::Text(text)),
            (ContentFormat::Text, _) => Err(AppError::validation(
                "Text content must be a JSON string",
            )),
        }
    }

    /// Bytes written to disk for this content
    pub fn render(&self) -> Result<String, AppError> {
        match self {
            Self::Json(value) => to_json_with_indent(value, b"    "),
            Self::Text(text) => Ok(text.clone()),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Json(value) => value.clone(),
            Self::Text(text) => Value::String(text.clone()),
        }
    }
}

pub fn to_json_with_indent(value: &Value, indent: &[u8]) -> Result<String, AppError> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent));
    value.serialize(&mut serializer)?;

    String::from_utf8(buf).map_err(|e| AppError::internal(format!("rendered JSON is not UTF-8: {e}")))
}
