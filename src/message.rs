// src/message.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientError;

pub const GENERIC_RESPONSE_ERROR: &str = "Error en la respuesta del servidor.";
pub const CONNECTION_ERROR: &str = "No se pudo conectar con el backend.";

/// Body posted to the chat endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub message: String,
}

impl ChatRequest {
    pub fn new(session_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self { session_id: session_id.into(), message: message.into() }
    }
}

/// Success body returned by the chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Failure body returned by the chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn class_name(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

/// One rendered chat entry. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    text: String,
    sender: Sender,
}

impl Message {
    pub fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self { text: text.into(), sender }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// Styling tag, e.g. `message bot`.
    pub fn css_class(&self) -> String {
        format!("message {}", self.sender.class_name())
    }
}

/// How a decoded response body is shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BotReply {
    Reply(String),
    ServerError(String),
    Malformed,
}

impl BotReply {
    /// Reads `reply` first, then `error`. Fields only count when truthy.
    ///
    /// A `null` body has no fields to read and is reported as an error, the
    /// same way an undecodable body is.
    pub fn from_json(body: &Value) -> Result<Self, ClientError> {
        if body.is_null() {
            return Err(ClientError::NullBody);
        }

        if let Some(reply) = body.get("reply").filter(|v| is_truthy(v)) {
            return Ok(BotReply::Reply(display_value(reply)));
        }
        if let Some(error) = body.get("error").filter(|v| is_truthy(v)) {
            return Ok(BotReply::ServerError(display_value(error)));
        }
        Ok(BotReply::Malformed)
    }

    pub fn into_text(self) -> String {
        match self {
            BotReply::Reply(text) => text,
            BotReply::ServerError(error) => format!("Error: {}", error),
            BotReply::Malformed => GENERIC_RESPONSE_ERROR.to_string(),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Renders a value the way browser string conversion would: arrays joined
/// with commas, objects as `[object Object]`, whole floats without `.0`.
fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => f.to_string(),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| if item.is_null() { String::new() } else { display_value(item) })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
