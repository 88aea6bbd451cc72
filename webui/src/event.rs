//! Wire documents and the codec between them and [`Event`]s.
//!
//! A document is a single JSON object carrying one or more commands:
//!
//! ```text
//! {"get": "<name>"}
//! {"set": {"<name>": <value>, ...}}
//! {"select": {"<name>": <value>, ...}}
//! ```
//!
//! Each recognized top-level key yields one independent event.
//! Unrecognized or mis-shaped commands are reported as contained
//! issues; they never fail the whole message.

use serde_json::{Map, Value, json};

use crate::error::UiError;

/// One decoded command.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Request the current value of a named parameter.
    Get(String),
    /// Assign new values, keyed by parameter name.
    Set(Map<String, Value>),
    /// Assign new selections, keyed by parameter name.
    Select(Map<String, Value>),
}

/// Result of decoding one wire document.
#[derive(Debug, Default)]
pub struct Decoded {
    pub events: Vec<Event>,
    /// Contained per-command problems: unknown or mis-shaped commands.
    pub issues: Vec<UiError>,
}

/// Decodes a wire document into events.
///
/// Fails with [`UiError::Parse`] only when the text is not a JSON
/// object at all; the caller drops the message and keeps the
/// connection.
pub fn decode_message(text: &str) -> Result<Decoded, UiError> {
    let document: Value =
        serde_json::from_str(text).map_err(|err| UiError::Parse(err.to_string()))?;
    let Value::Object(commands) = document else {
        return Err(UiError::Parse("top level is not an object".to_string()));
    };

    let mut decoded = Decoded::default();
    for (command, payload) in commands {
        let event = match command.as_str() {
            "get" => match payload {
                Value::String(name) => Some(Event::Get(name)),
                other => {
                    decoded
                        .issues
                        .push(UiError::Parse(format!("bad get payload: {}", other)));
                    None
                }
            },
            "set" => match payload {
                Value::Object(entries) => Some(Event::Set(entries)),
                other => {
                    decoded
                        .issues
                        .push(UiError::Parse(format!("bad set payload: {}", other)));
                    None
                }
            },
            "select" => match payload {
                Value::Object(entries) => Some(Event::Select(entries)),
                other => {
                    decoded
                        .issues
                        .push(UiError::Parse(format!("bad select payload: {}", other)));
                    None
                }
            },
            _ => {
                decoded.issues.push(UiError::UnknownCommand(command.clone()));
                None
            }
        };
        decoded.events.extend(event);
    }
    Ok(decoded)
}

/// Encodes a `set` document for one parameter.
pub fn encode_set(name: &str, value: &Value) -> String {
    let mut entries = Map::new();
    entries.insert(name.to_string(), value.clone());
    json!({ "set": entries }).to_string()
}

/// Encodes a `get` document for one parameter.
pub fn encode_get(name: &str) -> String {
    json!({ "get": name }).to_string()
}
