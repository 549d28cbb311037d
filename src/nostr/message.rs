use serde_json::{json, Value};

use super::event::WireEvent;

/// NIP-01 client -> relay messages. Only publishing is supported.
#[derive(Debug, Clone)]
pub enum ClientMsg {
    Event { event: WireEvent },
}

impl ClientMsg {
    pub fn to_json(&self) -> String {
        match self {
            ClientMsg::Event { event } => json!(["EVENT", event]).to_string(),
        }
    }
}

/// NIP-01 relay -> client messages (subset we need).
#[derive(Debug, Clone, PartialEq)]
pub enum RelayMsg {
    /// ["EVENT", <sub_id>, <event>]
    Event(String, WireEvent),
    /// ["EOSE", <sub_id>]
    Eose(String),
    /// ["NOTICE", <message>]
    Notice(String),
    /// ["OK", <event_id>, <accepted>, <message>]
    Ok {
        event_id: String,
        accepted: bool,
        message: String,
    },
}

impl RelayMsg {
    pub fn to_json(&self) -> String {
        match self {
            RelayMsg::Event(sub_id, event) => json!(["EVENT", sub_id, event]).to_string(),
            RelayMsg::Eose(sub_id) => json!(["EOSE", sub_id]).to_string(),
            RelayMsg::Notice(message) => json!(["NOTICE", message]).to_string(),
            RelayMsg::Ok {
                event_id,
                accepted,
                message,
            } => json!(["OK", event_id, accepted, message]).to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseMsgError {
    #[error("expected JSON array")]
    NotArray,
    #[error("missing command")]
    MissingCommand,
    #[error("command must be string")]
    CommandNotString,
    #[error("unsupported command: {0}")]
    UnsupportedCommand(String),
    #[error("invalid message: {0}")]
    Invalid(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn split_command(text: &str) -> Result<(String, Vec<Value>), ParseMsgError> {
    let v: Value = serde_json::from_str(text)?;
    let Value::Array(arr) = v else {
        return Err(ParseMsgError::NotArray);
    };
    let cmd = arr
        .first()
        .ok_or(ParseMsgError::MissingCommand)?
        .as_str()
        .ok_or(ParseMsgError::CommandNotString)?
        .to_string();
    Ok((cmd, arr))
}

fn string_at(arr: &[Value], index: usize, what: &str) -> Result<String, ParseMsgError> {
    arr.get(index)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| ParseMsgError::Invalid(what.to_string()))
}

pub fn parse_client_msg(text: &str) -> Result<ClientMsg, ParseMsgError> {
    let (cmd, arr) = split_command(text)?;
    match cmd.as_str() {
        "EVENT" => {
            let ev_v = arr
                .get(1)
                .ok_or_else(|| ParseMsgError::Invalid("EVENT missing event".into()))?;
            let event: WireEvent = serde_json::from_value(ev_v.clone())?;
            Ok(ClientMsg::Event { event })
        }
        other => Err(ParseMsgError::UnsupportedCommand(other.to_string())),
    }
}

pub fn parse_relay_msg(text: &str) -> Result<RelayMsg, ParseMsgError> {
    let (cmd, arr) = split_command(text)?;
    match cmd.as_str() {
        "EVENT" => {
            let sub_id = string_at(&arr, 1, "EVENT missing sub_id")?;
            let ev_v = arr
                .get(2)
                .ok_or_else(|| ParseMsgError::Invalid("EVENT missing event".into()))?;
            let event: WireEvent = serde_json::from_value(ev_v.clone())?;
            Ok(RelayMsg::Event(sub_id, event))
        }
        "EOSE" => Ok(RelayMsg::Eose(string_at(&arr, 1, "EOSE missing sub_id")?)),
        "NOTICE" => Ok(RelayMsg::Notice(string_at(&arr, 1, "NOTICE missing message")?)),
        "OK" => {
            let event_id = string_at(&arr, 1, "OK missing event id")?;
            let accepted = arr
                .get(2)
                .and_then(|v| v.as_bool())
                .ok_or_else(|| ParseMsgError::Invalid("OK missing accepted flag".into()))?;
            // some relays omit the message when accepting
            let message = arr
                .get(3)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            Ok(RelayMsg::Ok {
                event_id,
                accepted,
                message,
            })
        }
        other => Err(ParseMsgError::UnsupportedCommand(other.to_string())),
    }
}
