//! Client-to-server frames on the notification socket.
//!
//! Clients may narrow or restore what they receive by sending
//! `{"action": "subscribe" | "unsubscribe", "topic": "..."}`. Every command
//! is answered with an `ack` or an `error` frame.

use serde::{Deserialize, Serialize};
use viewpress_core::job_events::TOPIC_WORKITEM;

/// Topics a client can subscribe to. New connections start on all of them.
pub const KNOWN_TOPICS: &[&str] = &[TOPIC_WORKITEM];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Subscribe,
    Unsubscribe,
}

/// A parsed client command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientCommand {
    pub action: Action,
    pub topic: String,
}

/// Server replies to client commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Reply {
    Ack { action: Action, topic: String },
    Error { message: String },
}

impl Reply {
    pub fn to_text(&self) -> String {
        // A reply is plain strings and enums; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Parse a text frame into a command for a known topic.
pub fn parse_command(text: &str) -> Result<ClientCommand, Reply> {
    let command: ClientCommand = serde_json::from_str(text).map_err(|e| Reply::Error {
        message: format!("unrecognised command: {e}"),
    })?;
    if !KNOWN_TOPICS.contains(&command.topic.as_str()) {
        return Err(Reply::Error {
            message: format!("unknown topic '{}'", command.topic),
        });
    }
    Ok(command)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn subscribe_command_parses() {
        let command =
            parse_command(r#"{"action":"unsubscribe","topic":"Workitem-Notification"}"#).unwrap();
        assert_eq!(command.action, Action::Unsubscribe);
        assert_eq!(command.topic, TOPIC_WORKITEM);
    }

    #[test]
    fn unknown_topic_is_an_error_reply() {
        assert_matches!(
            parse_command(r#"{"action":"subscribe","topic":"Billing"}"#),
            Err(Reply::Error { message }) if message.contains("Billing")
        );
    }

    #[test]
    fn garbage_is_an_error_reply() {
        assert_matches!(parse_command("hello"), Err(Reply::Error { .. }));
    }

    #[test]
    fn replies_are_tagged_by_type() {
        let ack = Reply::Ack {
            action: Action::Subscribe,
            topic: TOPIC_WORKITEM.to_string(),
        };
        let json: serde_json::Value = serde_json::from_str(&ack.to_text()).unwrap();
        assert_eq!(json["type"], "ack");
        assert_eq!(json["action"], "subscribe");
        assert_eq!(json["topic"], "Workitem-Notification");
    }
}
