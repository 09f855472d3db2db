//! Wire messages for the log socket.
//!
//! Inbound frames are opaque text and are handled by the renderer. The only
//! outbound shape is the command envelope.

use serde::Serialize;

/// Commands sent to the log server.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum ClientCommand {
    /// A user-submitted console command.
    #[serde(rename = "cmd")]
    Cmd(String),
}

impl ClientCommand {
    /// Build a command from raw input. Returns `None` when the input trims
    /// to nothing.
    pub fn from_input(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(ClientCommand::Cmd(trimmed.to_string()))
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ClientCommand::Cmd(text) => text,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_shape() {
        let cmd = ClientCommand::from_input("  status --all \n").unwrap();
        assert_eq!(cmd.text(), "status --all");
        assert_eq!(
            cmd.to_json().unwrap(),
            r#"{"type":"cmd","data":"status --all"}"#
        );
    }

    #[test]
    fn blank_input_is_not_a_command() {
        assert_eq!(ClientCommand::from_input(""), None);
        assert_eq!(ClientCommand::from_input(" \t\r\n "), None);
    }

    #[test]
    fn data_is_json_escaped() {
        let cmd = ClientCommand::from_input(r#"echo "a\b""#).unwrap();
        let value: serde_json::Value = serde_json::from_str(&cmd.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "cmd");
        assert_eq!(value["data"], r#"echo "a\b""#);
    }
}
