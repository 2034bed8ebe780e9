//! JSON text components used by chat, disconnect and tab-list packets.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatColor {
    Gold,
    Gray,
    Yellow,
    Red,
    White,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextComponent {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ChatColor>,
}

impl TextComponent {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
        }
    }

    pub fn colored(text: impl Into<String>, color: ChatColor) -> Self {
        Self {
            text: text.into(),
            color: Some(color),
        }
    }

    pub fn to_json(&self) -> String {
        // A struct of strings cannot fail to serialize; fall back to an empty component.
        serde_json::to_string(self).unwrap_or_else(|_| String::from(r#"{"text":""}"#))
    }
}
