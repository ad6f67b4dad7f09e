//! Player-facing message catalog.
//!
//! Messages are keyed strings with `{name}` placeholders. A `[messages]` table in
//! the configuration overrides individual entries; `&` color codes are translated
//! to the section-sign form the game client renders.

use std::collections::HashMap;
use toml::Table;

pub const PREFIX: &str = "prefix";
pub const SPECTATING: &str = "spectating";
pub const SENT_TO_HUB: &str = "sent-to-hub";
pub const TELEPORT_BLOCKED: &str = "teleport-blocked";
pub const TELEPORT_BLOCKED_HUB: &str = "teleport-blocked-hub";

const DEFAULTS: &[(&str, &str)] = &[
    (PREFIX, "&8[&4Hardcore&8]&r "),
    (SPECTATING, "You died in &c{world}&r. You can only spectate there now."),
    (SENT_TO_HUB, "You died in &c{world}&r and were sent back to &a{hub}&r."),
    (TELEPORT_BLOCKED, "You cannot enter &c{world}&r: you already died there."),
    (
        TELEPORT_BLOCKED_HUB,
        "You cannot enter &c{world}&r: you already died there. Returning to &a{hub}&r.",
    ),
];

#[derive(Debug, Clone)]
pub struct MessageCatalog {
    prefix: String,
    messages: HashMap<String, String>,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::from_table(None)
    }
}

impl MessageCatalog {
    /// Built-in messages with any string entries of `overrides` applied.
    pub fn from_table(overrides: Option<&Table>) -> Self {
        let mut messages: HashMap<String, String> = DEFAULTS
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        if let Some(table) = overrides {
            for (key, value) in table {
                if let Some(text) = value.as_str() {
                    messages.insert(key.clone(), text.to_string());
                }
            }
        }

        let prefix = messages.remove(PREFIX).map(|p| colorize(&p)).unwrap_or_default();
        Self { prefix, messages }
    }

    /// The message for `key`, or the key itself when it is unknown.
    pub fn get(&self, key: &str) -> String {
        self.format(key, &[])
    }

    pub fn format(&self, key: &str, placeholders: &[(&str, &str)]) -> String {
        let mut text = self
            .messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string());
        for (name, value) in placeholders {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        format!("{}{}", self.prefix, colorize(&text))
    }
}

/// Translates `&x` color and format codes into `§x`.
fn colorize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(&code) if c == '&' && is_format_code(code) => {
                out.push('§');
                out.push(code);
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

fn is_format_code(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), '0'..='9' | 'a'..='f' | 'k'..='o' | 'r')
}
