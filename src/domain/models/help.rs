#[cfg(test)]
#[path = "help_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;
use serde_json::Map;
use serde_json::Value;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /ingest (/i) [URL] - Crawls the URL (two levels deep) into Zark's knowledge base.
- /knowledge (/kb) - Refreshes the knowledge base entry count.
- /status (/s) - Re-checks the health and operating mode of the Zark API.
- /clear /new (/n) - Starts a new conversation. The current transcript is discarded.
- /forget confirm - Deletes every entry in the knowledge base.
- /help (/h) - Toggles this help overlay.
- /quit /exit (/q) - Exit Zark.

HOTKEYS:
- Up arrow - Scroll up
- Down arrow - Scroll down
- CTRL+U - Page up
- CTRL+D - Page down
- F1 - Toggle the help overlay
- ESC - Close the help overlay or the current notice
- CTRL+C - Exit.

SOURCES:
Zark only lists the pages an answer was built from when you ask for them. Mention a source, reference, link, url or website in your message, or ask "where did you get" something.
        "#;

    return text.trim().to_string();
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub online_mode: Value,
    #[serde(default)]
    pub offline_mode: Value,
}

/// Capabilities and usage document published by the Zark API.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HelpDocument {
    #[serde(default)]
    pub api_status: String,
    #[serde(default)]
    pub knowledge_entries: u64,
    #[serde(default)]
    pub capabilities: Capabilities,
    #[serde(default)]
    pub how_to_use: Map<String, Value>,
    #[serde(default)]
    pub setup_instructions: Map<String, Value>,
}

fn humanize(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => return format!("{}{}", first.to_uppercase(), chars.as_str()),
        None => return spaced,
    }
}

fn value_lines(value: &Value) -> Vec<String> {
    match value {
        Value::Null => return vec![],
        Value::String(text) => return text.lines().map(|e| return e.to_string()).collect(),
        Value::Array(items) => {
            return items
                .iter()
                .flat_map(|item| return value_lines(item))
                .map(|line| return format!("- {line}"))
                .collect();
        }
        Value::Object(map) => return map_lines(map),
        other => return vec![other.to_string()],
    }
}

fn entry_lines(key: &str, value: &Value) -> Vec<String> {
    let title = humanize(key);
    let lines = value_lines(value);
    if lines.len() == 1 && !lines[0].starts_with("- ") {
        return vec![format!("{title}: {}", lines[0])];
    }

    let mut res = vec![format!("{title}:")];
    res.extend(lines.iter().map(|line| return format!("  {line}")));
    return res;
}

fn map_lines(map: &Map<String, Value>) -> Vec<String> {
    return map
        .iter()
        .flat_map(|(key, value)| return entry_lines(key, value))
        .collect();
}

impl HelpDocument {
    pub fn as_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("API status: {}", self.api_status),
            format!("Knowledge entries: {}", self.knowledge_entries),
            "".to_string(),
            "CAPABILITIES:".to_string(),
        ];
        lines.extend(entry_lines("online_mode", &self.capabilities.online_mode));
        lines.extend(entry_lines("offline_mode", &self.capabilities.offline_mode));

        if !self.how_to_use.is_empty() {
            lines.push("".to_string());
            lines.push("HOW TO USE:".to_string());
            lines.extend(map_lines(&self.how_to_use));
        }

        if !self.setup_instructions.is_empty() {
            lines.push("".to_string());
            lines.push("SETUP:".to_string());
            lines.extend(map_lines(&self.setup_instructions));
        }

        return lines;
    }
}

/// Contents of the help overlay: whatever the service returned for this
/// opening, followed by the client's own command reference.
#[derive(Clone, Debug, PartialEq)]
pub struct HelpView {
    pub document: Option<HelpDocument>,
    pub error: Option<String>,
}

impl HelpView {
    pub fn as_lines(&self) -> Vec<String> {
        let mut lines = vec![];
        if let Some(document) = &self.document {
            lines.extend(document.as_lines());
        }
        if let Some(err) = &self.error {
            lines.push(format!("The Zark API help is unavailable right now: {err}"));
        }

        lines.push("".to_string());
        lines.extend(help_text().lines().map(|e| return e.to_string()));

        return lines;
    }
}
