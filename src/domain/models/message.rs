#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use chrono::Local;

use crate::configuration::Config;
use crate::configuration::ConfigKey;

static LAST_ID: AtomicI64 = AtomicI64::new(0);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MessageKind {
    User,
    Bot,
    Error,
}

impl MessageKind {
    pub fn author(&self) -> String {
        match self {
            MessageKind::User => return Config::get(ConfigKey::Username),
            MessageKind::Bot | MessageKind::Error => return String::from("Zark"),
        }
    }
}

/// Millisecond timestamp, bumped past the last issued id so two messages
/// created within the same millisecond still order correctly.
fn next_id() -> i64 {
    let now = Local::now().timestamp_millis();
    let mut last = LAST_ID.load(Ordering::Relaxed);
    loop {
        let candidate = if now > last { now } else { last + 1 };
        match LAST_ID.compare_exchange_weak(last, candidate, Ordering::Relaxed, Ordering::Relaxed)
        {
            Ok(_) => return candidate,
            Err(current) => last = current,
        }
    }
}

/// A single transcript entry. Messages are immutable once created.
#[derive(Clone, Debug)]
pub struct Message {
    id: i64,
    kind: MessageKind,
    content: String,
    sources: Vec<String>,
    timestamp: String,
}

impl Message {
    fn build(kind: MessageKind, content: &str, sources: Vec<String>) -> Message {
        return Message {
            id: next_id(),
            kind,
            content: content.to_string().replace('\t', "  "),
            sources,
            timestamp: Local::now().format("%H:%M:%S").to_string(),
        };
    }

    pub fn user(content: &str) -> Message {
        return Message::build(MessageKind::User, content, vec![]);
    }

    pub fn bot(content: &str, sources: Vec<String>) -> Message {
        let sources = sources
            .into_iter()
            .map(|source| return source.trim().to_string())
            .filter(|source| return !source.is_empty())
            .collect();

        return Message::build(MessageKind::Bot, content, sources);
    }

    pub fn error(content: &str) -> Message {
        return Message::build(MessageKind::Error, content, vec![]);
    }

    pub fn id(&self) -> i64 {
        return self.id;
    }

    pub fn kind(&self) -> MessageKind {
        return self.kind;
    }

    pub fn content(&self) -> &str {
        return &self.content;
    }

    pub fn sources(&self) -> &[String] {
        return &self.sources;
    }

    pub fn timestamp(&self) -> &str {
        return &self.timestamp;
    }

    pub fn label(&self) -> String {
        return format!("{} ({})", self.kind.author(), self.timestamp);
    }

    /// Content as rendered in a bubble, with any citations listed underneath.
    pub fn display_text(&self) -> String {
        if self.sources.is_empty() {
            return self.content.to_string();
        }

        let sources = self
            .sources
            .iter()
            .map(|source| return format!("- {source}"))
            .collect::<Vec<String>>()
            .join("\n");

        return format!("{}\n\nSources:\n{sources}", self.content);
    }
}
