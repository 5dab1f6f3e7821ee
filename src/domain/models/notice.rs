#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Alert-style message shown in a popup, outside the conversation transcript.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: &str) -> Notice {
        return Notice {
            level: NoticeLevel::Info,
            text: text.to_string(),
        };
    }

    pub fn error(text: &str) -> Notice {
        return Notice {
            level: NoticeLevel::Error,
            text: text.to_string(),
        };
    }
}
