#[cfg(test)]
#[path = "slash_commands_test.rs"]
mod tests;

pub struct SlashCommand {
    command: String,
    pub args: Vec<String>,
}

impl SlashCommand {
    pub fn parse(text: &str) -> Option<SlashCommand> {
        let mut args = text
            .split_whitespace()
            .map(|e| return e.to_string())
            .collect::<Vec<String>>();
        if args.is_empty() {
            return None;
        }
        let prefix = args.remove(0).to_lowercase();

        let cmd = SlashCommand {
            command: prefix,
            args,
        };
        if cmd.is_quit()
            || cmd.is_help()
            || cmd.is_ingest()
            || cmd.is_clear_conversation()
            || cmd.is_knowledge_count()
            || cmd.is_status()
            || cmd.is_forget()
        {
            return Some(cmd);
        }

        return None;
    }

    pub fn is_quit(&self) -> bool {
        return ["/q", "/quit", "/exit"].contains(&self.command.as_str());
    }

    pub fn is_help(&self) -> bool {
        return ["/h", "/help", "/?"].contains(&self.command.as_str());
    }

    pub fn is_ingest(&self) -> bool {
        return ["/i", "/ingest"].contains(&self.command.as_str());
    }

    pub fn is_clear_conversation(&self) -> bool {
        return ["/n", "/new", "/clear"].contains(&self.command.as_str());
    }

    pub fn is_knowledge_count(&self) -> bool {
        return ["/kb", "/knowledge"].contains(&self.command.as_str());
    }

    pub fn is_status(&self) -> bool {
        return ["/s", "/status"].contains(&self.command.as_str());
    }

    pub fn is_forget(&self) -> bool {
        return self.command == "/forget";
    }

    pub fn is_confirmed(&self) -> bool {
        return self.args.first().map(|e| return e.as_str()) == Some("confirm");
    }

    /// First argument, used as the URL for `/ingest`. Empty when missing.
    pub fn argument(&self) -> String {
        return self.args.first().cloned().unwrap_or_default();
    }
}
