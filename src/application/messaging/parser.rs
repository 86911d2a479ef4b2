//! Message parser - classifies inbound text by prefix

/// What an inbound message asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// `<prefix><name> [args]`; `name` is empty for a bare prefix
    Command { name: String, args: Option<String> },
    /// `<emote prefix><name>`
    Emote { name: String },
    Text,
}

/// Splits messages on the configured command and emote prefixes
#[derive(Debug, Clone)]
pub struct MessageParser {
    command_prefix: String,
    emote_prefix: String,
}

impl MessageParser {
    pub fn new(command_prefix: impl Into<String>, emote_prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: command_prefix.into(),
            emote_prefix: emote_prefix.into(),
        }
    }

    pub fn command_prefix(&self) -> &str {
        &self.command_prefix
    }

    /// Commands are read from the raw content, emotes from the clean content
    pub fn classify(&self, content: &str, clean_content: &str) -> Inbound {
        if let Some(rest) = content.strip_prefix(self.command_prefix.as_str()) {
            let (name, args) = split_first_word(rest);
            return Inbound::Command {
                name: name.to_string(),
                args: args.map(str::to_string),
            };
        }
        if let Some(rest) = clean_content.strip_prefix(self.emote_prefix.as_str()) {
            return Inbound::Emote {
                name: rest.to_string(),
            };
        }
        Inbound::Text
    }
}

/// `"roll 2d6 + 1"` -> `("roll", Some("2d6 + 1"))`
pub fn split_first_word(text: &str) -> (&str, Option<&str>) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(pos) => {
            let args = text[pos..].trim();
            (&text[..pos], (!args.is_empty()).then_some(args))
        }
        None => (text, None),
    }
}

/// Arguments after the command word, if any
pub fn command_args(content: &str, prefix: &str) -> Option<String> {
    content
        .strip_prefix(prefix)
        .and_then(|rest| split_first_word(rest).1)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> MessageParser {
        MessageParser::new("!", "@")
    }

    #[test]
    fn test_command_with_args() {
        assert_eq!(
            parser().classify("!roll 2d6 +  1 ", "!roll 2d6 +  1 "),
            Inbound::Command {
                name: "roll".to_string(),
                args: Some("2d6 +  1".to_string())
            }
        );
    }

    #[test]
    fn test_command_without_args() {
        assert_eq!(
            parser().classify("!emotes", "!emotes"),
            Inbound::Command {
                name: "emotes".to_string(),
                args: None
            }
        );
    }

    #[test]
    fn test_bare_prefix_has_empty_name() {
        assert_eq!(
            parser().classify("!", "!"),
            Inbound::Command {
                name: String::new(),
                args: None
            }
        );
    }

    #[test]
    fn test_emote_uses_clean_content() {
        assert_eq!(
            parser().classify("<@123> hi", "@shrug"),
            Inbound::Emote {
                name: "shrug".to_string()
            }
        );
        assert_eq!(parser().classify("hello there", "hello there"), Inbound::Text);
    }

    #[test]
    fn test_multi_character_prefix() {
        let parser = MessageParser::new("db!", "@");
        assert_eq!(command_args("db!wiki Rust language", "db!"), Some("Rust language".to_string()));
        assert_eq!(parser.classify("!wiki", "!wiki"), Inbound::Text);
    }

    #[test]
    fn test_split_first_word() {
        assert_eq!(split_first_word("  ask what is 2+2"), ("ask", Some("what is 2+2")));
        assert_eq!(split_first_word("ask   "), ("ask", None));
        assert_eq!(command_args("!count  hello ", "!"), Some("hello".to_string()));
    }
}
