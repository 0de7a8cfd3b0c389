//! REPL command parsing.

/// Slash commands offered for completion.
pub const COMMANDS: &[&str] = &[
    "/login", "/logout", "/list", "/open", "/new", "/chat", "/help", "/quit",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { id: String, name: String },
    Logout,
    List,
    /// Open a conversation by its 1-based position in `/list`
    Open(usize),
    /// List users to start a chat with, optionally filtered
    New(String),
    /// Open (or create) the conversation with a user id
    Chat(String),
    Help,
    Quit,
    /// Plain text for the open conversation
    Say(String),
    Usage(&'static str),
    Unknown(String),
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if !line.starts_with('/') {
        return Some(match line {
            "quit" | "exit" => Command::Quit,
            _ => Command::Say(line.to_string()),
        });
    }

    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match head {
        "/login" => match rest.split_once(char::is_whitespace) {
            Some((id, name)) if !name.trim().is_empty() => Command::Login {
                id: id.to_string(),
                name: name.trim().to_string(),
            },
            _ => Command::Usage("/login <id> <name>"),
        },
        "/logout" => Command::Logout,
        "/list" => Command::List,
        "/open" => match rest.parse::<usize>() {
            Ok(index) if index > 0 => Command::Open(index),
            _ => Command::Usage("/open <number from /list>"),
        },
        "/new" => Command::New(rest.to_string()),
        "/chat" if !rest.is_empty() => Command::Chat(rest.to_string()),
        "/chat" => Command::Usage("/chat <user id>"),
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(parse("  hello there "), Some(Command::Say("hello there".to_string())));
        assert_eq!(parse("   "), None);
        assert_eq!(parse("exit"), Some(Command::Quit));
    }

    #[test]
    fn test_login_keeps_multi_word_name() {
        assert_eq!(
            parse("/login alice  Alice Liddell"),
            Some(Command::Login {
                id: "alice".to_string(),
                name: "Alice Liddell".to_string()
            })
        );
        assert_eq!(parse("/login alice"), Some(Command::Usage("/login <id> <name>")));
    }

    #[test]
    fn test_open_requires_positive_index() {
        assert_eq!(parse("/open 2"), Some(Command::Open(2)));
        assert!(matches!(parse("/open 0"), Some(Command::Usage(_))));
        assert!(matches!(parse("/open bot-1"), Some(Command::Usage(_))));
    }

    #[test]
    fn test_new_and_chat() {
        assert_eq!(parse("/new"), Some(Command::New(String::new())));
        assert_eq!(parse("/new writer"), Some(Command::New("writer".to_string())));
        assert_eq!(parse("/chat bot-2"), Some(Command::Chat("bot-2".to_string())));
        assert!(matches!(parse("/chat"), Some(Command::Usage(_))));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(parse("/plan"), Some(Command::Unknown("/plan".to_string())));
    }
}
