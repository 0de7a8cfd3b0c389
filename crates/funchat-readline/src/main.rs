use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use funchat_application::ChatContext;
use funchat_application::session::format_clock_time;
use funchat_core::ChatError;
use funchat_infrastructure::ConfigService;

mod commands;
mod helper;

use commands::Command;
use helper::CliHelper;

#[derive(Parser)]
#[command(name = "funchat")]
#[command(about = "Funchat - local chat with Gemini-powered bots", long_about = None)]
struct Cli {
    /// Config file (default: ~/.config/funchat/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the chat data
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `funchat_infrastructure=debug`
    #[arg(long)]
    log: Option<String>,
}

/// Logs go to stderr so they do not interleave with chat output.
fn init_tracing(level: &str) {
    let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

/// Interactive front end over a [`ChatContext`].
struct Repl {
    context: ChatContext,
    /// Conversation that receives plain text input
    open: Option<String>,
}

impl Repl {
    fn prompt(&self, name: Option<&str>) -> String {
        match name {
            Some(name) => format!("{name}> "),
            None => "login> ".to_string(),
        }
    }

    /// Runs one command. Returns `false` when the REPL should exit.
    async fn handle(&mut self, command: Command) -> bool {
        let result = match command {
            Command::Quit => return false,
            Command::Help => {
                print_help();
                Ok(())
            }
            Command::Usage(usage) => {
                println!("{}", format!("Usage: {usage}").yellow());
                Ok(())
            }
            Command::Unknown(name) => {
                println!("{}", format!("Unknown command {name}. Type /help.").bright_black());
                Ok(())
            }
            Command::Login { id, name } => self.login(&id, &name).await,
            Command::Logout => self.logout().await,
            Command::List => {
                self.print_conversations().await;
                Ok(())
            }
            Command::Open(index) => self.open_index(index).await,
            Command::New(query) => {
                self.print_contacts(&query).await;
                Ok(())
            }
            Command::Chat(user_id) => self.chat_with(&user_id).await,
            Command::Say(text) => self.say(&text).await,
        };

        if let Err(e) = result {
            report(&e);
        }
        true
    }

    async fn login(&mut self, id: &str, name: &str) -> funchat_core::Result<()> {
        let sign_in = self.context.sign_in(id, name).await?;
        self.open = None;

        let greeting = if sign_in.is_new {
            format!("Welcome, {}! Your bots are waiting.", sign_in.user.name)
        } else {
            format!("Welcome back, {}.", sign_in.user.name)
        };
        println!("{}", greeting.bright_green());
        self.print_conversations().await;
        Ok(())
    }

    async fn logout(&mut self) -> funchat_core::Result<()> {
        self.context.sign_out().await?;
        self.open = None;
        println!("{}", "Signed out. Use /login <id> <name>.".bright_black());
        Ok(())
    }

    async fn print_conversations(&self) {
        let state = self.context.state.read().await;
        if state.current_user().is_none() {
            println!("{}", "Not signed in. Use /login <id> <name>.".yellow());
            return;
        }

        let summaries = state.conversation_summaries();
        if summaries.is_empty() {
            println!("{}", "No conversations yet. Use /new to find someone.".bright_black());
        }
        for (index, summary) in summaries.iter().enumerate() {
            let preview = if summary.sent_by_current_user {
                format!("You: {}", summary.preview)
            } else {
                summary.preview.clone()
            };
            let typing = if self.context.chat.is_typing(&summary.conversation_id) {
                " typing...".italic().to_string()
            } else {
                String::new()
            };
            println!(
                "{} {} {}{}",
                format!("{:>2}.", index + 1).bright_black(),
                summary.contact.name.bold(),
                summary
                    .last_message_time
                    .as_deref()
                    .unwrap_or("")
                    .bright_black(),
                typing
            );
            println!("    {}", preview.bright_black());
        }
    }

    async fn print_contacts(&self, query: &str) {
        let state = self.context.state.read().await;
        if state.current_user().is_none() {
            println!("{}", "Not signed in. Use /login <id> <name>.".yellow());
            return;
        }

        let contacts = state.available_contacts(query);
        if contacts.is_empty() {
            println!("{}", "No users found.".bright_black());
        }
        for user in contacts {
            println!("  {} {}", user.id.cyan(), user.name);
        }
        println!("{}", "Start a chat with /chat <user id>.".bright_black());
    }

    async fn open_index(&mut self, index: usize) -> funchat_core::Result<()> {
        let conversation_id = {
            let state = self.context.state.read().await;
            state
                .conversation_summaries()
                .get(index - 1)
                .map(|s| s.conversation_id.clone())
                .ok_or_else(|| ChatError::not_found("conversation", index.to_string()))?
        };
        self.open_conversation(conversation_id).await;
        Ok(())
    }

    async fn chat_with(&mut self, user_id: &str) -> funchat_core::Result<()> {
        let conversation = self
            .context
            .state
            .write()
            .await
            .open_conversation_with(user_id)?;
        self.open_conversation(conversation.id).await;
        Ok(())
    }

    async fn open_conversation(&mut self, conversation_id: String) {
        let mut state = self.context.state.write().await;
        state.load_messages(&conversation_id);

        let contact = state
            .conversations()
            .iter()
            .find(|c| c.id == conversation_id)
            .and_then(|c| state.contact_for(c))
            .cloned();
        let title = match &contact {
            Some(user) if user.is_bot() => format!("{} (online)", user.name),
            Some(user) => format!("{} (active)", user.name),
            None => conversation_id.clone(),
        };
        println!("{}", format!("=== {title} ===").bright_magenta().bold());

        for message in state.messages_for(&conversation_id) {
            let author = state
                .get_user_by_id(&message.sender_id)
                .map(|u| u.name.clone())
                .unwrap_or_else(|| message.sender_id.clone());
            let time = format_clock_time(message.timestamp).unwrap_or_default();
            let is_mine = state
                .current_user()
                .is_some_and(|u| message.is_from(&u.id));
            let line = format!("[{time}] {author}: {}", message.text);
            if is_mine {
                println!("{}", line.green());
            } else {
                println!("{}", line.bright_blue());
            }
        }

        self.open = Some(conversation_id);
    }

    async fn say(&mut self, text: &str) -> funchat_core::Result<()> {
        let Some(conversation_id) = self.open.clone() else {
            println!("{}", "Open a conversation first (/list, /open, /chat).".yellow());
            return Ok(());
        };

        let is_bot_chat = {
            let state = self.context.state.read().await;
            state
                .conversations()
                .iter()
                .find(|c| c.id == conversation_id)
                .and_then(|c| state.contact_for(c))
                .is_some_and(|u| u.is_bot())
        };
        if is_bot_chat {
            println!("{}", "typing...".bright_black().italic());
        }

        let outcome = self
            .context
            .chat
            .send_message(&self.context.state, &conversation_id, text)
            .await?;

        if let Some(reply) = outcome.reply {
            let state = self.context.state.read().await;
            let author = state
                .get_user_by_id(&reply.sender_id)
                .map(|u| u.name.clone())
                .unwrap_or(reply.sender_id);
            for line in reply.text.lines() {
                println!("{}", format!("{author}: {line}").bright_blue());
            }
        }
        Ok(())
    }
}

fn report(error: &ChatError) {
    if error.is_user_facing() {
        println!("{}", error.to_string().red());
    } else {
        eprintln!("{}", format!("Error: {error}").red());
    }
}

fn print_help() {
    println!("{}", "Commands:".bright_yellow());
    println!("  /login <id> <name>  sign in or sign up");
    println!("  /logout             sign out");
    println!("  /list               list conversations");
    println!("  /open <n>           open conversation n from /list");
    println!("  /new [query]        find users to chat with");
    println!("  /chat <user id>     open a chat with a user");
    println!("  /quit               exit");
    println!("{}", "Anything else is sent to the open conversation.".bright_black());
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ===== Configuration =====
    let config_service = match cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::default_location()?,
    };
    let mut config = config_service.get_effective_config()?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = Some(dir);
    }
    if let Some(level) = cli.log {
        config.logging.level = level;
    }
    init_tracing(&config.logging.level);
    tracing::debug!(
        "[Readline] Using config {} (model {})",
        config_service.path().display(),
        config.responder.model
    );

    // ===== Backend Initialization =====
    let context = ChatContext::from_config(config)?;
    let restored = context.restore_session().await;

    let mut repl = Repl {
        context,
        open: None,
    };

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper));

    println!("{}", "=== Funchat ===".bright_magenta().bold());
    match &restored {
        Some(user) => {
            println!("{}", format!("Signed in as {} ({}).", user.name, user.id).bright_green());
            repl.print_conversations().await;
        }
        None => println!(
            "{}",
            "Sign in with /login <id> <name>. Type /help for commands.".bright_black()
        ),
    }
    println!();

    // ===== Main REPL Loop =====
    loop {
        let name = repl
            .context
            .state
            .read()
            .await
            .current_user()
            .map(|u| u.name.clone());
        let readline = rl.readline(&repl.prompt(name.as_deref()));

        match readline {
            Ok(line) => {
                let Some(command) = commands::parse(&line) else {
                    continue;
                };
                let _ = rl.add_history_entry(line.trim());

                if !repl.handle(command).await {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}
