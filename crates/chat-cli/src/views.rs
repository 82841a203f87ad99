//! Views - pure renderers over a store snapshot
//!
//! Each function returns the text to print; nothing here touches the store.

use chat_core::{Conversation, Message};
use chat_state::ReplyState;
use chrono::{DateTime, Local, Utc};
use colored::Colorize;

/// `MMM d, yyyy` in local time, as shown in the conversation list.
pub fn format_day(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%b %-d, %Y")
        .to_string()
}

/// `HH:MM` in local time, as shown under each message.
pub fn format_time(timestamp: &DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M").to_string()
}

/// Conversation list with the active entry highlighted.
pub fn render_conversation_list(conversations: &[Conversation], active_id: &str) -> String {
    let mut out = format!("{}\n", "Conversation History".bold());

    for (i, conversation) in conversations.iter().enumerate() {
        let is_active = conversation.id == active_id;
        let marker = if is_active { "▸" } else { " " };
        let title = if is_active {
            conversation.display_title().blue().bold()
        } else {
            conversation.display_title().normal()
        };
        let mut line = format!(
            "{} {:>2}. {}  {}",
            marker,
            i + 1,
            title,
            format_day(&conversation.timestamp).dimmed()
        );
        // only titled conversations offer renaming
        if conversation.title.is_some() {
            line.push_str(&format!("  {}", format!("/rename {}", i + 1).dimmed()));
        }
        out.push_str(&line);
        out.push('\n');
    }

    out
}

fn render_message(position: usize, message: &Message) -> String {
    let author = if message.is_user {
        "You".cyan().bold()
    } else if message.is_error {
        "Assistant ⚠".red().bold()
    } else {
        "Assistant".green().bold()
    };

    let mut header = format!("{} {}", author, format_time(&message.timestamp).dimmed());
    if message.is_code {
        header.push_str(&format!("  {}", format!("[/copy {}]", position).dimmed()));
    }

    let body: String = message
        .text
        .lines()
        .map(|line| {
            let line = if message.is_error {
                line.red().to_string()
            } else {
                line.to_string()
            };
            format!("  {}\n", line)
        })
        .collect();

    format!("{}\n{}", header, body)
}

/// The trailing `window` messages of a conversation, oldest first.
pub fn render_thread(conversation: &Conversation, window: usize) -> String {
    let mut out = format!(
        "{} {}\n",
        "──".dimmed(),
        conversation.display_title().bold()
    );

    let total = conversation.messages.len();
    let skip = total.saturating_sub(window.max(1));
    if skip > 0 {
        out.push_str(&format!(
            "{}\n",
            format!("… {} earlier messages", skip).dimmed()
        ));
    }

    for (i, message) in conversation.messages.iter().enumerate().skip(skip) {
        out.push_str(&render_message(i + 1, message));
    }

    out
}

/// A single newly arrived message.
pub fn render_new_message(conversation: &Conversation) -> String {
    match conversation.messages.last() {
        Some(message) => render_message(conversation.messages.len(), message),
        None => String::new(),
    }
}

/// One-line status under the thread.
pub fn render_status(state: &ReplyState) -> String {
    match state {
        ReplyState::Idle => "Type a message, or /help for commands".dimmed().to_string(),
        ReplyState::Pending { .. } => format!("⏳ {}…", state.description())
            .yellow()
            .to_string(),
    }
}

pub fn render_help() -> String {
    [
        "Commands:",
        "  /new                 start a new chat",
        "  /list                show conversations",
        "  /show                show the active conversation",
        "  /select <n>          switch to conversation n",
        "  /delete <n>          delete conversation n",
        "  /rename <n> [title]  rename conversation n",
        "  /save [title]        save the active conversation under a title",
        "  /copy [n]            copy code from message n (default: latest code)",
        "  /help                show this help",
        "  /quit, /exit, /q     leave (plain words are sent as messages)",
        "End a line with \\ to continue the message on the next line.",
    ]
    .join("\n")
}
