//! Interactive chat loop
//!
//! Reads terminal lines and reply completions on one task. Replies run in
//! spawned tasks and come back over a channel, so the user can keep
//! navigating while one is in flight.

use std::io::Write;
use std::sync::Arc;

use chat_responder::Responder;
use colored::Colorize;
use conversation_store::KeyValueStore;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc;

use crate::clipboard::ClipboardSink;
use crate::controller::{self, run_reply, ChatController, ControllerError, ReplyOutcome};
use crate::input::{Command, InputAction, InputBuffer};
use crate::views;

pub struct App<K: KeyValueStore, C: ClipboardSink> {
    controller: ChatController<K>,
    responder: Arc<dyn Responder>,
    clipboard: C,
    thread_window: usize,
}

impl<K: KeyValueStore, C: ClipboardSink> App<K, C> {
    pub fn new(
        controller: ChatController<K>,
        responder: Arc<dyn Responder>,
        clipboard: C,
        thread_window: usize,
    ) -> Self {
        Self {
            controller,
            responder,
            clipboard,
            thread_window,
        }
    }

    pub fn controller(&self) -> &ChatController<K> {
        &self.controller
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    /// Run until `/quit` or end of input. Replies still in flight at that
    /// point are awaited and stored before returning.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<ReplyOutcome>();
        let mut lines = input.lines();
        let mut buffer = InputBuffer::new();

        writeln!(out, "{}", "🤖 Chat Shell".cyan().bold())?;
        writeln!(out, "{}", "Type /help for commands, /quit to leave".dimmed())?;
        writeln!(out)?;
        self.show_active(out)?;

        loop {
            let prompt = if buffer.is_continuing() {
                "  …".cyan()
            } else {
                "You:".cyan().bold()
            };
            write!(out, "{} ", prompt)?;
            out.flush()?;

            tokio::select! {
                Some(outcome) = rx.recv() => {
                    writeln!(out)?;
                    self.on_reply(outcome, out)?;
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        writeln!(out)?;
                        break;
                    };
                    match buffer.push_line(&line) {
                        InputAction::Send(text) => self.on_send(&text, &tx, out)?,
                        InputAction::Command(Command::Quit) => break,
                        InputAction::Command(command) => {
                            self.on_command(command, &mut lines, out).await?
                        }
                        InputAction::Invalid(e) => writeln!(out, "{}", e.to_string().red())?,
                        InputAction::Continue | InputAction::Empty => {}
                    }
                }
            }
        }

        while self.controller.is_pending() {
            match rx.recv().await {
                Some(outcome) => self.on_reply(outcome, out)?,
                None => break,
            }
        }

        writeln!(out, "{}", "👋 Goodbye!".cyan())?;
        Ok(())
    }

    fn show_active<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        write!(
            out,
            "{}",
            views::render_thread(self.controller.active(), self.thread_window)
        )?;
        writeln!(out, "{}", views::render_status(self.controller.reply_state()))?;
        Ok(())
    }

    fn show_list<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        let store = self.controller.store();
        write!(
            out,
            "{}",
            views::render_conversation_list(store.conversations(), store.active_id())
        )?;
        Ok(())
    }

    fn on_send<W: Write>(
        &mut self,
        text: &str,
        tx: &mpsc::UnboundedSender<ReplyOutcome>,
        out: &mut W,
    ) -> anyhow::Result<()> {
        let pending = match self.controller.begin_send(text) {
            Ok(pending) => pending,
            Err(e @ (ControllerError::EmptyMessage | ControllerError::ReplyPending)) => {
                writeln!(out, "{}", e.to_string().yellow())?;
                return Ok(());
            }
            Err(e) => {
                report_failure(&e, out)?;
                return Ok(());
            }
        };

        write!(out, "{}", views::render_new_message(self.controller.active()))?;
        writeln!(out, "{}", views::render_status(self.controller.reply_state()))?;

        let responder = Arc::clone(&self.responder);
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = run_reply(responder.as_ref(), pending).await;
            if tx.send(outcome).is_err() {
                tracing::warn!("Reply finished after the chat loop exited");
            }
        });
        Ok(())
    }

    fn on_reply<W: Write>(&mut self, outcome: ReplyOutcome, out: &mut W) -> anyhow::Result<()> {
        let conversation_id = outcome.conversation_id.clone();

        let Some(appended) = reported(self.controller.complete_reply(outcome), out)? else {
            return Ok(());
        };
        if !appended {
            writeln!(
                out,
                "{}",
                "A reply arrived for a deleted conversation and was dropped".dimmed()
            )?;
            return Ok(());
        }

        if self.controller.active().id == conversation_id {
            write!(out, "{}", views::render_new_message(self.controller.active()))?;
        } else if let Some(conversation) = self.controller.store().get(&conversation_id) {
            writeln!(
                out,
                "{}",
                format!("New reply in \"{}\"", conversation.display_title()).dimmed()
            )?;
        }
        Ok(())
    }

    async fn on_command<R, W>(
        &mut self,
        command: Command,
        lines: &mut Lines<R>,
        out: &mut W,
    ) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        match command {
            Command::New => {
                if !self
                    .offer_save(
                        "Would you like to save the current conversation before starting a new one?",
                        lines,
                        out,
                    )
                    .await?
                {
                    return Ok(());
                }
                if reported(self.controller.new_conversation(), out)?.is_some() {
                    self.show_active(out)?;
                }
            }
            Command::Select(index) => {
                let Some(id) = self.lookup(index, out)? else {
                    return Ok(());
                };
                if id != self.controller.active().id
                    && !self
                        .offer_save(
                            "Would you like to save the current conversation before switching?",
                            lines,
                            out,
                        )
                        .await?
                {
                    return Ok(());
                }
                self.controller.select_conversation(&id);
                self.show_active(out)?;
            }
            Command::Delete(index) => {
                let Some(id) = self.lookup(index, out)? else {
                    return Ok(());
                };
                if reported(self.controller.delete_conversation(&id), out)?.is_some() {
                    self.show_list(out)?;
                }
            }
            Command::Rename { index, title } => {
                let Some(id) = self.lookup(index, out)? else {
                    return Ok(());
                };
                let title = match title {
                    Some(title) => Some(title),
                    None => {
                        let current = self
                            .controller
                            .store()
                            .get(&id)
                            .map(|c| c.display_title().to_string())
                            .unwrap_or_default();
                        ask(
                            &format!("Enter new title for this conversation [{}]:", current),
                            lines,
                            out,
                        )
                        .await?
                    }
                };
                let renamed = match title {
                    Some(title) => reported(self.controller.rename_conversation(&id, &title), out)?,
                    None => Some(false),
                };
                match renamed {
                    Some(true) => self.show_list(out)?,
                    Some(false) => writeln!(out, "{}", "Title unchanged".dimmed())?,
                    None => {}
                }
            }
            Command::Save(title) => {
                self.save_flow(title, lines, out).await?;
            }
            Command::Copy(position) => self.copy(position, out)?,
            Command::List => self.show_list(out)?,
            Command::Show => self.show_active(out)?,
            Command::Help => writeln!(out, "{}", views::render_help())?,
            Command::Quit => {}
        }
        Ok(())
    }

    /// Offer to save an unsaved active conversation before leaving it.
    ///
    /// Returns whether to go ahead with leaving. Agreeing to save ends the
    /// navigation: a saved conversation stays active, and a save without a
    /// title cancels.
    async fn offer_save<R, W>(
        &mut self,
        question: &str,
        lines: &mut Lines<R>,
        out: &mut W,
    ) -> anyhow::Result<bool>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        if !self.controller.needs_save_prompt() {
            return Ok(true);
        }
        if !confirm(question, lines, out).await? {
            return Ok(true);
        }
        self.save_flow(None, lines, out).await?;
        Ok(false)
    }

    /// Save the active conversation under a title, asking for one if needed.
    async fn save_flow<R, W>(
        &mut self,
        title: Option<String>,
        lines: &mut Lines<R>,
        out: &mut W,
    ) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let title = match title {
            Some(title) => Some(title),
            None => ask("Enter a title for this conversation:", lines, out).await?,
        };

        let saved = reported(
            self.controller.save_active_as(title.as_deref().unwrap_or_default()),
            out,
        )?;
        match saved {
            Some(Some(_)) => writeln!(
                out,
                "{}",
                format!("✓ Saved as \"{}\"", self.controller.active().display_title()).green()
            )?,
            Some(None) => writeln!(out, "{}", "Save cancelled".dimmed())?,
            None => {}
        }
        Ok(())
    }

    fn copy<W: Write>(&mut self, position: Option<usize>, out: &mut W) -> anyhow::Result<()> {
        let messages = &self.controller.active().messages;
        let message = match position {
            Some(n) => n.checked_sub(1).and_then(|i| messages.get(i)),
            None => messages.iter().rev().find(|m| m.is_code),
        };

        let Some(message) = message.filter(|m| m.is_code) else {
            writeln!(out, "{}", "No code message to copy".yellow())?;
            return Ok(());
        };

        let text = message.copy_text().to_string();
        match self.clipboard.set_text(&text) {
            Ok(()) => writeln!(out, "{}", "✓ Copied!".green())?,
            Err(e) => writeln!(out, "{}", format!("Copy failed: {}", e).red())?,
        }
        Ok(())
    }

    fn lookup<W: Write>(&self, index: usize, out: &mut W) -> anyhow::Result<Option<String>> {
        let id = self.controller.id_at(index);
        if id.is_none() {
            writeln!(out, "{}", format!("No conversation {}", index).yellow())?;
        }
        Ok(id)
    }
}

async fn ask<R, W>(question: &str, lines: &mut Lines<R>, out: &mut W) -> anyhow::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{} ", question.yellow())?;
    out.flush()?;
    let answer = lines.next_line().await?;
    Ok(answer
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty()))
}

async fn confirm<R, W>(question: &str, lines: &mut Lines<R>, out: &mut W) -> anyhow::Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let answer = ask(&format!("{} [y/N]", question), lines, out).await?;
    Ok(matches!(
        answer.as_deref().map(str::to_ascii_lowercase).as_deref(),
        Some("y" | "yes")
    ))
}

fn report_failure<W: Write>(error: &ControllerError, out: &mut W) -> anyhow::Result<()> {
    writeln!(out, "{}", format!("⚠ {}", error).red())?;
    Ok(())
}

/// Print a failed controller call in the thread and keep going.
fn reported<T, W: Write>(result: controller::Result<T>, out: &mut W) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            report_failure(&e, out)?;
            Ok(None)
        }
    }
}
