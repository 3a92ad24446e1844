use std::sync::Arc;

use tokio::task::JoinHandle;
use unicode_width::UnicodeWidthStr;

use crate::conversation::{Conversation, SubmitOutcome};
use crate::transport::{AIMessage, StatusSnapshot, Transport, TransportError};

type GenerateTask = JoinHandle<Result<AIMessage, TransportError>>;
type StatusTask = JoinHandle<Result<StatusSnapshot, TransportError>>;

pub struct App {
    // Core state
    pub should_quit: bool,
    pub conversation: Conversation,
    pub transport: Arc<dyn Transport>,
    pub base_url: String,

    // Composer
    pub input: String,
    pub input_cursor: usize, // cursor position in chars, not bytes

    // Chat viewport
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height, updated during render
    pub chat_width: u16,  // inner width, updated during render

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Background work; at most one of each
    pub status_task: Option<StatusTask>,
    pub generate_task: Option<GenerateTask>,
}

impl App {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self {
            should_quit: false,
            conversation: Conversation::new(),
            transport,
            base_url: base_url.into(),
            input: String::new(),
            input_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            status_task: None,
            generate_task: None,
        }
    }

    /// The composer is disabled while a reply is pending.
    pub fn is_busy(&self) -> bool {
        self.generate_task.is_some() || self.conversation.is_loading()
    }

    /// Kick off the one-time status fetch.
    pub fn start_status_fetch(&mut self) {
        if self.status_task.is_some() {
            return;
        }
        let transport = Arc::clone(&self.transport);
        self.status_task = Some(tokio::spawn(async move { transport.fetch_status().await }));
    }

    /// Submit the composer contents.
    pub fn submit(&mut self) {
        if self.generate_task.is_some() {
            tracing::debug!("submit ignored: composer disabled");
            return;
        }

        match self.conversation.submit(&self.input) {
            SubmitOutcome::Sent(prompt) => {
                self.input.clear();
                self.input_cursor = 0;
                self.scroll_to_bottom();

                let transport = Arc::clone(&self.transport);
                self.generate_task = Some(tokio::spawn(async move { transport.generate(&prompt).await }));
            }
            SubmitOutcome::Empty | SubmitOutcome::Busy => {}
        }
    }

    /// Fold finished background tasks into the conversation.
    pub async fn poll_tasks(&mut self) {
        if self.status_task.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(task) = self.status_task.take() {
                match join(task).await {
                    Ok(snapshot) => self.conversation.on_status_loaded(snapshot),
                    Err(err) => self.conversation.on_status_failed(&err),
                }
            }
        }

        if self.generate_task.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(task) = self.generate_task.take() {
                match join(task).await {
                    Ok(reply) => self.conversation.on_response(reply),
                    Err(err) => self.conversation.on_failure(&err),
                }
                self.animation_frame = 0;
                self.scroll_to_bottom();
            }
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_scroll());
    }

    pub fn half_page(&self) -> u16 {
        (self.visible_height() / 2).max(1)
    }

    /// Scroll chat to bottom so the newest message is visible
    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 { self.chat_height } else { 20 }
    }

    fn max_scroll(&self) -> u16 {
        self.total_chat_lines().saturating_sub(self.visible_height())
    }

    /// Rendered line count of the chat, matching the layout in `ui`.
    pub fn total_chat_lines(&self) -> u16 {
        let wrap_width = if self.chat_width > 0 { self.chat_width as usize } else { 50 };

        let mut total: usize = 0;
        for msg in self.conversation.messages() {
            total += 1; // role + meta line
            for line in msg.content.lines() {
                total += line.width().div_ceil(wrap_width).max(1);
            }
            if msg.content.is_empty() {
                total += 1;
            }
            total += 1; // blank line after message
        }

        if self.is_busy() {
            total += 2; // role line + "Generating..."
        }

        u16::try_from(total).unwrap_or(u16::MAX)
    }
}

async fn join<T>(task: JoinHandle<Result<T, TransportError>>) -> Result<T, TransportError> {
    match task.await {
        Ok(result) => result,
        Err(e) => Err(TransportError::Request(format!("background task failed: {e}"))),
    }
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
