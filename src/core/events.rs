// src/core/events.rs

//! A bounded in-memory ring of recent command exchanges.
//!
//! Every executed command is emitted as a structured `tracing` event and
//! retained here for inspection, oldest evicted first.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::net::SocketAddr;
use tracing::info;

/// Number of command events retained in memory.
pub const EVENT_HISTORY_LEN: usize = 256;

/// Longest argument or reply text stored per event. Longer values are cut at
/// a character boundary and marked.
pub const EVENT_MAX_TEXT_LEN: usize = 128;

/// One request/reply exchange as observed by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEvent {
    pub peer: SocketAddr,
    pub verb: &'static str,
    pub args: String,
    pub reply: Option<String>,
}

impl CommandEvent {
    pub fn new(peer: SocketAddr, verb: &'static str, args: String, reply: Option<String>) -> Self {
        CommandEvent {
            peer,
            verb,
            args: truncate_for_log(&args),
            reply: reply.as_deref().map(truncate_for_log),
        }
    }
}

/// Fixed-size history of recent exchanges.
#[derive(Debug)]
pub struct EventLog {
    events: Mutex<VecDeque<CommandEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog {
            events: Mutex::new(VecDeque::with_capacity(EVENT_HISTORY_LEN)),
        }
    }

    /// Emits the exchange as a structured log event and retains it in the
    /// ring.
    pub fn record(&self, event: CommandEvent) {
        info!(
            peer = %event.peer,
            verb = event.verb,
            args = %event.args,
            reply = event.reply.as_deref().unwrap_or("-"),
            "Command executed"
        );

        let mut events = self.events.lock();
        if events.len() == EVENT_HISTORY_LEN {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// The retained events, oldest first.
    pub fn recent(&self) -> Vec<CommandEvent> {
        self.events.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Cuts `text` at a character boundary so oversized payloads do not flood
/// the log or the ring.
pub fn truncate_for_log(text: &str) -> String {
    if text.len() <= EVENT_MAX_TEXT_LEN {
        return text.to_string();
    }
    let mut cut = EVENT_MAX_TEXT_LEN;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}... ({} bytes total)", &text[..cut], text.len())
}
