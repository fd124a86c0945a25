//! Command context handed to adapters by the in-memory host.

use std::sync::{Mutex, PoisonError};

use crate::domain::models::value::ArgValue;
use crate::domain::ports::host::{ArgumentHandle, CommandContext};

/// Who issued a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sender {
    /// The server console; holds every permission.
    Console,
    /// An online player, by username.
    Player(String),
}

impl Sender {
    /// Player sender.
    pub fn player(username: impl Into<String>) -> Self {
        Self::Player(username.into())
    }

    /// Display name of the sender.
    pub fn name(&self) -> &str {
        match self {
            Self::Console => "CONSOLE",
            Self::Player(name) => name,
        }
    }
}

/// Context of one dispatched command line. Messages sent to the sender are
/// captured in order.
#[derive(Debug)]
pub struct MemoryCommandContext {
    sender: Sender,
    input: String,
    values: Vec<Option<ArgValue>>,
    messages: Mutex<Vec<String>>,
}

impl MemoryCommandContext {
    pub fn new(sender: Sender, input: impl Into<String>, values: Vec<Option<ArgValue>>) -> Self {
        Self {
            sender,
            input: input.into(),
            values,
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Messages sent so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CommandContext for MemoryCommandContext {
    fn sender_name(&self) -> &str {
        self.sender.name()
    }

    fn is_player(&self) -> bool {
        matches!(self.sender, Sender::Player(_))
    }

    fn send_message(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }

    fn input(&self) -> &str {
        &self.input
    }

    fn argument(&self, handle: ArgumentHandle) -> Option<ArgValue> {
        self.values.get(handle.0).cloned().flatten()
    }
}
