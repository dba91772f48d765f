//! Outbound command delivery
//!
//! The core task hands every [`ProductCommand`] to a [`CommandSink`]. Sinks
//! must not block: the core task is the only thread that drives the state
//! machine.

use std::sync::mpsc;

use product_state::ProductCommand;

/// Receiver of commands issued by the core
pub trait CommandSink: Send + Sync {
    fn deliver(&self, command: ProductCommand);
}

/// Forwards commands over a std channel
#[derive(Debug, Clone)]
pub struct ChannelCommandSink {
    tx: mpsc::Sender<ProductCommand>,
}

impl ChannelCommandSink {
    pub fn new(tx: mpsc::Sender<ProductCommand>) -> Self {
        Self { tx }
    }

    /// Create a sink together with the receiving end
    pub fn channel() -> (Self, mpsc::Receiver<ProductCommand>) {
        let (tx, rx) = mpsc::channel();
        (Self::new(tx), rx)
    }
}

impl CommandSink for ChannelCommandSink {
    fn deliver(&self, command: ProductCommand) {
        if self.tx.send(command).is_err() {
            tracing::debug!("Command receiver dropped, discarding command");
        }
    }
}

/// Logs commands instead of delivering them
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingCommandSink;

impl CommandSink for LoggingCommandSink {
    fn deliver(&self, command: ProductCommand) {
        tracing::info!(%command, "Command issued");
    }
}
