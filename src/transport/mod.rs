//! Transport module - how a host reaches the channel.
//!
//! - [`ChannelListener`] - Unix Domain Socket (Linux/macOS) or Named Pipe (Windows)
//! - [`stdio`] - stdin/stdout when the host spawns the service as a child

mod listener;

pub use listener::{default_socket_path, ChannelListener, ChannelStream};

/// Reader and writer over the process's standard streams.
///
/// Only frames go to stdout; logging must be sent to stderr.
pub fn stdio() -> (tokio::io::Stdin, tokio::io::Stdout) {
    (tokio::io::stdin(), tokio::io::stdout())
}
