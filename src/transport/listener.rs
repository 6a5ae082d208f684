//! Platform-specific listener for hosts that connect to the channel.
//!
//! - Unix: Unix Domain Socket
//! - Windows: Named Pipe
//!
//! # Example
//!
//! ```ignore
//! use adb_channel::transport::{default_socket_path, ChannelListener};
//!
//! let listener = ChannelListener::bind(&default_socket_path("adb")).await?;
//! let stream = listener.accept().await?;
//! channel.serve_stream(stream).await?;
//! ```

use crate::error::Result;

/// Default endpoint path for a channel name.
///
/// Format:
/// - Unix: `{tmp}/{name}-channel-{pid}.sock`
/// - Windows: `\\.\pipe\{name}-channel-{pid}`
pub fn default_socket_path(name: &str) -> String {
    let pid = std::process::id();

    #[cfg(unix)]
    {
        std::env::temp_dir()
            .join(format!("{}-channel-{}.sock", name, pid))
            .to_string_lossy()
            .into_owned()
    }

    #[cfg(windows)]
    {
        format!(r"\\.\pipe\{}-channel-{}", name, pid)
    }
}

// ============================================================================
// Unix Implementation
// ============================================================================

#[cfg(unix)]
mod unix_impl {
    use super::*;
    use std::path::Path;
    use tokio::net::{UnixListener, UnixStream};

    /// Unix Domain Socket listener. Removes its socket file on drop.
    pub struct ChannelListener {
        listener: UnixListener,
        path: String,
    }

    /// Connected host stream.
    pub type ChannelStream = UnixStream;

    impl ChannelListener {
        /// Bind to a Unix socket path.
        ///
        /// Removes any stale socket file at the path before binding.
        pub async fn bind(path: &str) -> Result<Self> {
            if Path::new(path).exists() {
                std::fs::remove_file(path)?;
            }

            let listener = UnixListener::bind(path)?;
            tracing::info!(path, "Listening on Unix socket");

            Ok(Self {
                listener,
                path: path.to_string(),
            })
        }

        /// Accept a single connection.
        pub async fn accept(&self) -> Result<ChannelStream> {
            let (stream, _addr) = self.listener.accept().await?;
            tracing::debug!(path = %self.path, "Host connected");
            Ok(stream)
        }

        pub fn path(&self) -> &str {
            &self.path
        }
    }

    impl Drop for ChannelListener {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

// ============================================================================
// Windows Implementation
// ============================================================================

#[cfg(windows)]
mod windows_impl {
    use super::*;
    use tokio::net::windows::named_pipe::{NamedPipeServer, ServerOptions};
    use tokio::sync::Mutex;

    /// Windows Named Pipe listener.
    ///
    /// Keeps the next server instance open so clients never see the pipe
    /// missing between connections.
    pub struct ChannelListener {
        path: String,
        next: Mutex<NamedPipeServer>,
    }

    /// Connected host stream.
    pub type ChannelStream = NamedPipeServer;

    impl ChannelListener {
        /// Create the first Named Pipe instance.
        pub async fn bind(path: &str) -> Result<Self> {
            let server = ServerOptions::new()
                .first_pipe_instance(true)
                .create(path)?;
            tracing::info!(path, "Listening on named pipe");

            Ok(Self {
                path: path.to_string(),
                next: Mutex::new(server),
            })
        }

        /// Accept a single connection.
        pub async fn accept(&self) -> Result<ChannelStream> {
            let mut next = self.next.lock().await;
            next.connect().await?;

            let fresh = ServerOptions::new().create(&self.path)?;
            let connected = std::mem::replace(&mut *next, fresh);
            tracing::debug!(path = %self.path, "Host connected");
            Ok(connected)
        }

        pub fn path(&self) -> &str {
            &self.path
        }
    }
}

#[cfg(unix)]
pub use unix_impl::{ChannelListener, ChannelStream};

#[cfg(windows)]
pub use windows_impl::{ChannelListener, ChannelStream};
