//! Error types for adb-channel.

use thiserror::Error;

/// Main error type for all channel operations.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// A handler is already registered under this method name.
    #[error("Handler already registered for method: {0}")]
    DuplicateHandler(String),

    /// I/O error during socket/pipe/stdio operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON conversion error (argument and result values).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// Protocol error (invalid frame, reserved flags, oversize payload).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Connection closed in the middle of a frame.
    #[error("Connection closed")]
    ConnectionClosed,
}

/// Result type alias using ChannelError.
pub type Result<T> = std::result::Result<T, ChannelError>;
