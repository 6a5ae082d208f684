//! Channel builder and serve loop.
//!
//! The [`ChannelBuilder`] collects configuration and handlers; the resulting
//! [`Channel`] serves one connection at a time:
//! 1. Read bytes from the transport into a [`FrameBuffer`]
//! 2. Decode each call frame into a [`MethodCall`]
//! 3. Dispatch synchronously
//! 4. Write exactly one response frame carrying the call's request id
//!
//! Calls are handled strictly in arrival order; the next frame is not looked
//! at until the previous response has been written.
//!
//! # Example
//!
//! ```ignore
//! use adb_channel::Channel;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let channel = Channel::builder().with_platform_plugin().build()?;
//!     let (stdin, stdout) = adb_channel::transport::stdio();
//!     channel.serve(stdin, stdout).await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::codec::MethodCodec;
use crate::dispatcher::ChannelDispatcher;
use crate::error::{ChannelError, Result};
use crate::handler::{HandlerFailure, HandlerRegistry, HandlerResult, MethodCall, MethodResponse};
use crate::plugin::{register_platform_plugin, CHANNEL_NAME};
use crate::probe::{SystemVersionProbe, VersionProbe};
use crate::protocol::{flags, Frame, FrameBuffer, Header, DEFAULT_MAX_PAYLOAD_SIZE};

/// Default read buffer size (8KB).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;

/// Error code sent back when a call frame cannot be decoded.
pub const BAD_CALL_CODE: &str = "bad_call";

/// Error code sent back when a handler's result cannot be framed.
pub const BAD_RESPONSE_CODE: &str = "bad_response";

/// Channel configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Logical channel name.
    pub name: String,
    /// Maximum payload size, for calls read and responses written.
    pub max_payload_size: u32,
    /// Size of the transport read buffer.
    pub read_buffer_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            name: CHANNEL_NAME.to_string(),
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

/// Builder for configuring and creating a [`Channel`].
pub struct ChannelBuilder {
    config: ChannelConfig,
    registry: HandlerRegistry,
    probe: Option<Arc<dyn VersionProbe>>,
    platform_plugin: bool,
    pending_error: Option<ChannelError>,
}

impl ChannelBuilder {
    pub fn new() -> Self {
        Self {
            config: ChannelConfig::default(),
            registry: HandlerRegistry::new(),
            probe: None,
            platform_plugin: false,
            pending_error: None,
        }
    }

    /// Start from an existing configuration.
    pub fn with_config(mut self, config: ChannelConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the channel name.
    ///
    /// Default: `"adb"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the maximum call payload size.
    ///
    /// Default: 16 MiB
    pub fn max_payload_size(mut self, size: u32) -> Self {
        self.config.max_payload_size = size;
        self
    }

    /// Set the read buffer size.
    ///
    /// Default: 8KB
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size.max(1);
        self
    }

    /// Register a method handler.
    ///
    /// A duplicate name is reported by [`build`](Self::build).
    pub fn handler<F>(mut self, method: &str, handler: F) -> Self
    where
        F: Fn(&MethodCall) -> HandlerResult + Send + Sync + 'static,
    {
        if self.pending_error.is_none() {
            if let Err(e) = self.registry.register(method, handler) {
                self.pending_error = Some(e);
            }
        }
        self
    }

    /// Register a method handler with typed arguments and result.
    pub fn typed_handler<F, T, R>(mut self, method: &str, handler: F) -> Self
    where
        F: Fn(T) -> std::result::Result<R, HandlerFailure> + Send + Sync + 'static,
        T: DeserializeOwned + 'static,
        R: Serialize + 'static,
    {
        if self.pending_error.is_none() {
            if let Err(e) = self.registry.register_typed(method, handler) {
                self.pending_error = Some(e);
            }
        }
        self
    }

    /// Register `getPlatformVersion`.
    pub fn with_platform_plugin(mut self) -> Self {
        self.platform_plugin = true;
        self
    }

    /// Probe used by the platform plugin.
    ///
    /// Default: [`SystemVersionProbe`]
    pub fn probe(mut self, probe: impl VersionProbe + 'static) -> Self {
        self.probe = Some(Arc::new(probe));
        self
    }

    /// Build the channel.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::DuplicateHandler`] if a method name was
    /// registered twice.
    pub fn build(self) -> Result<Channel> {
        if let Some(e) = self.pending_error {
            return Err(e);
        }

        let mut dispatcher = ChannelDispatcher::with_registry(&self.config.name, self.registry);

        if self.platform_plugin {
            let probe: Arc<dyn VersionProbe> = match self.probe {
                Some(probe) => probe,
                None => Arc::new(SystemVersionProbe::new()),
            };
            register_platform_plugin(&mut dispatcher, probe)?;
        }

        tracing::debug!(
            channel = %self.config.name,
            methods = ?dispatcher.registry().method_names(),
            "Channel built"
        );

        Ok(Channel {
            config: self.config,
            dispatcher,
        })
    }
}

impl Default for ChannelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters for one served connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeStats {
    /// Call frames answered.
    pub calls: u64,
    pub successes: u64,
    pub errors: u64,
    pub not_implemented: u64,
    /// Non-call frames dropped.
    pub ignored: u64,
}

impl ServeStats {
    fn record(&mut self, response: &Frame) {
        self.calls += 1;
        let header = &response.header;
        if header.is_error() {
            self.errors += 1;
        } else if header.is_not_implemented() {
            self.not_implemented += 1;
        } else {
            self.successes += 1;
        }
    }
}

/// A configured method channel.
pub struct Channel {
    config: ChannelConfig,
    dispatcher: ChannelDispatcher,
}

impl Channel {
    /// Create a new channel builder.
    pub fn builder() -> ChannelBuilder {
        ChannelBuilder::new()
    }

    /// Wrap an existing dispatcher with default configuration.
    pub fn from_dispatcher(dispatcher: ChannelDispatcher) -> Self {
        let config = ChannelConfig {
            name: dispatcher.name().to_string(),
            ..ChannelConfig::default()
        };
        Self { config, dispatcher }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &ChannelDispatcher {
        &self.dispatcher
    }

    /// Process one inbound frame.
    ///
    /// Returns the response frame for a call, or `None` for frames that are
    /// not calls (stray responses).
    pub fn handle_frame(&self, frame: &Frame) -> Option<Frame> {
        if frame.is_response() {
            tracing::warn!(
                channel = %self.config.name,
                request_id = frame.request_id(),
                "Ignoring unexpected response frame"
            );
            return None;
        }

        let response = match MethodCodec::decode_call(frame.payload()) {
            Ok(call) => {
                tracing::trace!(
                    channel = %self.config.name,
                    request_id = frame.request_id(),
                    method = %call.method,
                    "Dispatching call"
                );
                self.dispatcher.dispatch(&call)
            }
            Err(e) => {
                tracing::warn!(
                    channel = %self.config.name,
                    request_id = frame.request_id(),
                    "Undecodable call: {}",
                    e
                );
                MethodResponse::error(BAD_CALL_CODE, e.to_string())
            }
        };

        Some(response_frame(
            frame.request_id(),
            &response,
            self.config.max_payload_size,
        ))
    }

    /// Serve calls from `reader`, writing responses to `writer`.
    ///
    /// Returns when the reader reaches EOF on a frame boundary.
    ///
    /// # Errors
    ///
    /// I/O failures, protocol violations, or EOF in the middle of a frame.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<ServeStats>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut frame_buffer = FrameBuffer::with_max_payload(self.config.max_payload_size);
        let mut buf = vec![0u8; self.config.read_buffer_size.max(1)];
        let mut stats = ServeStats::default();

        tracing::info!(channel = %self.config.name, "Serving channel");

        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                if frame_buffer.has_partial_frame() {
                    return Err(ChannelError::ConnectionClosed);
                }
                tracing::info!(channel = %self.config.name, calls = stats.calls, "Channel closed");
                return Ok(stats);
            }

            for frame in frame_buffer.push(&buf[..n])? {
                match self.handle_frame(&frame) {
                    Some(response) => {
                        writer.write_all(&response.to_bytes()).await?;
                        writer.flush().await?;
                        stats.record(&response);
                    }
                    None => stats.ignored += 1,
                }
            }
        }
    }

    /// Serve a bidirectional stream (socket or pipe).
    pub async fn serve_stream<S>(&self, stream: S) -> Result<ServeStats>
    where
        S: AsyncRead + AsyncWrite,
    {
        let (reader, writer) = tokio::io::split(stream);
        self.serve(reader, writer).await
    }
}

/// Encode `response` into a frame for `request_id`.
///
/// A response that cannot be encoded, or whose payload exceeds
/// `max_payload_size`, is replaced by a [`BAD_RESPONSE_CODE`] error. If even
/// that does not fit, an empty error frame is sent, so a call is never left
/// unanswered.
pub fn response_frame(request_id: u32, response: &MethodResponse, max_payload_size: u32) -> Frame {
    let e = match encode_response_frame(request_id, response, max_payload_size) {
        Ok(frame) => return frame,
        Err(e) => e,
    };
    tracing::error!(request_id, "Failed to frame response: {}", e);

    let fallback = MethodResponse::error(BAD_RESPONSE_CODE, e.to_string());
    encode_response_frame(request_id, &fallback, max_payload_size).unwrap_or_else(|_| {
        Frame::new(
            Header::new(flags::ERROR_RESPONSE, request_id, 0),
            Bytes::new(),
        )
    })
}

fn encode_response_frame(
    request_id: u32,
    response: &MethodResponse,
    max_payload_size: u32,
) -> Result<Frame> {
    let payload = MethodCodec::encode_response(response)?;
    let frame = Frame::with_flags(
        MethodCodec::response_flags(response),
        request_id,
        Bytes::from(payload),
    )?;
    frame.header.validate(max_payload_size)?;
    Ok(frame)
}
