//! # adb-channel
//!
//! Host-version query service exposed over a framed method channel.
//!
//! A host (typically a GUI front end) sends named method calls over a
//! socket, named pipe or stdio. Each call is routed by method name to a
//! registered handler and answered with exactly one response: a success
//! value, an error, or "not implemented".
//!
//! The built-in `getPlatformVersion` method reports the host OS as
//! `"<OS family> <release>"`, e.g. `"Linux 5.15.0"`.
//!
//! ## Layers
//!
//! - [`probe`] - per-OS version query behind [`VersionProbe`]
//! - [`handler`] / [`dispatcher`] - call routing
//! - [`codec`] / [`protocol`] - MsgPack envelopes in length-prefixed frames
//! - [`channel`] / [`transport`] - serve loop and endpoints
//!
//! ## Example
//!
//! ```ignore
//! use adb_channel::{transport, Channel};
//!
//! #[tokio::main]
//! async fn main() -> adb_channel::Result<()> {
//!     let channel = Channel::builder().with_platform_plugin().build()?;
//!     let (stdin, stdout) = transport::stdio();
//!     channel.serve(stdin, stdout).await?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod codec;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod plugin;
pub mod probe;
pub mod protocol;
pub mod transport;

pub use channel::{Channel, ChannelBuilder, ChannelConfig, ServeStats};
pub use dispatcher::ChannelDispatcher;
pub use error::{ChannelError, Result};
pub use handler::{HandlerFailure, MethodCall, MethodResponse};
pub use plugin::{register_platform_plugin, CHANNEL_NAME, GET_PLATFORM_VERSION};
pub use probe::{SystemVersionProbe, VersionProbe};
