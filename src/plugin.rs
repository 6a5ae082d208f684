//! The platform plugin: the `getPlatformVersion` method on the `adb` channel.

use std::sync::Arc;

use serde_json::Value;

use crate::dispatcher::ChannelDispatcher;
use crate::error::Result;
use crate::handler::MethodCall;
use crate::probe::{SystemVersionProbe, VersionProbe};

/// Name of the channel the plugin is registered on.
pub const CHANNEL_NAME: &str = "adb";

/// Method returning the host's `"<OS family> <release>"` string.
pub const GET_PLATFORM_VERSION: &str = "getPlatformVersion";

/// Register the plugin's methods on `dispatcher`.
///
/// `getPlatformVersion` ignores its arguments and never fails.
pub fn register_platform_plugin(
    dispatcher: &mut ChannelDispatcher,
    probe: Arc<dyn VersionProbe>,
) -> Result<()> {
    dispatcher.register_handler(GET_PLATFORM_VERSION, move |_call: &MethodCall| {
        Ok(Value::String(probe.probe()))
    })
}

/// A dispatcher for [`CHANNEL_NAME`] with the plugin registered against the
/// running OS.
pub fn platform_dispatcher() -> Result<ChannelDispatcher> {
    let mut dispatcher = ChannelDispatcher::new(CHANNEL_NAME);
    register_platform_plugin(&mut dispatcher, Arc::new(SystemVersionProbe::new()))?;
    Ok(dispatcher)
}
