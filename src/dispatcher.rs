//! Method dispatch for a single named channel.
//!
//! The [`ChannelDispatcher`] owns the channel's [`HandlerRegistry`]. Each call
//! is routed by method name and turned into exactly one [`MethodResponse`]:
//!
//! - no handler registered: [`MethodResponse::NotImplemented`]
//! - handler returned a value: [`MethodResponse::Success`]
//! - handler failed: [`MethodResponse::Error`] with the failure's fields
//!
//! # Example
//!
//! ```
//! use adb_channel::dispatcher::ChannelDispatcher;
//! use adb_channel::handler::{HandlerFailure, MethodCall, MethodResponse};
//!
//! let mut dispatcher = ChannelDispatcher::new("adb");
//! dispatcher
//!     .register_handler("foo", |_: &MethodCall| Err(HandlerFailure::new("E1", "bad")))
//!     .unwrap();
//!
//! let response = dispatcher.dispatch(&MethodCall::new("foo"));
//! assert_eq!(response, MethodResponse::error("E1", "bad"));
//!
//! let response = dispatcher.dispatch(&MethodCall::new("unknownMethod"));
//! assert_eq!(response, MethodResponse::NotImplemented);
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::handler::{HandlerFailure, HandlerRegistry, HandlerResult, MethodCall, MethodResponse};

/// Routes method calls on one channel to their handlers.
#[derive(Debug)]
pub struct ChannelDispatcher {
    name: String,
    registry: HandlerRegistry,
}

impl ChannelDispatcher {
    /// Create a dispatcher for the channel `name` with no handlers.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_registry(name, HandlerRegistry::new())
    }

    /// Create a dispatcher around an already populated registry.
    pub fn with_registry(name: impl Into<String>, registry: HandlerRegistry) -> Self {
        Self {
            name: name.into(),
            registry,
        }
    }

    /// Channel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Register a handler for `method`.
    ///
    /// # Errors
    ///
    /// [`ChannelError::DuplicateHandler`](crate::error::ChannelError::DuplicateHandler)
    /// if `method` already has a handler; the first one stays active.
    pub fn register_handler<F>(&mut self, method: &str, handler: F) -> Result<()>
    where
        F: Fn(&MethodCall) -> HandlerResult + Send + Sync + 'static,
    {
        self.registry.register(method, handler)?;
        tracing::debug!(channel = %self.name, method, "Registered handler");
        Ok(())
    }

    /// Register a handler with typed arguments and result.
    pub fn register_typed<F, T, R>(&mut self, method: &str, handler: F) -> Result<()>
    where
        F: Fn(T) -> std::result::Result<R, HandlerFailure> + Send + Sync + 'static,
        T: DeserializeOwned + 'static,
        R: Serialize + 'static,
    {
        self.registry.register_typed(method, handler)?;
        tracing::debug!(channel = %self.name, method, "Registered handler");
        Ok(())
    }

    /// Dispatch one call and produce its response.
    ///
    /// Invokes at most one handler, exactly once.
    pub fn dispatch(&self, call: &MethodCall) -> MethodResponse {
        let handler = match self.registry.get_handler(&call.method) {
            Some(handler) => handler,
            None => {
                tracing::debug!(channel = %self.name, method = %call.method, "Method not implemented");
                return MethodResponse::NotImplemented;
            }
        };

        match handler.call(call) {
            Ok(value) => MethodResponse::Success { value },
            Err(failure) => {
                tracing::warn!(
                    channel = %self.name,
                    method = %call.method,
                    code = %failure.code,
                    "Handler failed"
                );
                failure.into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChannelError;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_handler(
        counter: Arc<AtomicUsize>,
        reply: &'static str,
    ) -> impl Fn(&MethodCall) -> HandlerResult + Send + Sync + 'static {
        move |_call: &MethodCall| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(json!(reply))
        }
    }

    #[test]
    fn test_dispatch_invokes_registered_handler_once() {
        let a_calls = Arc::new(AtomicUsize::new(0));
        let b_calls = Arc::new(AtomicUsize::new(0));

        let mut dispatcher = ChannelDispatcher::new("adb");
        dispatcher
            .register_handler("a", counting_handler(a_calls.clone(), "from a"))
            .unwrap();
        dispatcher
            .register_handler("b", counting_handler(b_calls.clone(), "from b"))
            .unwrap();

        let response = dispatcher.dispatch(&MethodCall::new("a"));

        assert_eq!(response, MethodResponse::success("from a"));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unregistered_name_invokes_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));

        let mut dispatcher = ChannelDispatcher::new("adb");
        dispatcher
            .register_handler("known", counting_handler(calls.clone(), "x"))
            .unwrap();

        let response = dispatcher.dispatch(&MethodCall::new("unknownMethod"));

        assert!(response.is_not_implemented());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_dispatcher_not_implemented() {
        let dispatcher = ChannelDispatcher::new("adb");
        assert_eq!(
            dispatcher.dispatch(&MethodCall::new("unknownMethod")),
            MethodResponse::NotImplemented
        );
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let mut dispatcher = ChannelDispatcher::new("adb");
        dispatcher
            .register_handler("dup", |_: &MethodCall| Ok(json!(1)))
            .unwrap();

        let err = dispatcher
            .register_handler("dup", |_: &MethodCall| Ok(json!(2)))
            .unwrap_err();
        assert!(matches!(err, ChannelError::DuplicateHandler(_)));

        assert_eq!(
            dispatcher.dispatch(&MethodCall::new("dup")),
            MethodResponse::success(1)
        );
    }

    #[test]
    fn test_failure_carried_verbatim() {
        let mut dispatcher = ChannelDispatcher::new("adb");
        dispatcher
            .register_handler("foo", |_: &MethodCall| {
                Err(HandlerFailure::new("E1", "bad").with_details(json!(["ctx"])))
            })
            .unwrap();

        let response = dispatcher.dispatch(&MethodCall::new("foo"));

        assert_eq!(
            response,
            MethodResponse::Error {
                code: "E1".to_string(),
                message: Some("bad".to_string()),
                details: json!(["ctx"]),
            }
        );
    }

    #[test]
    fn test_failure_does_not_affect_next_call() {
        let mut dispatcher = ChannelDispatcher::new("adb");
        dispatcher
            .register_handler("fail", |_: &MethodCall| Err(HandlerFailure::new("E1", "bad")))
            .unwrap();
        dispatcher
            .register_handler("ok", |_: &MethodCall| Ok(Value::Bool(true)))
            .unwrap();

        assert!(dispatcher.dispatch(&MethodCall::new("fail")).is_error());
        assert!(dispatcher.dispatch(&MethodCall::new("ok")).is_success());
        assert!(dispatcher.dispatch(&MethodCall::new("fail")).is_error());
    }

    #[test]
    fn test_handler_sees_arguments() {
        let mut dispatcher = ChannelDispatcher::new("adb");
        dispatcher
            .register_handler("echo", |call: &MethodCall| Ok(call.arguments.clone()))
            .unwrap();

        let call = MethodCall::with_arguments("echo", json!({"serial": "emulator-5554"}));
        assert_eq!(
            dispatcher.dispatch(&call),
            MethodResponse::success(json!({"serial": "emulator-5554"}))
        );
    }

    #[test]
    fn test_typed_registration() {
        let mut dispatcher = ChannelDispatcher::new("adb");
        dispatcher
            .register_typed("double", |n: u32| Ok(n * 2))
            .unwrap();

        let call = MethodCall::with_arguments("double", json!(21));
        assert_eq!(dispatcher.dispatch(&call), MethodResponse::success(42));
    }
}
