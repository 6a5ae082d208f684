//! Handler registry mapping method names to handlers.
//!
//! The registry is filled once at startup and then handed to the
//! [`ChannelDispatcher`](crate::dispatcher::ChannelDispatcher), which only
//! reads from it.
//!
//! # Example
//!
//! ```
//! use adb_channel::handler::{HandlerRegistry, MethodCall};
//!
//! let mut registry = HandlerRegistry::new();
//! registry
//!     .register("echo", |call: &MethodCall| Ok(call.arguments.clone()))
//!     .unwrap();
//!
//! assert!(registry.get_handler("echo").is_some());
//! assert!(registry.register("echo", |_: &MethodCall| Ok(().into())).is_err());
//! ```

use std::collections::HashMap;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{HandlerFailure, MethodCall};
use crate::error::{ChannelError, Result};

/// Result type for handler functions.
pub type HandlerResult = std::result::Result<Value, HandlerFailure>;

/// Trait for method handlers.
///
/// Handlers run synchronously on the dispatch loop and must return promptly.
pub trait Handler: Send + Sync + 'static {
    /// Handle a call and produce its result value.
    fn call(&self, call: &MethodCall) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&MethodCall) -> HandlerResult + Send + Sync + 'static,
{
    fn call(&self, call: &MethodCall) -> HandlerResult {
        self(call)
    }
}

/// Wrapper that converts call arguments to `T` and the result from `R`.
pub struct TypedHandler<F, T, R>
where
    F: Fn(T) -> std::result::Result<R, HandlerFailure> + Send + Sync + 'static,
    T: DeserializeOwned + 'static,
    R: Serialize + 'static,
{
    handler: F,
    _phantom: PhantomData<fn(T) -> R>,
}

impl<F, T, R> TypedHandler<F, T, R>
where
    F: Fn(T) -> std::result::Result<R, HandlerFailure> + Send + Sync + 'static,
    T: DeserializeOwned + 'static,
    R: Serialize + 'static,
{
    /// Create a new typed handler.
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }
}

impl<F, T, R> Handler for TypedHandler<F, T, R>
where
    F: Fn(T) -> std::result::Result<R, HandlerFailure> + Send + Sync + 'static,
    T: DeserializeOwned + 'static,
    R: Serialize + 'static,
{
    fn call(&self, call: &MethodCall) -> HandlerResult {
        let args: T = serde_json::from_value(call.arguments.clone()).map_err(|e| {
            HandlerFailure::new("invalid_arguments", e.to_string())
                .with_details(Value::String(call.method.clone()))
        })?;

        let result = (self.handler)(args)?;

        serde_json::to_value(result)
            .map_err(|e| HandlerFailure::new("invalid_result", e.to_string()))
    }
}

/// Registry mapping method names to handlers.
#[derive(Default)]
pub struct HandlerRegistry {
    methods: HashMap<String, Box<dyn Handler>>,
}

impl HandlerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::DuplicateHandler`] if the name is taken. The
    /// existing handler stays registered.
    pub fn register<F>(&mut self, name: &str, handler: F) -> Result<()>
    where
        F: Fn(&MethodCall) -> HandlerResult + Send + Sync + 'static,
    {
        self.register_boxed(name, Box::new(handler))
    }

    /// Register a handler with typed arguments and result.
    pub fn register_typed<F, T, R>(&mut self, name: &str, handler: F) -> Result<()>
    where
        F: Fn(T) -> std::result::Result<R, HandlerFailure> + Send + Sync + 'static,
        T: DeserializeOwned + 'static,
        R: Serialize + 'static,
    {
        self.register_boxed(name, Box::new(TypedHandler::new(handler)))
    }

    /// Register an already boxed handler, e.g. a custom [`Handler`] impl.
    pub fn register_boxed(&mut self, name: &str, handler: Box<dyn Handler>) -> Result<()> {
        if self.methods.contains_key(name) {
            return Err(ChannelError::DuplicateHandler(name.to_string()));
        }
        self.methods.insert(name.to_string(), handler);
        Ok(())
    }

    /// Get a handler by method name.
    pub fn get_handler(&self, name: &str) -> Option<&dyn Handler> {
        self.methods.get(name).map(|h| h.as_ref())
    }

    /// Check whether a method name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Registered method names, sorted.
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("methods", &self.method_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_register_method() {
        let mut registry = HandlerRegistry::new();

        registry
            .register("echo", |call: &MethodCall| Ok(call.arguments.clone()))
            .unwrap();

        assert!(registry.get_handler("echo").is_some());
        assert!(registry.contains("echo"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let mut registry = HandlerRegistry::new();

        registry
            .register("version", |_: &MethodCall| Ok(json!("first")))
            .unwrap();
        let err = registry
            .register("version", |_: &MethodCall| Ok(json!("second")))
            .unwrap_err();

        assert!(matches!(err, ChannelError::DuplicateHandler(ref name) if name == "version"));

        let handler = registry.get_handler("version").unwrap();
        assert_eq!(handler.call(&MethodCall::new("version")), Ok(json!("first")));
    }

    #[test]
    fn test_handler_not_found() {
        let registry = HandlerRegistry::new();
        assert!(registry.get_handler("nonexistent").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_typed_handler_arguments() {
        #[derive(Deserialize)]
        struct Forward {
            local: u16,
            remote: u16,
        }

        let mut registry = HandlerRegistry::new();
        registry
            .register_typed("forward", |args: Forward| {
                Ok(format!("tcp:{} -> tcp:{}", args.local, args.remote))
            })
            .unwrap();

        let handler = registry.get_handler("forward").unwrap();
        let call = MethodCall::with_arguments("forward", json!({"local": 8080, "remote": 80}));
        assert_eq!(handler.call(&call), Ok(json!("tcp:8080 -> tcp:80")));
    }

    #[test]
    fn test_typed_handler_rejects_bad_arguments() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_typed("square", |n: i64| Ok(n * n))
            .unwrap();

        let handler = registry.get_handler("square").unwrap();
        let failure = handler
            .call(&MethodCall::with_arguments("square", json!("nine")))
            .unwrap_err();

        assert_eq!(failure.code, "invalid_arguments");
        assert_eq!(failure.details, json!("square"));
    }

    #[test]
    fn test_unit_arguments_accept_null() {
        let mut registry = HandlerRegistry::new();
        registry.register_typed("ping", |_: ()| Ok("pong")).unwrap();

        let handler = registry.get_handler("ping").unwrap();
        assert_eq!(handler.call(&MethodCall::new("ping")), Ok(json!("pong")));
    }

    #[test]
    fn test_method_names_sorted() {
        let mut registry = HandlerRegistry::new();
        registry.register("b", |_: &MethodCall| Ok(Value::Null)).unwrap();
        registry.register("a", |_: &MethodCall| Ok(Value::Null)).unwrap();

        assert_eq!(registry.method_names(), vec!["a", "b"]);
    }
}
