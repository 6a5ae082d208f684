//! Handler module - method calls, responses and the handler registry.
//!
//! Provides:
//! - [`MethodCall`] / [`MethodResponse`] - the per-request data model
//! - [`HandlerFailure`] - error value a handler returns
//! - [`HandlerRegistry`] - maps method names to handlers
//!
//! # Example
//!
//! ```
//! use adb_channel::handler::{HandlerFailure, HandlerRegistry, MethodCall};
//!
//! let mut registry = HandlerRegistry::new();
//!
//! registry
//!     .register("fail", |_: &MethodCall| Err(HandlerFailure::new("E1", "bad")))
//!     .unwrap();
//!
//! registry
//!     .register_typed("add", |(a, b): (i64, i64)| Ok(a + b))
//!     .unwrap();
//! ```

mod call;
mod registry;

pub use call::{HandlerFailure, MethodCall, MethodResponse};
pub use registry::{Handler, HandlerRegistry, HandlerResult, TypedHandler};
