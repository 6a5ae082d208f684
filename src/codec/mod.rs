//! Codec module - serialization of channel payloads.
//!
//! - [`MsgPackCodec`] - MessagePack using `rmp-serde` (`to_vec_named`, struct-as-map)
//! - [`MethodCodec`] - method call and response envelopes on top of MsgPack
//!
//! Codecs are marker structs with static methods rather than trait objects,
//! so the codec is fixed at compile time.
//!
//! # Example
//!
//! ```
//! use adb_channel::codec::{MethodCodec, MsgPackCodec};
//! use adb_channel::handler::{MethodCall, MethodResponse};
//!
//! let encoded = MsgPackCodec::encode(&"hello").unwrap();
//! let decoded: String = MsgPackCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, "hello");
//!
//! let call = MethodCall::new("getPlatformVersion");
//! let bytes = MethodCodec::encode_call(&call).unwrap();
//! assert_eq!(MethodCodec::decode_call(&bytes).unwrap(), call);
//!
//! let bytes = MethodCodec::encode_response(&MethodResponse::NotImplemented).unwrap();
//! assert!(MethodCodec::decode_response(&bytes).unwrap().is_not_implemented());
//! ```

mod method;
mod msgpack;

pub use method::MethodCodec;
pub use msgpack::MsgPackCodec;
