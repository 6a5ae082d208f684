//! Method call and response envelopes.
//!
//! Calls are encoded as `{ "method": str, "args": value }`.
//! Responses are tagged maps keyed by `status`:
//!
//! ```text
//! { "status": "success", "value": v }
//! { "status": "error", "code": str, "message": str | nil, "details": v }
//! { "status": "not_implemented" }
//! ```

use super::MsgPackCodec;
use crate::error::Result;
use crate::handler::{MethodCall, MethodResponse};
use crate::protocol::flags;

/// Codec for the channel's call/response envelopes.
pub struct MethodCodec;

impl MethodCodec {
    /// Encode a method call.
    pub fn encode_call(call: &MethodCall) -> Result<Vec<u8>> {
        MsgPackCodec::encode(call)
    }

    /// Decode a method call.
    pub fn decode_call(bytes: &[u8]) -> Result<MethodCall> {
        MsgPackCodec::decode(bytes)
    }

    /// Encode a method response envelope.
    pub fn encode_response(response: &MethodResponse) -> Result<Vec<u8>> {
        MsgPackCodec::encode(response)
    }

    /// Decode a method response envelope.
    pub fn decode_response(bytes: &[u8]) -> Result<MethodResponse> {
        MsgPackCodec::decode(bytes)
    }

    /// Frame flags matching a response variant.
    pub fn response_flags(response: &MethodResponse) -> u8 {
        match response {
            MethodResponse::Success { .. } => flags::RESPONSE,
            MethodResponse::Error { .. } => flags::ERROR_RESPONSE,
            MethodResponse::NotImplemented => flags::NOT_IMPLEMENTED_RESPONSE,
        }
    }
}
