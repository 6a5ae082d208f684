//! Frame struct with typed accessors.
//!
//! Represents a complete protocol frame with header and payload.
//! Uses `bytes::Bytes` for zero-copy payload sharing.
//!
//! # Example
//!
//! ```
//! use adb_channel::protocol::Frame;
//! use bytes::Bytes;
//!
//! let frame = Frame::call(42, Bytes::from_static(b"hello")).unwrap();
//!
//! assert_eq!(frame.request_id(), 42);
//! assert_eq!(frame.payload(), b"hello");
//! assert_eq!(frame.header.payload_length, 5);
//! ```

use bytes::Bytes;

use super::wire_format::{flags, Header, HEADER_SIZE};
use crate::error::{ChannelError, Result};

/// A complete protocol frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Decoded header.
    pub header: Header,
    /// Payload bytes (zero-copy via `bytes::Bytes`).
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame from header and payload.
    pub fn new(header: Header, payload: Bytes) -> Self {
        Self { header, payload }
    }

    /// Create a frame with the given flags, sizing the header from the payload.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Protocol`] if the payload length does not fit
    /// the header's `u32` length field.
    pub fn with_flags(frame_flags: u8, request_id: u32, payload: Bytes) -> Result<Self> {
        let header = Header::new(frame_flags, request_id, payload_length(payload.len())?);
        Ok(Self { header, payload })
    }

    /// Create a call frame.
    pub fn call(request_id: u32, payload: Bytes) -> Result<Self> {
        Self::with_flags(flags::CALL, request_id, payload)
    }

    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    #[inline]
    pub fn request_id(&self) -> u32 {
        self.header.request_id
    }

    #[inline]
    pub fn flags(&self) -> u8 {
        self.header.flags
    }

    #[inline]
    pub fn is_response(&self) -> bool {
        self.header.is_response()
    }

    /// Serialize header and payload into a contiguous buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        build_frame(&self.header, &self.payload)
    }
}

fn payload_length(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        ChannelError::Protocol(format!("Payload size {} does not fit a frame header", len))
    })
}

/// Build a complete frame (header + payload) as a single buffer.
pub fn build_frame(header: &Header, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(payload);
    buf
}
