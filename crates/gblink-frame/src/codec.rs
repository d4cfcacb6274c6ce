use bytes::{Buf, BufMut, BytesMut};

use crate::command::CommandKind;
use crate::dissect::{Command, Layout};
use crate::error::{FrameError, Result};

/// Every link frame is exactly 8 bytes.
pub const FRAME_SIZE: usize = 8;

/// One raw link frame.
///
/// Wire format:
/// ```text
/// ┌─────────┬──────────┬──────────┬──────────┬──────────────────┐
/// │ Command │ Byte 2   │ Byte 3   │ Byte 4   │ Timestamp        │
/// │ (1B)    │ (1B)     │ (1B)     │ (1B)     │ (4B BE)          │
/// └─────────┴──────────┴──────────┴──────────┴──────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame {
    /// Command identifier (byte 0).
    pub command: u8,
    /// Command-specific payload (bytes 1-3).
    pub payload: [u8; 3],
    /// Timestamp / framecount field (bytes 4-7).
    pub timestamp: u32,
}

impl Frame {
    /// Create a new frame.
    pub fn new(command: u8, payload: [u8; 3], timestamp: u32) -> Self {
        Self {
            command,
            payload,
            timestamp,
        }
    }

    /// Parse a frame from a slice that must be exactly [`FRAME_SIZE`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let array: [u8; FRAME_SIZE] = bytes
            .try_into()
            .map_err(|_| FrameError::MalformedFrame { len: bytes.len() })?;
        Ok(Self::from_array(array))
    }

    /// Parse a frame from a fixed-size array. Cannot fail.
    pub fn from_array(b: [u8; FRAME_SIZE]) -> Self {
        Self {
            command: b[0],
            payload: [b[1], b[2], b[3]],
            timestamp: u32::from_be_bytes([b[4], b[5], b[6], b[7]]),
        }
    }

    /// The wire representation of this frame.
    pub fn to_bytes(&self) -> [u8; FRAME_SIZE] {
        let ts = self.timestamp.to_be_bytes();
        [
            self.command,
            self.payload[0],
            self.payload[1],
            self.payload[2],
            ts[0],
            ts[1],
            ts[2],
            ts[3],
        ]
    }

    /// Classify the command id.
    pub fn kind(&self) -> CommandKind {
        CommandKind::from_id(self.command)
    }

    /// Typed interpretation of the payload.
    pub fn command(&self) -> Command {
        Command::interpret(self)
    }
}

impl From<[u8; FRAME_SIZE]> for Frame {
    fn from(bytes: [u8; FRAME_SIZE]) -> Self {
        Self::from_array(bytes)
    }
}

/// Append a frame to `dst` in wire format.
pub fn encode_frame(frame: &Frame, dst: &mut BytesMut) {
    dst.reserve(FRAME_SIZE);
    dst.put_u8(frame.command);
    dst.put_slice(&frame.payload);
    dst.put_u32(frame.timestamp);
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes exactly [`FRAME_SIZE`] bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut) -> Result<Option<Frame>> {
    if src.len() < FRAME_SIZE {
        return Ok(None); // Need more data
    }

    let command = src.get_u8();
    let mut payload = [0u8; 3];
    src.copy_to_slice(&mut payload);
    let timestamp = src.get_u32();

    Ok(Some(Frame {
        command,
        payload,
        timestamp,
    }))
}

/// Configuration for frame readers and writers.
#[derive(Debug, Clone, Default)]
pub struct FrameConfig {
    /// Decoding layout used by `read_decoded`. Default: interpreted.
    pub layout: Layout,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}
