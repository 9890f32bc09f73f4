//! Open Pixel Control framing and sinks.
//!
//! Each wire message is a four-byte header `{channel, command, length-hi,
//! length-lo}` followed by `length` payload bytes; for Set Pixel Colours the
//! payload is `N` RGB triples. Channel 0 broadcasts to every channel.

use std::io::Write;
use std::net::TcpStream;
use std::time::Duration;

use tracing::{debug, info};

use crate::foundation::core::{OpcChannel, Rgba8};
use crate::foundation::error::{ObeliskError, ObeliskResult};

/// The Set Pixel Colours command.
pub const CMD_SET_PIXEL_COLOURS: u8 = 0x00;

/// Wire header size in bytes.
pub const HEADER_LEN: usize = 4;

/// Largest pixel count one message can carry (`u16` length / 3 bytes).
pub const MAX_PIXELS_PER_MESSAGE: usize = u16::MAX as usize / 3;

/// One OPC message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpcMessage {
    /// Output channel, 0 for broadcast.
    pub channel: OpcChannel,
    /// Command byte.
    pub command: u8,
    /// Raw payload.
    pub data: Vec<u8>,
}

impl OpcMessage {
    /// Build a Set Pixel Colours message from pixel data.
    ///
    /// Pixels whose alpha is zero were never written by an effect and are
    /// emitted as black.
    pub fn set_pixels(channel: OpcChannel, pixels: &[Rgba8]) -> ObeliskResult<Self> {
        if pixels.len() > MAX_PIXELS_PER_MESSAGE {
            return Err(ObeliskError::validation(format!(
                "{} pixels exceed one OPC message (max {MAX_PIXELS_PER_MESSAGE})",
                pixels.len()
            )));
        }
        let mut data = Vec::with_capacity(pixels.len() * 3);
        for px in pixels {
            if px.a == 0 {
                data.extend_from_slice(&[0, 0, 0]);
            } else {
                data.extend_from_slice(&[px.r, px.g, px.b]);
            }
        }
        Ok(Self {
            channel,
            command: CMD_SET_PIXEL_COLOURS,
            data,
        })
    }

    /// Serialise to wire bytes: header plus payload, length big-endian.
    pub fn encode(&self) -> Vec<u8> {
        let len = self.data.len() as u16;
        let mut wire = Vec::with_capacity(HEADER_LEN + self.data.len());
        wire.push(self.channel);
        wire.push(self.command);
        wire.extend_from_slice(&len.to_be_bytes());
        wire.extend_from_slice(&self.data);
        wire
    }

    /// Parse one message from the front of `bytes`, returning it and the
    /// number of bytes consumed.
    pub fn decode(bytes: &[u8]) -> ObeliskResult<(Self, usize)> {
        if bytes.len() < HEADER_LEN {
            return Err(ObeliskError::parse(format!(
                "OPC frame truncated at {} bytes",
                bytes.len()
            )));
        }
        let length = usize::from(u16::from_be_bytes([bytes[2], bytes[3]]));
        let total = HEADER_LEN + length;
        if bytes.len() < total {
            return Err(ObeliskError::parse(format!(
                "OPC payload truncated: header says {length}, only {} available",
                bytes.len() - HEADER_LEN
            )));
        }
        Ok((
            Self {
                channel: bytes[0],
                command: bytes[1],
                data: bytes[HEADER_LEN..total].to_vec(),
            },
            total,
        ))
    }

    /// Payload reinterpreted as RGB triples. A trailing partial triple is
    /// dropped.
    pub fn pixels(&self) -> Vec<Rgba8> {
        self.data
            .chunks_exact(3)
            .map(|c| Rgba8::rgb(c[0], c[1], c[2]))
            .collect()
    }
}

/// Destination for encoded frames.
pub trait PixelSink: Send {
    /// Write one message. Transient failures are returned, not retried here;
    /// the emit loop owns the retry cadence.
    fn write(&mut self, msg: &OpcMessage) -> ObeliskResult<()>;
}

/// TCP sink with lazy connect and reconnect-on-error.
pub struct TcpSink {
    addr: String,
    stream: Option<TcpStream>,
}

impl TcpSink {
    /// Sink for `host:port`. No connection is attempted until the first
    /// write.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            stream: None,
        }
    }

    fn connect(&mut self) -> ObeliskResult<&mut TcpStream> {
        if self.stream.is_none() {
            let stream = TcpStream::connect(&self.addr)
                .map_err(|e| ObeliskError::io(format!("connect {}: {e}", self.addr)))?;
            stream
                .set_write_timeout(Some(Duration::from_secs(1)))
                .map_err(|e| ObeliskError::io(format!("socket setup {}: {e}", self.addr)))?;
            info!(addr = %self.addr, "connected to pixel server");
            self.stream = Some(stream);
        }
        self.stream
            .as_mut()
            .ok_or_else(|| ObeliskError::io("pixel server stream missing"))
    }
}

impl PixelSink for TcpSink {
    fn write(&mut self, msg: &OpcMessage) -> ObeliskResult<()> {
        let addr = self.addr.clone();
        let stream = self.connect()?;
        if let Err(e) = stream.write_all(&msg.encode()) {
            // Drop the stream so the next write reconnects.
            self.stream = None;
            return Err(ObeliskError::io(format!("write {addr}: {e}")));
        }
        Ok(())
    }
}

/// Sink that discards everything; the rest of the pipeline runs normally.
pub struct NullSink;

impl PixelSink for NullSink {
    fn write(&mut self, _msg: &OpcMessage) -> ObeliskResult<()> {
        Ok(())
    }
}

/// In-memory sink for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Messages in write order.
    pub messages: Vec<OpcMessage>,
}

impl MemorySink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PixelSink for MemorySink {
    fn write(&mut self, msg: &OpcMessage) -> ObeliskResult<()> {
        self.messages.push(msg.clone());
        Ok(())
    }
}

/// Address of the discard sink.
pub const NULL_SINK_ADDR: &str = "/dev/null";

/// Pick the sink for a configured address.
pub fn sink_for(addr: &str) -> Box<dyn PixelSink> {
    if addr == NULL_SINK_ADDR {
        debug!("pixel writes disabled, using null sink");
        Box::new(NullSink)
    } else {
        Box::new(TcpSink::new(addr))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/wire/opc.rs"]
mod tests;
