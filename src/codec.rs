//! Line codec for client connections.
//!
//! Wraps [`LinesCodec`] so an overlong or undecodable line becomes an
//! ordinary item rather than a stream error; the connection keeps going and
//! the offending line is skipped.

use bytes::BytesMut;
use std::io;
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};

/// One decoded unit of client input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A complete line, without its terminator.
    Line(String),
    /// A line longer than the limit was discarded.
    TooLong,
    /// A line that was not valid UTF-8 was discarded.
    NotText,
}

/// Newline-delimited text codec with a per-line length limit.
#[derive(Debug, Clone)]
pub struct ClientCodec {
    inner: LinesCodec,
    max_length: usize,
}

impl ClientCodec {
    /// Creates a codec rejecting lines longer than `max_length` bytes.
    pub fn new(max_length: usize) -> Self {
        Self {
            inner: LinesCodec::new_with_max_length(max_length),
            max_length,
        }
    }

    /// The configured line limit.
    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

// LinesCodec has already consumed the offending line when it reports either
// error, so decoding can resume with the next one.
fn lift(
    decoded: Result<Option<String>, LinesCodecError>,
) -> Result<Option<Inbound>, LinesCodecError> {
    match decoded {
        Ok(line) => Ok(line.map(Inbound::Line)),
        Err(LinesCodecError::MaxLineLengthExceeded) => Ok(Some(Inbound::TooLong)),
        Err(LinesCodecError::Io(err)) if err.kind() == io::ErrorKind::InvalidData => {
            Ok(Some(Inbound::NotText))
        }
        Err(err) => Err(err),
    }
}

impl Decoder for ClientCodec {
    type Item = Inbound;
    type Error = LinesCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Inbound>, LinesCodecError> {
        lift(self.inner.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Inbound>, LinesCodecError> {
        lift(self.inner.decode_eof(buf))
    }
}

impl<T: AsRef<str>> Encoder<T> for ClientCodec {
    type Error = LinesCodecError;

    fn encode(&mut self, line: T, buf: &mut BytesMut) -> Result<(), LinesCodecError> {
        self.inner.encode(line, buf)
    }
}
