//! Per-connection inbound dispatch.

use std::sync::Arc;

use schema::{MessageRegistry, MessageSpec};
use tracing::{debug, error, warn};
use wire::{probe_frame, FrameProbe, Limits, Opcode, WireError};

use crate::error::{CodecError, CodecResult};
use crate::message::Message;
use crate::types::ConnectionId;

/// Outcome of one complete inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A decoded message for game logic.
    Message(Message),
    /// A frame for an ignored specification, consumed without decoding.
    Ignored { spec: Arc<MessageSpec>, opcode: Opcode },
    /// A well-framed message whose fields failed to decode.
    Dropped {
        spec: Arc<MessageSpec>,
        opcode: Opcode,
        error: CodecError,
    },
}

/// Turns one connection's byte stream into [`Dispatch`] results.
///
/// Bytes are buffered until a whole frame is available, so input may be fed
/// in arbitrary chunks. A fatal error poisons the decoder: every later call
/// returns the same error and the connection should be closed.
#[derive(Debug)]
pub struct InboundDecoder {
    connection: ConnectionId,
    registry: Arc<MessageRegistry>,
    limits: Limits,
    pending: Vec<u8>,
    consumed: usize,
    poisoned: Option<CodecError>,
}

impl InboundDecoder {
    #[must_use]
    pub fn new(connection: ConnectionId, registry: Arc<MessageRegistry>, limits: Limits) -> Self {
        Self {
            connection,
            registry,
            limits,
            pending: Vec::new(),
            consumed: 0,
            poisoned: None,
        }
    }

    #[must_use]
    pub const fn connection(&self) -> ConnectionId {
        self.connection
    }

    /// Bytes received but not yet dispatched.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len() - self.consumed
    }

    /// The fatal error this decoder stopped on, if any.
    #[must_use]
    pub const fn poisoned(&self) -> Option<&CodecError> {
        self.poisoned.as_ref()
    }

    fn check_poisoned(&self) -> CodecResult<()> {
        self.poisoned.as_ref().map_or(Ok(()), |err| Err(err.clone()))
    }

    fn poison(&mut self, err: CodecError) -> CodecError {
        error!(connection = %self.connection, error = %err, "closing inbound stream");
        self.poisoned = Some(err.clone());
        err
    }

    /// Appends received bytes.
    pub fn feed(&mut self, bytes: &[u8]) -> CodecResult<()> {
        self.check_poisoned()?;
        if self.consumed > 0 {
            self.pending.drain(..self.consumed);
            self.consumed = 0;
        }
        let total = self.pending.len() + bytes.len();
        if total > self.limits.max_pending_bytes {
            return Err(self.poison(CodecError::PendingOverflow {
                limit: self.limits.max_pending_bytes,
                actual: total,
            }));
        }
        self.pending.extend_from_slice(bytes);
        Ok(())
    }

    /// Dispatches the next complete frame, or `Ok(None)` if more bytes are
    /// needed.
    pub fn next_dispatch(&mut self) -> CodecResult<Option<Dispatch>> {
        self.check_poisoned()?;
        let buf = &self.pending[self.consumed..];
        let Some((&opcode, rest)) = buf.split_first() else {
            return Ok(None);
        };
        let Some(spec) = self.registry.inbound(opcode).cloned() else {
            return Err(self.poison(CodecError::UnknownOpcode { opcode }));
        };

        let (header_len, body_len) = match probe_frame(rest, spec.framing(), &self.limits) {
            Ok(FrameProbe::Complete {
                header_len,
                body_len,
            }) => (header_len, body_len),
            Ok(FrameProbe::Incomplete { .. }) => return Ok(None),
            Err(WireError::LimitsExceeded { limit, actual, .. }) => {
                return Err(self.poison(CodecError::FrameTooLarge {
                    opcode,
                    len: actual,
                    max: limit,
                }));
            }
            Err(err) => return Err(self.poison(err.into())),
        };

        let body_start = 1 + header_len;
        let body = &rest[header_len..header_len + body_len];
        let dispatch = if spec.is_ignored() {
            debug!(connection = %self.connection, opcode, name = spec.name(), "ignored frame");
            Dispatch::Ignored { spec, opcode }
        } else {
            match Message::decode(Arc::clone(&spec), opcode, body) {
                Ok(message) => Dispatch::Message(message),
                Err(error) => {
                    warn!(
                        connection = %self.connection,
                        opcode,
                        name = spec.name(),
                        %error,
                        "dropping malformed message"
                    );
                    Dispatch::Dropped {
                        spec,
                        opcode,
                        error,
                    }
                }
            }
        };
        self.consumed += body_start + body_len;
        Ok(Some(dispatch))
    }

    /// Dispatches every complete frame into `out`, returning how many were
    /// added. Frames dispatched before a fatal error stay in `out`.
    pub fn drain(&mut self, out: &mut Vec<Dispatch>) -> CodecResult<usize> {
        let before = out.len();
        while let Some(dispatch) = self.next_dispatch()? {
            out.push(dispatch);
        }
        Ok(out.len() - before)
    }
}
