//! Message encoding and inbound dispatch for the tickwire codec.
//!
//! This crate ties bytestream, wire and schema together:
//!
//! - [`encode_message`]: outbound messages by kind name and field name
//! - [`InboundDecoder`]: per-connection framing and decoding of inbound bytes
//! - [`inbound_queue`]: bounded, non-blocking hand-off of decoded messages to the tick
//! - [`encode_fields`] / [`decode_fields`]: the field-list codec shared with update blocks
//!
//! # Design Principles
//!
//! - **Errors are scoped** - A malformed message is dropped; only an unknown opcode or an
//!   oversized frame ends a connection.
//! - **Partial frames are not errors** - The decoder waits for more bytes.
//! - **No partial output** - Encoding goes through a scratch body first.

mod dispatch;
mod error;
mod fields;
mod message;
mod queue;
mod types;
mod value;

pub use dispatch::{Dispatch, InboundDecoder};
pub use error::{CodecError, CodecResult, QueueError};
pub use fields::{decode_fields, encode_fields};
pub use message::{
    encode_message, encode_values, FromMessage, IntoMessage, Message, OutboundMessage,
};
pub use queue::{inbound_queue, Inbound, InboundReceiver, InboundSender, QueueConfig};
pub use types::ConnectionId;
pub use value::FieldValue;
pub use wire::Limits as WireLimits;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = ConnectionId::new(0);
        let _ = WireLimits::default();
        let _ = QueueConfig::default();
        let _: CodecResult<()> = Ok(());
        let _ = OutboundMessage::new("idle").into_message();
    }
}
