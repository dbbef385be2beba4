//! Operator tooling for tickwire.
//!
//! - Validate definition documents and print their fingerprint
//! - Decode captured client byte streams into JSON
//!
//! The binary is a thin clap layer over this library.

mod config;
mod report;

pub use config::{DefinitionPaths, ToolsConfig};
pub use report::{
    decode_capture, format_decode_pretty, CheckReport, DecodeReport, FrameReport, FrameStatus,
};
