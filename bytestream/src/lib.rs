//! Field-level primitives for the tickwire codec.
//!
//! This crate provides [`ByteWriter`] and [`ByteReader`] for the integer,
//! raw-byte and text fields that make up every message and update block.
//! Integers carry a width ([`DataType`]), a [`ByteOrder`], a [`Transform`]
//! and, when read, a [`Signedness`].
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads are bounds-checked and never advance on failure.
//! - **No domain knowledge** - This crate knows nothing about messages or entities.
//! - **Exact layouts** - Orders and transforms reproduce the client's byte layout bit for bit.
//!
//! # Example
//!
//! ```
//! use bytestream::{ByteOrder, ByteReader, ByteWriter, DataType, Signedness, Transform};
//!
//! let mut writer = ByteWriter::new();
//! writer.put(DataType::Short, ByteOrder::Little, Transform::Add, 3200).unwrap();
//! writer.put_string("hello").unwrap();
//!
//! let bytes = writer.finish();
//!
//! let mut reader = ByteReader::new(&bytes);
//! let value = reader
//!     .get(DataType::Short, ByteOrder::Little, Transform::Add, Signedness::Unsigned)
//!     .unwrap();
//! assert_eq!(value, 3200);
//! assert_eq!(reader.get_string(), "hello");
//! ```

mod error;
mod layout;
mod reader;
mod writer;

pub use error::{StreamError, StreamResult};
pub use layout::{validate_layout, ByteOrder, DataType, Signedness, Transform};
pub use reader::ByteReader;
pub use writer::ByteWriter;
