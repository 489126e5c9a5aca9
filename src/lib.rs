//! # Flatcable
//!
//! A compact binary format for flat values, driven by short textual type
//! descriptors instead of hand-written pack/unpack code.
//!
//! Descriptors name a scalar (`b B i I l L str sstr byt sbyt`, strings taking
//! an optional `/encoding`) or a one-level container of scalars
//! (`vec:T`, `set:T`, `map:K:V`). Sets and maps are written in ascending
//! order, so equal values always produce identical bytes.
//!
//! ## Example
//!
//! ```rust
//! use flatcable::{BinaryIo, Value};
//!
//! let mut bio = BinaryIo::in_memory();
//! bio.write(&Value::from(4711i32), "i").unwrap();
//! bio.write(&Value::map([("xyzzy", 42u64), ("bar", 4711)]), "map:str/ascii:L").unwrap();
//!
//! let mut bio = BinaryIo::from_bytes(bio.into_bytes());
//! assert_eq!(bio.read("i").unwrap(), Value::from(4711i32));
//! ```

mod binary_io;
mod config;
mod data_types;
mod deserialize;
mod encoding;
mod error;
mod fixed_int;
mod read_context;
mod schema;
mod serialize;
mod value;

pub use binary_io::{BinaryIo, OpenMode};
pub use config::{CodecConfig, DEFAULT_MAX_PAYLOAD_LEN};
pub use data_types::{
    ContainerTag, LengthForm, ScalarKind, ScalarTag, Tag, DEFAULT_ENCODING, LONG_PREFIX,
    SHORT_MAX_LEN, SHORT_PREFIX,
};
pub use deserialize::{decode_from_bytes, deserialize};
pub use encoding::TextEncoding;
pub use error::{FlatcableError, Result};
pub use schema::{parse_components, Component, Descriptor, ScalarType};
pub use serialize::{encode_to_bytes, serialize};
pub use value::{Scalar, Value};
