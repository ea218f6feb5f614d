//! Compact binary backend.
//!
//! A stream is a sequence of roots, each `b"SGOB"`, a version byte and one
//! record. A record is:
//!
//! ```text
//! name: str  primitive_type: u8  count: u32  (name: str  tag  payload)*
//! ```
//!
//! Integers are little-endian. `str` is a `u32` byte length followed by
//! UTF-8. Lengths and indices are `u64`.
//!
//! A tag is prefix coded: `0x01 <type code>` for scalars, `0x02` for object
//! references and `0x03`..`0x06` followed by the element tag for vectors,
//! matrices, sparse vectors and sparse matrices.
//!
//! | Tag            | Payload                                                   |
//! |----------------|-----------------------------------------------------------|
//! | scalar         | fixed width, `FloatMax` as `f64`, complex as two `f64`    |
//! | object         | `0` for null, `1` followed by a nested record             |
//! | vector         | `len`, elements                                           |
//! | matrix         | `rows`, `cols`, elements in column-major order            |
//! | sparse vector  | `dimension`, `nnz`, (`index`, element)*                   |
//! | sparse matrix  | `num_vectors`, `num_features`, sparse vectors             |
//!
//! Fields carry their tag so a reader can skip the ones it does not know.

// -----------------------------------------------------------------------------
// Modules

mod decoder;
mod encoder;
mod format;

// -----------------------------------------------------------------------------
// Exports

pub use decoder::BinaryDeserializer;
pub use encoder::BinarySerializer;

// -----------------------------------------------------------------------------
// Tests
