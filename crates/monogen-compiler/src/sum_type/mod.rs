//! Sum type encoder.
//!
//! Encodes tagged unions as an enumeration of discriminants paired with a
//! union of per-variant payload structs. See [`encode_sum_type`].

mod encoder;

pub use encoder::encode_sum_type;
