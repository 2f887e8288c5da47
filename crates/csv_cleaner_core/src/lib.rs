//! Shared CSV cleaning domain primitives.
//!
//! This crate owns the event/response contract, the in-memory table model, the
//! CSV codec, and the cleaning transforms. It intentionally excludes AWS SDK and
//! Lambda runtime concerns.

pub mod cleaning;
pub mod contract;
pub mod csv_codec;
pub mod storage_keys;
pub mod table;
