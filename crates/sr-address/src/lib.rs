//! `sr-address` — address records, prefix search, and CSV loading.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                |
//! |------------|---------------------------------------------------------|
//! | [`index`]  | `AddressRecord`, `AddressIndex`, search limits          |
//! | [`loader`] | `load_addresses_csv`, `load_addresses_reader`           |
//! | [`error`]  | `AddressError`, `AddressResult<T>`                      |
//!
//! # Search model
//!
//! Every query is a linear scan over the records in source order.  At tens
//! of thousands of addresses this is well under a millisecond; if volumes
//! grow, a trie can replace the scan behind the same `search` contract.

pub mod error;
pub mod index;
pub mod loader;


pub use error::{AddressError, AddressResult};
pub use index::{AddressIndex, AddressRecord, MIN_QUERY_CHARS, SUGGESTION_LIMIT};
pub use loader::{load_addresses_csv, load_addresses_reader};
